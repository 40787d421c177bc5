//! Common types used across the workspace.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{Currency, GST_RATE, percent_of, ratio_percent, round_cents};
