//! Contract variations and their approval ledger.

pub mod ledger;

#[cfg(test)]
mod ledger_props;

pub use ledger::{NewVariation, VariationLedger};
