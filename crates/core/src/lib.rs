//! Core financial engine for SiteLedger.
//!
//! This crate contains pure business logic with ZERO I/O. Every write takes a project
//! snapshot by reference and returns a new snapshot with its revision bumped; the
//! caller owns persistence and serializes writes to a project.
//!
//! # Modules
//!
//! - `project` - The project aggregate, its entities and status vocabularies
//! - `lifecycle` - Stage machine, quote-to-job conversion, module whitelist
//! - `calc` - Derived aggregates and the revision-keyed cache
//! - `budget` - Quote-to-budget import and manual budget lines
//! - `variation` - Variation approval ledger
//! - `costs` - Commitments, supplier bills, actuals and reconciliation
//! - `billing` - Payment schedule and client invoices
//! - `deletion` - Deletion policy
//! - `advisory` - Overridable warnings and confirmation

pub mod advisory;
pub mod billing;
pub mod budget;
pub mod calc;
pub mod costs;
pub mod deletion;
pub mod error;
pub mod lifecycle;
pub mod project;
pub mod variation;

#[cfg(test)]
mod test_support;

pub use advisory::{Advisory, Confirmation, DuplicateReason};
pub use calc::{Aggregates, CalcCache, CalcEngine, calc};
pub use costs::commitment_remaining;
pub use error::EngineError;
pub use lifecycle::{Module, Stage, allowed_modules};
pub use project::Project;
