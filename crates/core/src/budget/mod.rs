//! Job budget: quote import, manual lines and variance.

pub mod import;
pub mod service;


pub use import::{BudgetImporter, ImportGranularity};
pub use service::{BudgetService, BudgetSummary, NewBudgetLine};
