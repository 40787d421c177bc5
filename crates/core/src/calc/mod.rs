//! Derived financial aggregates.

pub mod cache;
pub mod engine;
pub mod types;

pub use cache::CalcCache;
pub use engine::CalcEngine;
pub use types::{Aggregates, BudgetLineSummary, VarianceStatus};

use crate::project::Project;

/// Computes every aggregate for a project.
///
/// Shorthand for `CalcEngine::calc`.
#[must_use]
pub fn calc(project: &Project) -> Aggregates {
    CalcEngine::calc(project)
}
