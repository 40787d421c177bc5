//! Realized costs.
//!
//! Bill and invoice actuals are only ever written through `post_actual` and
//! `reverse_actuals`, which key them by `ActualSource`.

use chrono::Utc;
use rust_decimal::Decimal;
use siteledger_shared::types::{ActualId, BudgetLineId};
use tracing::debug;

use crate::error::EngineError;
use crate::project::{Actual, ActualSource, JobRecords, Project};

/// Input for recording a manual actual.
#[derive(Debug, Clone)]
pub struct NewActual {
    /// Description.
    pub description: String,
    /// Realized amount.
    pub amount: Decimal,
    /// Budget line the cost lands on, if any.
    pub budget_line_id: Option<BudgetLineId>,
}

/// Stateless service for manual actuals.
pub struct ActualService;

impl ActualService {
    /// Records a manual actual.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` if the project is still a quote.
    /// Returns `EngineError::Validation` if the description is blank or the amount is zero.
    /// Returns `EngineError::NotFound` if the budget line does not exist.
    pub fn add_manual_actual(project: &Project, input: NewActual) -> Result<Project, EngineError> {
        if input.description.trim().is_empty() {
            return Err(EngineError::Validation("description is required".into()));
        }
        if input.amount.is_zero() {
            return Err(EngineError::Validation("amount cannot be zero".into()));
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        check_budget_line(job, input.budget_line_id)?;
        job.actuals.push(Actual {
            id: ActualId::new(),
            description: input.description.trim().to_string(),
            amount: input.amount,
            source: ActualSource::Manual,
            budget_line_id: input.budget_line_id,
            recorded_at: Utc::now(),
        });
        next.touch();
        Ok(next)
    }
}

/// Ensures a referenced budget line exists.
pub(crate) fn check_budget_line(
    job: &JobRecords,
    budget_line_id: Option<BudgetLineId>,
) -> Result<(), EngineError> {
    match budget_line_id {
        Some(id) if !job.budget.iter().any(|line| line.id == id) => {
            Err(EngineError::not_found("Budget line", id))
        }
        _ => Ok(()),
    }
}

/// Adds an actual for `source` unless one already exists.
///
/// Returns true if an actual was added.
pub(crate) fn post_actual(
    job: &mut JobRecords,
    source: ActualSource,
    description: String,
    amount: Decimal,
    budget_line_id: Option<BudgetLineId>,
) -> bool {
    if job.actuals.iter().any(|a| a.source == source) {
        debug!(?source, "actual already posted");
        return false;
    }

    job.actuals.push(Actual {
        id: ActualId::new(),
        description,
        amount,
        source,
        budget_line_id,
        recorded_at: Utc::now(),
    });
    true
}

/// Removes every actual whose source matches `pred`.
///
/// Returns the number removed.
pub(crate) fn reverse_actuals(
    job: &mut JobRecords,
    pred: impl Fn(&ActualSource) -> bool,
) -> usize {
    let before = job.actuals.len();
    job.actuals.retain(|a| !pred(&a.source));
    before - job.actuals.len()
}
