//! Manual budget lines and budget-vs-actual reads.

use chrono::Utc;
use rust_decimal::Decimal;
use siteledger_shared::types::{BudgetLineId, round_cents};

use crate::calc::{BudgetLineSummary, CalcEngine};
use crate::error::EngineError;
use crate::project::{BudgetLine, BudgetSource, Project};

/// Input for adding a manual budget line.
#[derive(Debug, Clone)]
pub struct NewBudgetLine {
    /// Display label.
    pub label: String,
    /// Scope category, if the line belongs to one.
    pub category: Option<String>,
    /// Budgeted amount.
    pub amount: Decimal,
}

/// Budget totals for a job.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    /// Sum of budget lines.
    pub total_budgeted: Decimal,
    /// Sum of committed spend on budget lines.
    pub total_committed: Decimal,
    /// Sum of actuals on budget lines.
    pub total_actual: Decimal,
    /// `total_budgeted − total_actual`.
    pub total_variance: Decimal,
    /// Per-line breakdown.
    pub lines: Vec<BudgetLineSummary>,
}

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Adds a manual budget line.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` if the project is still a quote.
    /// Returns `EngineError::Validation` if the label is blank or the amount negative.
    pub fn add_budget_line(project: &Project, input: NewBudgetLine) -> Result<Project, EngineError> {
        Self::validate_budget_line(&input.label, input.amount)?;

        let mut next = project.clone();
        next.job_mut()?.budget.push(BudgetLine {
            id: BudgetLineId::new(),
            label: input.label.trim().to_string(),
            category: input.category,
            budget_amount: input.amount,
            source: BudgetSource::Manual,
            linked_variation_id: None,
            created_at: Utc::now(),
        });
        next.touch();
        Ok(next)
    }

    /// Validate budget line creation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` if the label is blank or the amount negative.
    pub fn validate_budget_line(label: &str, amount: Decimal) -> Result<(), EngineError> {
        if label.trim().is_empty() {
            return Err(EngineError::Validation("budget line label is required".into()));
        }

        if amount < Decimal::ZERO {
            return Err(EngineError::Validation(
                "budget amount cannot be negative".into(),
            ));
        }

        Ok(())
    }

    /// Summarizes the job budget against commitments and actuals.
    ///
    /// Quote-stage projects have an empty summary.
    #[must_use]
    pub fn summarize(project: &Project) -> BudgetSummary {
        let lines = CalcEngine::calc(project).budget_breakdown;

        let total_budgeted: Decimal = lines.iter().map(|l| l.budgeted).sum();
        let total_committed: Decimal = lines.iter().map(|l| l.committed).sum();
        let total_actual: Decimal = lines.iter().map(|l| l.actual).sum();

        BudgetSummary {
            total_budgeted,
            total_committed,
            total_actual,
            total_variance: round_cents(total_budgeted - total_actual),
            lines,
        }
    }
}
