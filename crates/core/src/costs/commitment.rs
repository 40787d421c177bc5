//! Commitments: reserved spend against a vendor.

use chrono::Utc;
use rust_decimal::Decimal;
use siteledger_shared::types::{BudgetLineId, CommitmentId, TradeId};
use tracing::debug;

use super::actual::check_budget_line;
use crate::error::EngineError;
use crate::project::{Commitment, CommitmentStatus, Project};

/// Input for adding a commitment.
#[derive(Debug, Clone)]
pub struct NewCommitment {
    /// Vendor display name.
    pub vendor: String,
    /// Vendor in the trade directory, if linked.
    pub trade_id: Option<TradeId>,
    /// What was ordered.
    pub description: String,
    /// Committed amount.
    pub amount: Decimal,
    /// Initial status; `Draft` or `Committed`.
    pub status: CommitmentStatus,
    /// Budget line the commitment draws on, if any.
    pub budget_line_id: Option<BudgetLineId>,
}

/// Stateless service for commitment writes.
pub struct CommitmentService;

impl CommitmentService {
    /// Adds a commitment.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` if the project is still a quote.
    /// Returns `EngineError::Validation` for a blank vendor, a non-positive amount or a
    /// cancelled initial status. Returns `EngineError::NotFound` for an unknown budget line.
    pub fn add_commitment(project: &Project, input: NewCommitment) -> Result<Project, EngineError> {
        if input.vendor.trim().is_empty() {
            return Err(EngineError::Validation("vendor is required".into()));
        }
        if input.amount <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "commitment amount must be positive".into(),
            ));
        }
        if input.status == CommitmentStatus::Cancelled {
            return Err(EngineError::Validation(
                "a commitment cannot start cancelled".into(),
            ));
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        check_budget_line(job, input.budget_line_id)?;
        job.commitments.push(Commitment {
            id: CommitmentId::new(),
            vendor: input.vendor.trim().to_string(),
            trade_id: input.trade_id,
            description: input.description,
            amount: input.amount,
            status: input.status,
            budget_line_id: input.budget_line_id,
            created_at: Utc::now(),
        });
        next.touch();
        Ok(next)
    }

    /// Moves a commitment between statuses.
    ///
    /// Draft and Committed move freely; Cancelled is terminal. Anything else leaves the
    /// snapshot unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound`.
    pub fn set_commitment_status(
        project: &Project,
        id: CommitmentId,
        to: CommitmentStatus,
    ) -> Result<Project, EngineError> {
        let index = project
            .job()?
            .commitments
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EngineError::not_found("Commitment", id))?;

        let from = project.job()?.commitments[index].status;
        if !from.can_transition_to(to) {
            debug!(commitment_id = %id, %from, %to, "ignoring commitment transition");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        next.job_mut()?.commitments[index].status = to;
        next.touch();
        Ok(next)
    }
}
