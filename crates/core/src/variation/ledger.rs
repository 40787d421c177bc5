//! Variation ledger.
//!
//! Approval is the only variation write that reaches beyond `variations`: it also
//! writes one budget line and one ledger entry, all in the same returned snapshot.
//! The link on the budget line is the idempotency key, so approving twice never
//! produces a second line or entry.

use chrono::Utc;
use rust_decimal::Decimal;
use siteledger_shared::types::{BudgetLineId, VariationId, VariationLedgerEntryId};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::project::{
    BudgetLine, BudgetSource, JobRecords, Project, Variation, VariationLedgerEntry,
    VariationStatus,
};

/// Input for drafting a variation.
#[derive(Debug, Clone)]
pub struct NewVariation {
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Signed price change.
    pub amount: Decimal,
}

/// Stateless service for variation writes.
pub struct VariationLedger;

impl VariationLedger {
    /// Drafts a variation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` if the project is still a quote.
    /// Returns `EngineError::Validation` if the title is blank.
    pub fn add_variation(project: &Project, input: NewVariation) -> Result<Project, EngineError> {
        if input.title.trim().is_empty() {
            return Err(EngineError::Validation("variation title is required".into()));
        }

        let mut next = project.clone();
        next.job_mut()?.variations.push(Variation {
            id: VariationId::new(),
            title: input.title.trim().to_string(),
            description: input.description,
            amount: input.amount,
            status: VariationStatus::Draft,
            created_at: Utc::now(),
            sent_at: None,
            approved_at: None,
            rejected_at: None,
        });
        next.touch();
        Ok(next)
    }

    /// Sends a draft variation for sign-off. Any other status is left alone.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound`.
    pub fn send_variation(project: &Project, id: VariationId) -> Result<Project, EngineError> {
        let index = variation_index(project.job()?, id)?;
        let status = project.job()?.variations[index].status;
        if status != VariationStatus::Draft {
            debug!(variation_id = %id, %status, "only draft variations can be sent");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        let variation = &mut next.job_mut()?.variations[index];
        variation.status = VariationStatus::Sent;
        variation.sent_at = Some(Utc::now());
        next.touch();
        Ok(next)
    }

    /// Rejects a draft or sent variation. Terminal variations are left alone.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound`.
    pub fn reject_variation(project: &Project, id: VariationId) -> Result<Project, EngineError> {
        let index = variation_index(project.job()?, id)?;
        let status = project.job()?.variations[index].status;
        if status.is_terminal() {
            debug!(variation_id = %id, %status, "variation already decided");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        let variation = &mut next.job_mut()?.variations[index];
        variation.status = VariationStatus::Rejected;
        variation.rejected_at = Some(Utc::now());
        next.touch();

        info!(variation_id = %id, "variation rejected");
        Ok(next)
    }

    /// Approves a variation and books it into the budget.
    ///
    /// Creates the linked budget line and ledger entry only if they are missing.
    /// Rejected variations are left alone, and an already-approved variation with
    /// both records comes back unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound`.
    pub fn approve_variation(project: &Project, id: VariationId) -> Result<Project, EngineError> {
        let job = project.job()?;
        let index = variation_index(job, id)?;
        let variation = &job.variations[index];

        if variation.status == VariationStatus::Rejected {
            debug!(variation_id = %id, "rejected variations cannot be approved");
            return Ok(project.clone());
        }
        if variation.status == VariationStatus::Approved
            && linked_budget_line(job, id).is_some()
            && job.variation_ledger.iter().any(|e| e.variation_id == id)
        {
            debug!(variation_id = %id, "variation already approved and booked");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        let now = Utc::now();

        let variation = &mut job.variations[index];
        if variation.status != VariationStatus::Approved {
            variation.status = VariationStatus::Approved;
            variation.approved_at = Some(now);
        }
        let variation = variation.clone();
        let approved_at = variation.approved_at.unwrap_or(now);

        let budget_line_id = match linked_budget_line(job, id) {
            Some(existing) => existing,
            None => {
                let line_id = BudgetLineId::new();
                job.budget.push(BudgetLine {
                    id: line_id,
                    label: format!("Variation: {}", variation.title),
                    category: None,
                    budget_amount: variation.amount,
                    source: BudgetSource::Variation,
                    linked_variation_id: Some(id),
                    created_at: now,
                });
                line_id
            }
        };

        if !job.variation_ledger.iter().any(|e| e.variation_id == id) {
            job.variation_ledger.push(VariationLedgerEntry {
                id: VariationLedgerEntryId::new(),
                variation_id: id,
                amount: variation.amount,
                budget_line_id,
                approved_at,
            });
        }
        next.touch();

        info!(
            variation_id = %id,
            amount = %variation.amount,
            %budget_line_id,
            "variation approved"
        );
        Ok(next)
    }
}

fn variation_index(job: &JobRecords, id: VariationId) -> Result<usize, EngineError> {
    job.variations
        .iter()
        .position(|v| v.id == id)
        .ok_or_else(|| EngineError::not_found("Variation", id))
}

fn linked_budget_line(job: &JobRecords, id: VariationId) -> Option<BudgetLineId> {
    job.budget
        .iter()
        .find(|line| line.linked_variation_id == Some(id))
        .map(|line| line.id)
}
