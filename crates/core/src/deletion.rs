//! Deletion policy.
//!
//! Entities tied to paid, approved or otherwise settled state cannot be deleted. Each
//! entity kind has a `can_delete_*` predicate for the host and a guarded `delete_*`
//! write that refuses with `EngineError::DeletionRefused`.

use siteledger_shared::types::{
    ActualId, BillId, BudgetLineId, ClaimStageId, CommitmentId, InvoiceId, VariationId,
};
use tracing::info;

use crate::error::EngineError;
use crate::project::{
    Actual, ActualSource, BillStatus, BudgetLine, ClaimStage, ClaimStatus, Commitment,
    CommitmentStatus, Invoice, InvoiceStatus, Project, SupplierBill, Variation,
};

/// Only draft invoices may be deleted.
#[must_use]
pub fn can_delete_invoice(invoice: &Invoice) -> bool {
    invoice.status == InvoiceStatus::Draft
}

/// Only draft and sent variations may be deleted; approved and rejected are settled.
#[must_use]
pub fn can_delete_variation(variation: &Variation) -> bool {
    !variation.status.is_terminal()
}

/// Lines generated by a variation approval may not be deleted.
#[must_use]
pub fn can_delete_budget_line(line: &BudgetLine) -> bool {
    line.linked_variation_id.is_none()
}

/// A commitment may be deleted only while it is not cancelled and no live bill is
/// matched to it.
#[must_use]
pub fn can_delete_commitment(commitment: &Commitment, bills: &[SupplierBill]) -> bool {
    commitment.status != CommitmentStatus::Cancelled
        && bills
        .iter()
        .filter(|bill| bill.status != BillStatus::Void)
        .all(|bill| bill.lines.iter().all(|l| l.commitment_id != Some(commitment.id)))
}

/// Only draft bills may be deleted.
#[must_use]
pub fn can_delete_bill(bill: &SupplierBill) -> bool {
    bill.status == BillStatus::Draft
}

/// Only manual actuals may be deleted; the rest follow their bill or invoice.
#[must_use]
pub fn can_delete_actual(actual: &Actual) -> bool {
    actual.source == ActualSource::Manual
}

/// Only planned claim stages may be deleted.
#[must_use]
pub fn can_delete_claim_stage(stage: &ClaimStage) -> bool {
    stage.status == ClaimStatus::Planned
}

fn refuse(entity: &'static str, reason: &'static str) -> EngineError {
    EngineError::DeletionRefused { entity, reason }
}

/// Stateless service for guarded deletes.
pub struct DeletionService;

impl DeletionService {
    /// Deletes a draft invoice, releasing any claim stage it was raised for.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_invoice(project: &Project, id: InvoiceId) -> Result<Project, EngineError> {
        let invoice = project
            .job()?
            .invoices
            .iter()
            .find(|inv| inv.id == id)
            .ok_or_else(|| EngineError::not_found("Invoice", id))?;
        if !can_delete_invoice(invoice) {
            return Err(refuse("invoice", "only draft invoices can be deleted"));
        }

        let mut next = project.clone();
        next.job_mut()?.invoices.retain(|inv| inv.id != id);
        for stage in &mut next.payment_schedule {
            if stage.invoice_id == Some(id) {
                stage.invoice_id = None;
                stage.status = ClaimStatus::Planned;
            }
        }
        next.touch();

        info!(invoice_id = %id, "invoice deleted");
        Ok(next)
    }

    /// Deletes a draft or sent variation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_variation(project: &Project, id: VariationId) -> Result<Project, EngineError> {
        let variation = project
            .job()?
            .variations
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| EngineError::not_found("Variation", id))?;
        if !can_delete_variation(variation) {
            return Err(refuse("variation", "only draft or sent variations can be deleted"));
        }

        let mut next = project.clone();
        next.job_mut()?.variations.retain(|v| v.id != id);
        next.touch();
        Ok(next)
    }

    /// Deletes a budget line that was not generated by a variation.
    ///
    /// Commitments, bill lines and actuals that referenced it are unlinked.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_budget_line(project: &Project, id: BudgetLineId) -> Result<Project, EngineError> {
        let line = project
            .job()?
            .budget
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| EngineError::not_found("Budget line", id))?;
        if !can_delete_budget_line(line) {
            return Err(refuse("budget line", "the line belongs to an approved variation"));
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        job.budget.retain(|l| l.id != id);
        let unlink = |slot: &mut Option<BudgetLineId>| {
            if *slot == Some(id) {
                *slot = None;
            }
        };
        job.commitments
            .iter_mut()
            .for_each(|c| unlink(&mut c.budget_line_id));
        job.actuals
            .iter_mut()
            .for_each(|a| unlink(&mut a.budget_line_id));
        job.bills
            .iter_mut()
            .flat_map(|b| b.lines.iter_mut())
            .for_each(|l| unlink(&mut l.budget_line_id));
        next.touch();
        Ok(next)
    }

    /// Deletes a commitment that is not cancelled and has no live bills matched to it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_commitment(project: &Project, id: CommitmentId) -> Result<Project, EngineError> {
        let job = project.job()?;
        let commitment = job
            .commitments
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::not_found("Commitment", id))?;
        if !can_delete_commitment(commitment, &job.bills) {
            return Err(refuse(
                "commitment",
                "cancelled commitments and commitments with live bills are kept",
            ));
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        job.commitments.retain(|c| c.id != id);
        job.bills
            .iter_mut()
            .flat_map(|b| b.lines.iter_mut())
            .filter(|l| l.commitment_id == Some(id))
            .for_each(|l| l.commitment_id = None);
        next.touch();
        Ok(next)
    }

    /// Deletes a draft bill.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_bill(project: &Project, id: BillId) -> Result<Project, EngineError> {
        let bill = project
            .job()?
            .bills
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| EngineError::not_found("Bill", id))?;
        if !can_delete_bill(bill) {
            return Err(refuse("bill", "only draft bills can be deleted"));
        }

        let mut next = project.clone();
        next.job_mut()?.bills.retain(|b| b.id != id);
        next.touch();
        Ok(next)
    }

    /// Deletes a manual actual.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound`, `EngineError::JobNotStarted` or
    /// `EngineError::DeletionRefused`.
    pub fn delete_actual(project: &Project, id: ActualId) -> Result<Project, EngineError> {
        let actual = project
            .job()?
            .actuals
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found("Actual", id))?;
        if !can_delete_actual(actual) {
            return Err(refuse("actual", "reverse the bill or invoice payment instead"));
        }

        let mut next = project.clone();
        next.job_mut()?.actuals.retain(|a| a.id != id);
        next.touch();
        Ok(next)
    }

    /// Deletes a planned claim stage.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` or `EngineError::DeletionRefused`.
    pub fn delete_claim_stage(project: &Project, id: ClaimStageId) -> Result<Project, EngineError> {
        let stage = project
            .payment_schedule
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::not_found("Claim stage", id))?;
        if !can_delete_claim_stage(stage) {
            return Err(refuse("claim stage", "the stage has been invoiced"));
        }

        let mut next = project.clone();
        next.payment_schedule.retain(|s| s.id != id);
        next.touch();
        Ok(next)
    }
}
