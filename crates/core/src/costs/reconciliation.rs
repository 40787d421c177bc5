//! Commitment and supplier-bill reconciliation.
//!
//! Remaining amounts are always recomputed from the bills; nothing here is stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::types::CommitmentId;
use tracing::warn;

use super::bill::NewBill;
use crate::advisory::{Advisory, DuplicateReason};
use crate::error::EngineError;
use crate::project::{BillStatus, Commitment, CommitmentStatus, Project, SupplierBill};

/// How much of a commitment has been billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentExposure {
    /// Commitment ID.
    pub commitment_id: CommitmentId,
    /// Vendor display name.
    pub vendor: String,
    /// Commitment status.
    pub status: CommitmentStatus,
    /// Committed amount.
    pub amount: Decimal,
    /// Matched on non-void bills.
    pub matched: Decimal,
    /// `amount − matched`; negative when over-matched.
    pub remaining: Decimal,
}

/// Stateless reconciliation service.
pub struct Reconciliation;

impl Reconciliation {
    /// Returns the bill-line amounts matched to `commitment` on non-void bills.
    #[must_use]
    pub fn matched_amount(commitment: &Commitment, bills: &[SupplierBill]) -> Decimal {
        bills
            .iter()
            .filter(|bill| bill.status != BillStatus::Void)
            .map(|bill| bill.matched_to(commitment.id))
            .sum()
    }

    /// Returns `amount − matched`, ignoring void bills.
    #[must_use]
    pub fn commitment_remaining(commitment: &Commitment, bills: &[SupplierBill]) -> Decimal {
        commitment.amount - Self::matched_amount(commitment, bills)
    }

    /// Returns the advisories a new bill would raise.
    ///
    /// Flags every commitment the bill's lines would over-match and every non-void
    /// bill it resembles: same vendor and bill number, or same total on the same date.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound` for an unknown
    /// commitment.
    pub fn precheck_bill(project: &Project, bill: &NewBill) -> Result<Vec<Advisory>, EngineError> {
        let job = project.job()?;
        let mut advisories = Vec::new();

        let mut matched: Vec<(CommitmentId, Decimal)> = Vec::new();
        for line in &bill.lines {
            let Some(commitment_id) = line.commitment_id else {
                continue;
            };
            match matched.iter().position(|(id, _)| *id == commitment_id) {
                Some(index) => matched[index].1 += line.amount,
                None => matched.push((commitment_id, line.amount)),
            }
        }

        for (commitment_id, amount) in matched {
            let commitment = job
                .commitments
                .iter()
                .find(|c| c.id == commitment_id)
                .ok_or_else(|| EngineError::not_found("Commitment", commitment_id))?;
            let remaining = Self::commitment_remaining(commitment, &job.bills);
            if amount > remaining {
                advisories.push(Advisory::OverMatch {
                    commitment_id,
                    remaining,
                    matched: amount,
                });
            }
        }

        let vendor = bill.vendor.trim().to_lowercase();
        let number = bill.bill_number.trim().to_lowercase();
        let total = bill.total();
        for existing in job.bills.iter().filter(|b| b.status != BillStatus::Void) {
            let reason = if !number.is_empty()
                && existing.vendor.trim().to_lowercase() == vendor
                && existing.bill_number.trim().to_lowercase() == number
            {
                Some(DuplicateReason::VendorAndNumber)
            } else if existing.total() == total && existing.bill_date == bill.bill_date {
                Some(DuplicateReason::TotalAndDate)
            } else {
                None
            };

            if let Some(reason) = reason {
                advisories.push(Advisory::PossibleDuplicateBill {
                    existing_bill_id: existing.id,
                    reason,
                });
            }
        }

        for advisory in &advisories {
            warn!(%advisory, "bill pre-check raised advisory");
        }
        Ok(advisories)
    }

    /// Returns billed exposure for every commitment on the job.
    ///
    /// Quote-stage projects have no exposure.
    #[must_use]
    pub fn exposure(project: &Project) -> Vec<CommitmentExposure> {
        let Some(job) = project.job.as_ref() else {
            return Vec::new();
        };

        job.commitments
            .iter()
            .map(|commitment| {
                let matched = Self::matched_amount(commitment, &job.bills);
                CommitmentExposure {
                    commitment_id: commitment.id,
                    vendor: commitment.vendor.clone(),
                    status: commitment.status,
                    amount: commitment.amount,
                    matched,
                    remaining: commitment.amount - matched,
                }
            })
            .collect()
    }
}

/// Returns `amount − matched` for a commitment, ignoring void bills.
#[must_use]
pub fn commitment_remaining(commitment: &Commitment, bills: &[SupplierBill]) -> Decimal {
    Reconciliation::commitment_remaining(commitment, bills)
}
