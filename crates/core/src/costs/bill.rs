//! Supplier bills.
//!
//! Paying a bill posts one actual per line, keyed by `(bill_id, line_id)`. Moving a
//! bill out of Paid removes exactly those actuals.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use siteledger_shared::GuardPolicy;
use siteledger_shared::types::{BillId, BillLineId, BudgetLineId, CommitmentId, TradeId};
use tracing::{debug, info};

use super::actual::{check_budget_line, post_actual, reverse_actuals};
use super::reconciliation::Reconciliation;
use crate::advisory::{self, Confirmation};
use crate::error::EngineError;
use crate::project::{ActualSource, BillLine, BillStatus, Project, SupplierBill};

/// Input for one bill line.
#[derive(Debug, Clone)]
pub struct NewBillLine {
    /// Line description.
    pub description: String,
    /// Line amount.
    pub amount: Decimal,
    /// Commitment to match against, if any.
    pub commitment_id: Option<CommitmentId>,
    /// Budget line the cost lands on, if any.
    pub budget_line_id: Option<BudgetLineId>,
}

/// Input for entering a supplier bill.
#[derive(Debug, Clone)]
pub struct NewBill {
    /// Vendor display name.
    pub vendor: String,
    /// Vendor in the trade directory, if linked.
    pub trade_id: Option<TradeId>,
    /// Supplier's bill number.
    pub bill_number: String,
    /// Date printed on the bill.
    pub bill_date: NaiveDate,
    /// Bill lines.
    pub lines: Vec<NewBillLine>,
}

impl NewBill {
    /// Returns the sum of all line amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// Stateless service for supplier bill writes.
pub struct BillService;

impl BillService {
    /// Enters a draft supplier bill.
    ///
    /// Over-match and possible-duplicate advisories block the write until confirmed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank vendor, no lines or a non-positive
    /// line amount. Returns `EngineError::NotFound` for an unknown commitment or budget
    /// line, and `EngineError::ConfirmationRequired` / `EngineError::HardCapExceeded`
    /// per the advisories raised.
    pub fn add_bill(
        project: &Project,
        input: NewBill,
        confirmation: Confirmation,
        policy: &GuardPolicy,
    ) -> Result<Project, EngineError> {
        if input.vendor.trim().is_empty() {
            return Err(EngineError::Validation("vendor is required".into()));
        }
        if input.lines.is_empty() {
            return Err(EngineError::Validation(
                "a bill needs at least one line".into(),
            ));
        }
        if input.lines.iter().any(|line| line.amount <= Decimal::ZERO) {
            return Err(EngineError::Validation(
                "bill line amounts must be positive".into(),
            ));
        }

        let job = project.job()?;
        for line in &input.lines {
            check_budget_line(job, line.budget_line_id)?;
        }
        let advisories = Reconciliation::precheck_bill(project, &input)?;
        advisory::enforce(advisories, confirmation, policy)?;

        let bill = SupplierBill {
            id: BillId::new(),
            vendor: input.vendor.trim().to_string(),
            trade_id: input.trade_id,
            bill_number: input.bill_number.trim().to_string(),
            bill_date: input.bill_date,
            status: BillStatus::Draft,
            lines: input
                .lines
                .into_iter()
                .map(|line| BillLine {
                    id: BillLineId::new(),
                    description: line.description,
                    amount: line.amount,
                    commitment_id: line.commitment_id,
                    budget_line_id: line.budget_line_id,
                })
                .collect(),
            paid_at: None,
        };

        let mut next = project.clone();
        next.job_mut()?.bills.push(bill);
        next.touch();
        Ok(next)
    }

    /// Moves a bill to `to`.
    ///
    /// Entering Paid posts one actual per line; leaving Paid removes them. Illegal
    /// transitions leave the snapshot unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` or `EngineError::NotFound`.
    pub fn set_bill_status(
        project: &Project,
        id: BillId,
        to: BillStatus,
    ) -> Result<Project, EngineError> {
        let index = project
            .job()?
            .bills
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| EngineError::not_found("Bill", id))?;

        let from = project.job()?.bills[index].status;
        if !from.can_transition_to(to) {
            debug!(bill_id = %id, %from, %to, "ignoring bill transition");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        let job = next.job_mut()?;
        job.bills[index].status = to;

        if from == BillStatus::Paid {
            job.bills[index].paid_at = None;
            let removed = reverse_actuals(job, |source| {
                matches!(source, ActualSource::Bill { bill_id, .. } if *bill_id == id)
            });
            info!(bill_id = %id, %to, removed, "bill payment reversed");
        }

        if to == BillStatus::Paid {
            job.bills[index].paid_at = Some(Utc::now());
            let bill = job.bills[index].clone();
            let mut posted = 0usize;
            for line in &bill.lines {
                let budget_line_id = line.budget_line_id.or_else(|| {
                    line.commitment_id.and_then(|cid| {
                        job.commitments
                            .iter()
                            .find(|c| c.id == cid)
                            .and_then(|c| c.budget_line_id)
                    })
                });
                let description = if line.description.is_empty() {
                    format!("{} {}", bill.vendor, bill.bill_number)
                } else {
                    format!("{} {}: {}", bill.vendor, bill.bill_number, line.description)
                };
                let source = ActualSource::Bill {
                    bill_id: id,
                    line_id: line.id,
                };
                if post_actual(job, source, description, line.amount, budget_line_id) {
                    posted += 1;
                }
            }
            info!(bill_id = %id, posted, total = %bill.total(), "bill paid");
        }

        next.touch();
        Ok(next)
    }
}
