//! Client invoices.
//!
//! Paying an invoice posts one actual keyed by the invoice ID and marks its claim stage
//! paid. Leaving Paid, or voiding, removes that actual and hands the claim stage back
//! to the schedule as Planned.

use chrono::{Days, Utc};
use rust_decimal::Decimal;
use siteledger_shared::GuardPolicy;
use siteledger_shared::types::{ClaimStageId, InvoiceId};
use tracing::{debug, info, warn};

use crate::advisory::{self, Advisory, Confirmation};
use crate::calc::CalcEngine;
use crate::costs::actual::{post_actual, reverse_actuals};
use crate::error::EngineError;
use crate::project::{ActualSource, ClaimStatus, Invoice, InvoiceStatus, JobRecords, Project};

/// Prefix of generated invoice numbers.
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

/// Input for raising a manual invoice.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Description.
    pub description: String,
    /// Invoice amount.
    pub amount: Decimal,
}

/// Stateless service for client invoices.
pub struct InvoiceService;

impl InvoiceService {
    /// Returns the advisories raised by invoicing `amount` on top of what is invoiced.
    #[must_use]
    pub fn precheck_invoice(project: &Project, amount: Decimal) -> Vec<Advisory> {
        let totals = CalcEngine::calc(project);
        if totals.invoiced_total + amount > totals.current_contract_value {
            let advisory = Advisory::OverInvoice {
                contract_value: totals.current_contract_value,
                invoiced_total: totals.invoiced_total,
                proposed: amount,
            };
            warn!(%advisory, "invoice pre-check raised advisory");
            vec![advisory]
        } else {
            Vec::new()
        }
    }

    /// Raises a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted`, `EngineError::Validation` for a non-positive
    /// amount, or the advisory errors from an over-invoice.
    pub fn add_invoice(
        project: &Project,
        input: NewInvoice,
        confirmation: Confirmation,
        policy: &GuardPolicy,
    ) -> Result<Project, EngineError> {
        if input.amount <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "invoice amount must be positive".into(),
            ));
        }
        project.job()?;
        advisory::enforce(
            Self::precheck_invoice(project, input.amount),
            confirmation,
            policy,
        )?;

        let mut next = project.clone();
        let job = next.job_mut()?;
        let invoice = draft_invoice(job, input.description, input.amount, None);
        info!(number = %invoice.number, amount = %invoice.amount, "invoice raised");
        job.invoices.push(invoice);
        next.touch();
        Ok(next)
    }

    /// Moves an invoice to `to`.
    ///
    /// Moving a draft into Sent or Paid re-runs the over-invoice check. Illegal
    /// transitions leave the snapshot unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted`, `EngineError::NotFound`, or the advisory
    /// errors from an over-invoice.
    pub fn set_invoice_status(
        project: &Project,
        id: InvoiceId,
        to: InvoiceStatus,
        confirmation: Confirmation,
        policy: &GuardPolicy,
    ) -> Result<Project, EngineError> {
        let index = project
            .job()?
            .invoices
            .iter()
            .position(|inv| inv.id == id)
            .ok_or_else(|| EngineError::not_found("Invoice", id))?;

        let current = &project.job()?.invoices[index];
        let from = current.status;
        if !from.can_transition_to(to) {
            debug!(invoice_id = %id, %from, %to, "ignoring invoice transition");
            return Ok(project.clone());
        }
        if !from.counts_as_invoiced() && to.counts_as_invoiced() {
            advisory::enforce(
                Self::precheck_invoice(project, current.amount),
                confirmation,
                policy,
            )?;
        }

        let mut next = project.clone();
        let terms = next.payment_terms_days;
        let job = next.job_mut()?;
        let now = Utc::now();
        let invoice = &mut job.invoices[index];
        invoice.status = to;
        let claim_stage_id = invoice.claim_stage_id;
        let number = invoice.number.clone();
        let amount = invoice.amount;

        if to.counts_as_invoiced() && invoice.sent_at.is_none() {
            invoice.sent_at = Some(now);
            invoice.due_date = now.date_naive().checked_add_days(Days::new(u64::from(terms)));
        }

        let mut release_stage = to == InvoiceStatus::Void;
        if from == InvoiceStatus::Paid {
            invoice.paid_at = None;
            let removed = reverse_actuals(job, |source| {
                matches!(source, ActualSource::Invoice { invoice_id } if *invoice_id == id)
            });
            release_stage = true;
            info!(%number, %to, removed, "invoice payment reversed");
        }

        if to == InvoiceStatus::Paid {
            job.invoices[index].paid_at = Some(now);
            post_actual(
                job,
                ActualSource::Invoice { invoice_id: id },
                format!("Invoice {number}"),
                amount,
                None,
            );
            info!(%number, %amount, "invoice paid");
        }

        if let Some(stage_id) = claim_stage_id {
            if release_stage {
                job.invoices[index].claim_stage_id = None;
            }
            update_claim_stage(&mut next, stage_id, to, release_stage);
        }

        next.touch();
        Ok(next)
    }
}

/// Builds a draft invoice with the next sequential number.
pub(crate) fn draft_invoice(
    job: &JobRecords,
    description: String,
    amount: Decimal,
    claim_stage_id: Option<ClaimStageId>,
) -> Invoice {
    Invoice {
        id: InvoiceId::new(),
        number: next_invoice_number(job),
        description,
        amount,
        status: InvoiceStatus::Draft,
        claim_stage_id,
        created_at: Utc::now(),
        sent_at: None,
        due_date: None,
        paid_at: None,
    }
}

/// Returns the next `INV-0001` style number, after the highest one in use.
#[must_use]
pub fn next_invoice_number(job: &JobRecords) -> String {
    let highest = job
        .invoices
        .iter()
        .filter_map(|inv| inv.number.strip_prefix(INVOICE_NUMBER_PREFIX))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{INVOICE_NUMBER_PREFIX}{:04}", highest + 1)
}

fn update_claim_stage(project: &mut Project, stage_id: ClaimStageId, to: InvoiceStatus, release: bool) {
    let Some(stage) = project
        .payment_schedule
        .iter_mut()
        .find(|stage| stage.id == stage_id)
    else {
        return;
    };

    if release {
        stage.status = ClaimStatus::Planned;
        stage.invoice_id = None;
    } else if to == InvoiceStatus::Paid {
        stage.status = ClaimStatus::Paid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{job, quote_with_subtotal};
    use rust_decimal_macros::dec;

    fn raise(project: &Project, amount: Decimal) -> (Project, InvoiceId) {
        let next = InvoiceService::add_invoice(
            project,
            NewInvoice {
                description: "Progress claim".to_string(),
                amount,
            },
            Confirmation::Unconfirmed,
            &GuardPolicy::default(),
        )
        .unwrap();
        let id = next.job().unwrap().invoices.last().unwrap().id;
        (next, id)
    }

    fn set(project: &Project, id: InvoiceId, to: InvoiceStatus) -> Project {
        InvoiceService::set_invoice_status(
            project,
            id,
            to,
            Confirmation::Unconfirmed,
            &GuardPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_numbers_are_sequential() {
        let (project, _) = raise(&job(), dec!(1000));
        let (project, _) = raise(&project, dec!(1000));
        let numbers: Vec<&str> = project
            .job()
            .unwrap()
            .invoices
            .iter()
            .map(|inv| inv.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["INV-0001", "INV-0002"]);
    }

    #[test]
    fn test_invoice_requires_job() {
        let result = InvoiceService::add_invoice(
            &quote_with_subtotal(dec!(1000)),
            NewInvoice {
                description: String::new(),
                amount: dec!(10),
            },
            Confirmation::Confirmed,
            &GuardPolicy::default(),
        );
        assert_eq!(result, Err(EngineError::JobNotStarted));
    }

    #[test]
    fn test_send_sets_due_date() {
        let (project, id) = raise(&job(), dec!(1000));
        let sent = set(&project, id, InvoiceStatus::Sent);
        let invoice = &sent.job().unwrap().invoices[0];

        let expected = invoice
            .sent_at
            .unwrap()
            .date_naive()
            .checked_add_days(Days::new(14))
            .unwrap();
        assert_eq!(invoice.due_date, Some(expected));
        assert_eq!(CalcEngine::calc(&sent).outstanding, dec!(1000));
    }

    #[test]
    fn test_pay_cycle_keeps_one_actual() {
        let (project, id) = raise(&job(), dec!(1000));
        let project = set(&project, id, InvoiceStatus::Sent);
        let project = set(&project, id, InvoiceStatus::Paid);
        assert_eq!(project.job().unwrap().actuals.len(), 1);

        let project = set(&project, id, InvoiceStatus::Sent);
        assert!(project.job().unwrap().actuals.is_empty());

        let project = set(&project, id, InvoiceStatus::Paid);
        let project = set(&project, id, InvoiceStatus::Paid);
        assert_eq!(project.job().unwrap().actuals.len(), 1);

        let project = set(&project, id, InvoiceStatus::Void);
        assert!(project.job().unwrap().actuals.is_empty());
        assert_eq!(CalcEngine::calc(&project).invoiced_total, Decimal::ZERO);
    }

    #[test]
    fn test_void_is_terminal() {
        let (project, id) = raise(&job(), dec!(1000));
        let void = set(&project, id, InvoiceStatus::Void);
        assert_eq!(set(&void, id, InvoiceStatus::Sent), void);
    }

    #[test]
    fn test_over_invoice_on_create() {
        let project = job();
        let result = InvoiceService::add_invoice(
            &project,
            NewInvoice {
                description: "Everything".to_string(),
                amount: dec!(135300.01),
            },
            Confirmation::Unconfirmed,
            &GuardPolicy::default(),
        );
        assert!(matches!(result, Err(EngineError::ConfirmationRequired(_))));

        let (exact, _) = raise(&project, dec!(135300));
        assert_eq!(exact.job().unwrap().invoices.len(), 1);
    }

    #[test]
    fn test_over_invoice_on_send() {
        let (project, first) = raise(&job(), dec!(100000));
        let (project, second) = raise(&project, dec!(40000));
        let project = set(&project, first, InvoiceStatus::Sent);

        let blocked = InvoiceService::set_invoice_status(
            &project,
            second,
            InvoiceStatus::Sent,
            Confirmation::Unconfirmed,
            &GuardPolicy::default(),
        );
        assert!(matches!(blocked, Err(EngineError::ConfirmationRequired(_))));

        let capped = InvoiceService::set_invoice_status(
            &project,
            second,
            InvoiceStatus::Sent,
            Confirmation::Confirmed,
            &GuardPolicy {
                hard_cap_over_invoice: true,
                hard_cap_over_match: false,
            },
        );
        assert!(matches!(capped, Err(EngineError::HardCapExceeded(_))));

        let forced = InvoiceService::set_invoice_status(
            &project,
            second,
            InvoiceStatus::Sent,
            Confirmation::Confirmed,
            &GuardPolicy::default(),
        )
        .unwrap();
        assert_eq!(CalcEngine::calc(&forced).invoiced_total, dec!(140000));
    }

    #[test]
    fn test_retention_never_changes_invoice_math() {
        let mut project = job();
        project.retention_percent = dec!(5);
        let (project, id) = raise(&project, dec!(10000));
        let project = set(&project, id, InvoiceStatus::Sent);

        let totals = CalcEngine::calc(&project);
        assert_eq!(totals.invoiced_total, dec!(10000));
        assert_eq!(totals.retention_held, dec!(6765));
    }
}
