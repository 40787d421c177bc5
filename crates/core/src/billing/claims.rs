//! Payment schedule (progress claims).

use rust_decimal::Decimal;
use siteledger_shared::GuardPolicy;
use siteledger_shared::types::{ClaimStageId, percent_of, round_cents};
use tracing::{debug, info};

use super::invoice::{InvoiceService, draft_invoice};
use crate::advisory::{self, Confirmation};
use crate::calc::CalcEngine;
use crate::error::EngineError;
use crate::project::{ClaimBasis, ClaimStage, ClaimStatus, ClaimTrigger, Project};

/// Input for adding a claim stage.
#[derive(Debug, Clone)]
pub struct NewClaimStage {
    /// Stage name.
    pub name: String,
    /// Percent of contract or fixed amount.
    pub basis: ClaimBasis,
    /// What makes the stage due.
    pub due_on: ClaimTrigger,
}

/// Stateless claim scheduler.
pub struct ClaimScheduler;

impl ClaimScheduler {
    /// Returns what a stage claims against `current_contract_value`.
    ///
    /// Percent stages round to cents.
    #[must_use]
    pub fn resolved_amount(stage: &ClaimStage, current_contract_value: Decimal) -> Decimal {
        match stage.basis {
            ClaimBasis::Percent(percent) => round_cents(percent_of(current_contract_value, percent)),
            ClaimBasis::Amount(amount) => amount,
        }
    }

    /// Returns the sum of percents across percent-based stages.
    #[must_use]
    pub fn percent_total(stages: &[ClaimStage]) -> Decimal {
        stages.iter().filter_map(ClaimStage::percent).sum()
    }

    /// Returns every stage with its resolved amount against the current contract value.
    #[must_use]
    pub fn schedule(project: &Project) -> Vec<(ClaimStage, Decimal)> {
        let contract = CalcEngine::calc(project).current_contract_value;
        project
            .payment_schedule
            .iter()
            .map(|stage| (stage.clone(), Self::resolved_amount(stage, contract)))
            .collect()
    }

    /// Appends a planned stage to the payment schedule.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank name, a percent outside (0, 100] or
    /// a non-positive amount. Returns `EngineError::PercentSumExceeded` if the schedule
    /// would claim more than 100%.
    pub fn add_claim_stage(project: &Project, input: NewClaimStage) -> Result<Project, EngineError> {
        if input.name.trim().is_empty() {
            return Err(EngineError::Validation("claim stage name is required".into()));
        }

        match input.basis {
            ClaimBasis::Percent(percent) => {
                if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                    return Err(EngineError::Validation(
                        "claim percent must be above 0 and at most 100".into(),
                    ));
                }
                let existing = Self::percent_total(&project.payment_schedule);
                if existing + percent > Decimal::ONE_HUNDRED {
                    return Err(EngineError::PercentSumExceeded {
                        existing,
                        requested: percent,
                    });
                }
            }
            ClaimBasis::Amount(amount) => {
                if amount <= Decimal::ZERO {
                    return Err(EngineError::Validation(
                        "claim amount must be positive".into(),
                    ));
                }
            }
        }

        let mut next = project.clone();
        next.payment_schedule.push(ClaimStage {
            id: ClaimStageId::new(),
            name: input.name.trim().to_string(),
            basis: input.basis,
            due_on: input.due_on,
            status: ClaimStatus::Planned,
            invoice_id: None,
        });
        next.touch();
        Ok(next)
    }

    /// Raises a draft invoice for a planned stage and marks the stage invoiced.
    ///
    /// Stages that are not Planned are left alone.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted`, `EngineError::NotFound`, or the advisory
    /// errors from an over-invoice.
    pub fn create_invoice_from_claim(
        project: &Project,
        stage_id: ClaimStageId,
        confirmation: Confirmation,
        policy: &GuardPolicy,
    ) -> Result<Project, EngineError> {
        project.job()?;
        let index = project
            .payment_schedule
            .iter()
            .position(|stage| stage.id == stage_id)
            .ok_or_else(|| EngineError::not_found("Claim stage", stage_id))?;

        let stage = &project.payment_schedule[index];
        if stage.status != ClaimStatus::Planned {
            debug!(%stage_id, status = %stage.status, "claim stage already invoiced");
            return Ok(project.clone());
        }

        let contract = CalcEngine::calc(project).current_contract_value;
        let amount = Self::resolved_amount(stage, contract);
        advisory::enforce(
            InvoiceService::precheck_invoice(project, amount),
            confirmation,
            policy,
        )?;

        let mut next = project.clone();
        let job = next.job_mut()?;
        let invoice = draft_invoice(job, stage.name.clone(), amount, Some(stage_id));
        let invoice_id = invoice.id;
        info!(%stage_id, number = %invoice.number, %amount, "claim invoiced");
        job.invoices.push(invoice);

        let stage = &mut next.payment_schedule[index];
        stage.status = ClaimStatus::Invoiced;
        stage.invoice_id = Some(invoice_id);
        next.touch();
        Ok(next)
    }
}
