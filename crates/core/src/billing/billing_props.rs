//! Property-based tests for invoices and the claim schedule.

use proptest::prelude::*;
use rust_decimal::Decimal;
use siteledger_shared::GuardPolicy;

use crate::advisory::Confirmation;
use crate::billing::claims::{ClaimScheduler, NewClaimStage};
use crate::billing::invoice::{InvoiceService, NewInvoice};
use crate::error::EngineError;
use crate::project::{ActualSource, ClaimBasis, ClaimTrigger, InvoiceStatus, Project};
use crate::test_support::job;

fn arb_invoice_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::Sent),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Void),
    ]
}

fn arb_basis() -> impl Strategy<Value = ClaimBasis> {
    prop_oneof![
        3 => (-1_000i64..12_000).prop_map(|bp| ClaimBasis::Percent(Decimal::new(bp, 2))),
        1 => (1i64..1_000_000).prop_map(|cents| ClaimBasis::Amount(Decimal::new(cents, 2))),
    ]
}

fn invoice_actuals(project: &Project) -> usize {
    project
        .job()
        .unwrap()
        .actuals
        .iter()
        .filter(|a| matches!(a.source, ActualSource::Invoice { .. }))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An invoice has one actual while paid and none otherwise, whatever path it took.
    #[test]
    fn prop_one_actual_per_paid_invoice(
        path in prop::collection::vec(arb_invoice_status(), 0..12),
    ) {
        let policy = GuardPolicy::default();
        let mut project = InvoiceService::add_invoice(
            &job(),
            NewInvoice { description: "Claim".to_string(), amount: Decimal::from(1000) },
            Confirmation::Confirmed,
            &policy,
        )
        .unwrap();
        let id = project.job().unwrap().invoices[0].id;

        for to in path {
            project = InvoiceService::set_invoice_status(
                &project,
                id,
                to,
                Confirmation::Confirmed,
                &policy,
            )
            .unwrap();

            let status = project.job().unwrap().invoices[0].status;
            let expected = usize::from(status == InvoiceStatus::Paid);
            prop_assert_eq!(invoice_actuals(&project), expected);
        }
    }

    /// Paid, sent, paid, void: never more than one actual, and none at the end.
    #[test]
    fn prop_paid_sent_paid_void(amount in 1i64..10_000_000) {
        let policy = GuardPolicy::default();
        let mut project = InvoiceService::add_invoice(
            &job(),
            NewInvoice { description: String::new(), amount: Decimal::new(amount, 2) },
            Confirmation::Confirmed,
            &policy,
        )
        .unwrap();
        let id = project.job().unwrap().invoices[0].id;

        for to in [InvoiceStatus::Paid, InvoiceStatus::Sent, InvoiceStatus::Paid, InvoiceStatus::Void] {
            project = InvoiceService::set_invoice_status(&project, id, to, Confirmation::Confirmed, &policy)
                .unwrap();
            prop_assert!(invoice_actuals(&project) <= 1);
        }
        prop_assert_eq!(invoice_actuals(&project), 0);
    }

    /// Claim percents never total more than 100; a percent stage is refused exactly
    /// when it would overflow, and an accepted stage adds exactly its own percent.
    #[test]
    fn prop_percent_sum_bounded(bases in prop::collection::vec(arb_basis(), 0..15)) {
        let mut project = job();
        for basis in bases {
            let before_total = ClaimScheduler::percent_total(&project.payment_schedule);
            let before_len = project.payment_schedule.len();
            let result = ClaimScheduler::add_claim_stage(
                &project,
                NewClaimStage { name: "Stage".to_string(), basis, due_on: ClaimTrigger::Milestone },
            );
            match (result, basis) {
                (Ok(next), ClaimBasis::Percent(percent)) => {
                    prop_assert_eq!(next.payment_schedule.len(), before_len + 1);
                    prop_assert_eq!(
                        ClaimScheduler::percent_total(&next.payment_schedule),
                        before_total + percent
                    );
                    project = next;
                }
                (Ok(next), ClaimBasis::Amount(_)) => {
                    prop_assert_eq!(next.payment_schedule.len(), before_len + 1);
                    prop_assert_eq!(ClaimScheduler::percent_total(&next.payment_schedule), before_total);
                    project = next;
                }
                (Err(EngineError::PercentSumExceeded { existing, requested }), ClaimBasis::Percent(percent)) => {
                    prop_assert_eq!(existing, before_total);
                    prop_assert_eq!(requested, percent);
                    prop_assert!(before_total + percent > Decimal::ONE_HUNDRED);
                }
                (Err(EngineError::Validation(_)), ClaimBasis::Percent(percent)) => {
                    prop_assert!(percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED);
                }
                (Err(err), _) => prop_assert!(false, "unexpected error: {}", err),
            }
            prop_assert!(ClaimScheduler::percent_total(&project.payment_schedule) <= Decimal::ONE_HUNDRED);
        }
    }
}
