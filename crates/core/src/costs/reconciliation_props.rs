//! Property-based tests for commitment reconciliation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use siteledger_shared::GuardPolicy;

use crate::advisory::Confirmation;
use crate::costs::bill::{BillService, NewBill, NewBillLine};
use crate::costs::commitment::{CommitmentService, NewCommitment};
use crate::costs::reconciliation::commitment_remaining;
use crate::project::{BillStatus, CommitmentStatus, Project};
use crate::test_support::job;

fn arb_cents() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_status() -> impl Strategy<Value = BillStatus> {
    prop_oneof![
        Just(BillStatus::Draft),
        Just(BillStatus::Approved),
        Just(BillStatus::Paid),
        Just(BillStatus::Void),
    ]
}

fn committed_job(amount: Decimal) -> Project {
    CommitmentService::add_commitment(
        &job(),
        NewCommitment {
            vendor: "Prop Supplies".to_string(),
            trade_id: None,
            description: String::new(),
            amount,
            status: CommitmentStatus::Committed,
            budget_line_id: None,
        },
    )
    .unwrap()
}

fn remaining(project: &Project) -> Decimal {
    let job = project.job().unwrap();
    commitment_remaining(&job.commitments[0], &job.bills)
}

fn add_matched_bill(project: &Project, index: usize, amount: Decimal) -> Project {
    let commitment_id = project.job().unwrap().commitments[0].id;
    BillService::add_bill(
        project,
        NewBill {
            vendor: "Prop Supplies".to_string(),
            trade_id: None,
            bill_number: format!("P-{index}"),
            bill_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            lines: vec![NewBillLine {
                description: String::new(),
                amount,
                commitment_id: Some(commitment_id),
                budget_line_id: None,
            }],
        },
        Confirmation::Confirmed,
        &GuardPolicy::default(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Adding matched bills never increases what is left on the commitment.
    #[test]
    fn prop_remaining_non_increasing(
        amount in arb_cents(),
        bills in prop::collection::vec(arb_cents(), 0..10),
    ) {
        let mut project = committed_job(amount);
        let mut previous = remaining(&project);
        prop_assert_eq!(previous, amount);

        for (index, bill) in bills.iter().enumerate() {
            project = add_matched_bill(&project, index, *bill);
            let now = remaining(&project);
            prop_assert!(now <= previous);
            prop_assert_eq!(previous - now, *bill);
            previous = now;
        }
    }

    /// Void bills never count against the commitment, whatever else happened to them.
    #[test]
    fn prop_void_bills_do_not_count(
        amount in arb_cents(),
        bills in prop::collection::vec((arb_cents(), prop::collection::vec(arb_status(), 0..4)), 0..8),
    ) {
        let mut project = committed_job(amount);
        for (index, (bill, statuses)) in bills.iter().enumerate() {
            project = add_matched_bill(&project, index, *bill);
            let bill_id = project.job().unwrap().bills[index].id;
            for status in statuses {
                project = BillService::set_bill_status(&project, bill_id, *status).unwrap();
            }
        }

        let job = project.job().unwrap();
        let live: Decimal = job
            .bills
            .iter()
            .filter(|b| b.status != BillStatus::Void)
            .map(|b| b.total())
            .sum();
        prop_assert_eq!(remaining(&project), amount - live);

        let paid_lines = job
            .bills
            .iter()
            .filter(|b| b.status == BillStatus::Paid)
            .map(|b| b.lines.len())
            .sum::<usize>();
        prop_assert_eq!(job.actuals.len(), paid_lines);
    }
}
