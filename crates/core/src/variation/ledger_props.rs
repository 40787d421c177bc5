//! Property-based tests for the variation ledger.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::calc::CalcEngine;
use crate::project::{Project, VariationStatus};
use crate::test_support::job;
use crate::variation::ledger::{NewVariation, VariationLedger};

#[derive(Debug, Clone)]
enum Op {
    Create(i64),
    Send(usize),
    Approve(usize),
    Reject(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-50_000i64..50_000).prop_map(Op::Create),
        any::<usize>().prop_map(Op::Send),
        any::<usize>().prop_map(Op::Approve),
        any::<usize>().prop_map(Op::Reject),
    ]
}

fn apply(project: &Project, op: &Op) -> Project {
    let variations = &project.job().unwrap().variations;
    let pick = |i: usize| variations.get(i % variations.len().max(1)).map(|v| v.id);

    let result = match *op {
        Op::Create(cents) => VariationLedger::add_variation(
            project,
            NewVariation {
                title: "Variation".to_string(),
                description: String::new(),
                amount: Decimal::new(cents, 2),
            },
        ),
        Op::Send(i) => match pick(i) {
            Some(id) => VariationLedger::send_variation(project, id),
            None => Ok(project.clone()),
        },
        Op::Approve(i) => match pick(i) {
            Some(id) => VariationLedger::approve_variation(project, id),
            None => Ok(project.clone()),
        },
        Op::Reject(i) => match pick(i) {
            Some(id) => VariationLedger::reject_variation(project, id),
            None => Ok(project.clone()),
        },
    };
    result.unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The contract value always equals the original plus approved variations.
    #[test]
    fn prop_contract_value_tracks_approvals(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut project = job();
        for op in &ops {
            project = apply(&project, op);

            let totals = CalcEngine::calc(&project);
            let approved: Decimal = project
                .job()
                .unwrap()
                .variations
                .iter()
                .filter(|v| v.status == VariationStatus::Approved)
                .map(|v| v.amount)
                .sum();
            prop_assert_eq!(
                totals.current_contract_value,
                totals.original_contract_value + approved
            );
        }
    }

    /// Every approved variation has exactly one budget line and one ledger entry.
    #[test]
    fn prop_one_budget_line_per_approval(
        ops in prop::collection::vec(arb_op(), 0..30),
        repeats in 1usize..4,
    ) {
        let mut project = job();
        for op in &ops {
            for _ in 0..repeats {
                project = apply(&project, op);
            }
        }

        let records = project.job().unwrap();
        for variation in &records.variations {
            let lines = records
                .budget
                .iter()
                .filter(|l| l.linked_variation_id == Some(variation.id))
                .count();
            let entries = records
                .variation_ledger
                .iter()
                .filter(|e| e.variation_id == variation.id)
                .count();
            let expected = usize::from(variation.status == VariationStatus::Approved);
            prop_assert_eq!(lines, expected);
            prop_assert_eq!(entries, expected);
        }
    }
}
