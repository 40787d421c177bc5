//! Calculation engine.
//!
//! `CalcEngine::calc` is the single source of every derived figure. Other components
//! call it (or its subtotal helpers) rather than summing collections themselves.

use rust_decimal::Decimal;
use siteledger_shared::types::{GST_RATE, percent_of, ratio_percent};

use super::types::{Aggregates, BudgetLineSummary, VarianceStatus};
use crate::project::{
    BillStatus, BudgetLine, Commitment, CommitmentStatus, InvoiceStatus, JobRecords, Project,
    ScopeItem, VariationStatus,
};

/// Stateless calculation engine.
pub struct CalcEngine;

impl CalcEngine {
    /// Computes every aggregate for a project.
    ///
    /// Order of computation:
    /// 1. subtotal over enabled scope items
    /// 2. margin and contingency on the subtotal
    /// 3. GST at the fixed rate on subtotal + margin + contingency
    /// 4. original contract value
    /// 5. approved variations total
    /// 6. current contract value
    /// 7. invoiced / paid / outstanding
    /// 8. budget, committed and actual totals
    /// 9. forecast margin, guarded against a zero contract value
    /// 10. supplier bill totals excluding void bills
    #[must_use]
    pub fn calc(project: &Project) -> Aggregates {
        let subtotal = Self::scope_subtotal(&project.scope);
        let margin_amount = percent_of(subtotal, project.margin_pct);
        let contingency_amount = percent_of(subtotal, project.contingency_pct);
        let pre_tax = subtotal + margin_amount + contingency_amount;
        let gst = pre_tax * GST_RATE;
        let original_contract_value = pre_tax + gst;

        let empty = JobRecords::default();
        let job = project.job.as_ref().unwrap_or(&empty);

        let approved_variations_total: Decimal = job
            .variations
            .iter()
            .filter(|v| v.status == VariationStatus::Approved)
            .map(|v| v.amount)
            .sum();
        let current_contract_value = original_contract_value + approved_variations_total;

        let invoice_sum = |pred: fn(InvoiceStatus) -> bool| -> Decimal {
            job.invoices
                .iter()
                .filter(|inv| pred(inv.status))
                .map(|inv| inv.amount)
                .sum()
        };
        let invoiced_total = invoice_sum(|s| s.counts_as_invoiced());
        let paid_total = invoice_sum(|s| s == InvoiceStatus::Paid);
        let outstanding = invoice_sum(|s| s == InvoiceStatus::Sent);

        let budget_total: Decimal = job.budget.iter().map(|line| line.budget_amount).sum();
        let committed_total = Self::committed_total(&job.commitments);
        let actuals_total: Decimal = job.actuals.iter().map(|a| a.amount).sum();

        let (forecast_margin, forecast_margin_pct) = if current_contract_value > Decimal::ZERO {
            let margin = current_contract_value - actuals_total;
            (margin, ratio_percent(margin, current_contract_value))
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let live_bills = job.bills.iter().filter(|b| b.status != BillStatus::Void);
        let bills_total: Decimal = live_bills.clone().map(|b| b.total()).sum();
        let bills_count = live_bills.count();
        let bills_paid_total: Decimal = job
            .bills
            .iter()
            .filter(|b| b.status == BillStatus::Paid)
            .map(|b| b.total())
            .sum();

        Aggregates {
            revision: project.revision,
            subtotal,
            margin_amount,
            contingency_amount,
            gst,
            original_contract_value,
            approved_variations_total,
            current_contract_value,
            invoiced_total,
            paid_total,
            outstanding,
            retention_held: percent_of(current_contract_value, project.retention_percent),
            budget_total,
            committed_total,
            actuals_total,
            forecast_margin,
            forecast_margin_pct,
            bills_total,
            bills_paid_total,
            bills_count,
            budget_breakdown: Self::budget_breakdown(job),
        }
    }

    /// Returns `Σ rate × qty` over enabled items.
    #[must_use]
    pub fn scope_subtotal(items: &[ScopeItem]) -> Decimal {
        items
            .iter()
            .filter(|item| item.enabled)
            .map(ScopeItem::line_total)
            .sum()
    }

    /// Returns the subtotal of enabled items per category, in first-seen order.
    ///
    /// Categories with no enabled items are omitted.
    #[must_use]
    pub fn category_subtotals(items: &[ScopeItem]) -> Vec<(String, Decimal)> {
        let mut subtotals: Vec<(String, Decimal)> = Vec::new();
        for item in items.iter().filter(|item| item.enabled) {
            match subtotals.iter().position(|(name, _)| *name == item.category) {
                Some(index) => subtotals[index].1 += item.line_total(),
                None => subtotals.push((item.category.clone(), item.line_total())),
            }
        }
        subtotals
    }

    /// Returns the sum of commitments in `Committed` status.
    #[must_use]
    pub fn committed_total(commitments: &[Commitment]) -> Decimal {
        commitments
            .iter()
            .filter(|c| c.status == CommitmentStatus::Committed)
            .map(|c| c.amount)
            .sum()
    }

    /// Compares budgeted against actual cost.
    ///
    /// Variance is `budgeted − actual`: positive (under budget) is favorable,
    /// negative (over budget) is unfavorable.
    #[must_use]
    pub fn calculate_variance(budgeted: Decimal, actual: Decimal) -> (Decimal, VarianceStatus) {
        let variance = budgeted - actual;
        let status = match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => VarianceStatus::Favorable,
            std::cmp::Ordering::Less => VarianceStatus::Unfavorable,
            std::cmp::Ordering::Equal => VarianceStatus::OnBudget,
        };
        (variance, status)
    }

    fn budget_breakdown(job: &JobRecords) -> Vec<BudgetLineSummary> {
        job.budget
            .iter()
            .map(|line: &BudgetLine| {
                let committed: Decimal = job
                    .commitments
                    .iter()
                    .filter(|c| {
                        c.status == CommitmentStatus::Committed
                            && c.budget_line_id == Some(line.id)
                    })
                    .map(|c| c.amount)
                    .sum();
                let actual: Decimal = job
                    .actuals
                    .iter()
                    .filter(|a| a.budget_line_id == Some(line.id))
                    .map(|a| a.amount)
                    .sum();
                let (variance, status) = Self::calculate_variance(line.budget_amount, actual);

                BudgetLineSummary {
                    budget_line_id: line.id,
                    label: line.label.clone(),
                    budgeted: line.budget_amount,
                    committed,
                    actual,
                    variance,
                    utilization_percent: ratio_percent(actual, line.budget_amount),
                    status,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewScopeItem;
    use crate::project::ProjectService;
    use rust_decimal_macros::dec;
    use siteledger_shared::ProjectDefaults;

    fn project_with_subtotal(subtotal: Decimal) -> Project {
        let project = Project::new("Scenario", &ProjectDefaults::default());
        ProjectService::add_scope_item(
            &project,
            NewScopeItem {
                category: "Build".to_string(),
                description: "Lump sum".to_string(),
                unit: "item".to_string(),
                rate: subtotal,
                qty: dec!(1),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_contract_value_build_up() {
        let project = project_with_subtotal(dec!(100000));
        let totals = CalcEngine::calc(&project);

        assert_eq!(totals.subtotal, dec!(100000));
        assert_eq!(totals.margin_amount, dec!(18000));
        assert_eq!(totals.contingency_amount, dec!(5000));
        assert_eq!(totals.gst, dec!(12300));
        assert_eq!(totals.original_contract_value, dec!(135300));
        assert_eq!(totals.current_contract_value, dec!(135300));
        assert_eq!(totals.revision, project.revision);
    }

    #[test]
    fn test_disabled_items_excluded() {
        let mut project = project_with_subtotal(dec!(1000));
        project.scope.push(ScopeItem {
            enabled: false,
            ..project.scope[0].clone()
        });

        assert_eq!(CalcEngine::scope_subtotal(&project.scope), dec!(1000));
    }

    #[test]
    fn test_empty_project_guards_forecast() {
        let project = Project::new("Empty", &ProjectDefaults::default());
        let totals = CalcEngine::calc(&project);

        assert_eq!(totals.current_contract_value, Decimal::ZERO);
        assert_eq!(totals.forecast_margin, Decimal::ZERO);
        assert_eq!(totals.forecast_margin_pct, Decimal::ZERO);
        assert!(totals.budget_breakdown.is_empty());
    }

    #[test]
    fn test_category_subtotals_keep_first_seen_order() {
        let mut project = project_with_subtotal(dec!(10));
        let template = project.scope[0].clone();
        project.scope.push(ScopeItem {
            category: "Electrical".to_string(),
            rate: dec!(5),
            ..template.clone()
        });
        project.scope.push(ScopeItem {
            rate: dec!(7),
            ..template.clone()
        });
        project.scope.push(ScopeItem {
            category: "Painting".to_string(),
            enabled: false,
            ..template
        });

        let subtotals = CalcEngine::category_subtotals(&project.scope);
        assert_eq!(
            subtotals,
            vec![
                ("Build".to_string(), dec!(17)),
                ("Electrical".to_string(), dec!(5)),
            ]
        );
    }

    #[test]
    fn test_variance_classification() {
        assert_eq!(
            CalcEngine::calculate_variance(dec!(1000), dec!(800)),
            (dec!(200), VarianceStatus::Favorable)
        );
        assert_eq!(
            CalcEngine::calculate_variance(dec!(1000), dec!(1200)),
            (dec!(-200), VarianceStatus::Unfavorable)
        );
        assert_eq!(
            CalcEngine::calculate_variance(dec!(1000), dec!(1000)),
            (dec!(0), VarianceStatus::OnBudget)
        );
    }

    #[test]
    fn test_retention_is_informational() {
        let mut project = project_with_subtotal(dec!(100000));
        project.retention_percent = dec!(5);
        let totals = CalcEngine::calc(&project);

        assert_eq!(totals.retention_held, dec!(6765));
        assert_eq!(totals.invoiced_total, Decimal::ZERO);
    }
}
