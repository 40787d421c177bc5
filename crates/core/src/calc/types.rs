//! Calculation result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::types::BudgetLineId;

/// Variance status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Actual cost is under budget.
    Favorable,
    /// Actual cost is over budget.
    Unfavorable,
    /// Actual cost equals budget.
    OnBudget,
}

/// Budget vs committed vs actual for one budget line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLineSummary {
    /// Budget line ID.
    pub budget_line_id: BudgetLineId,
    /// Budget line label.
    pub label: String,
    /// Budgeted amount.
    pub budgeted: Decimal,
    /// Committed spend drawing on this line.
    pub committed: Decimal,
    /// Realized cost landing on this line.
    pub actual: Decimal,
    /// `budgeted − actual`.
    pub variance: Decimal,
    /// `actual / budgeted × 100`, 2 dp, zero when nothing is budgeted.
    pub utilization_percent: Decimal,
    /// Variance status.
    pub status: VarianceStatus,
}

/// Every derived financial figure for a project.
///
/// Produced by `CalcEngine::calc` in a fixed order; see that function for the formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    /// Revision of the project these figures were computed from.
    pub revision: u64,
    /// `Σ rate × qty` over enabled scope items.
    pub subtotal: Decimal,
    /// Margin on the subtotal.
    pub margin_amount: Decimal,
    /// Contingency on the subtotal.
    pub contingency_amount: Decimal,
    /// GST on subtotal, margin and contingency.
    pub gst: Decimal,
    /// Contract value as quoted.
    pub original_contract_value: Decimal,
    /// Sum of approved variation amounts.
    pub approved_variations_total: Decimal,
    /// Original contract value plus approved variations.
    pub current_contract_value: Decimal,
    /// Sum of sent and paid invoices.
    pub invoiced_total: Decimal,
    /// Sum of paid invoices.
    pub paid_total: Decimal,
    /// Sum of sent invoices.
    pub outstanding: Decimal,
    /// Informational retention on the current contract value.
    pub retention_held: Decimal,
    /// Sum of budget lines.
    pub budget_total: Decimal,
    /// Sum of committed commitments.
    pub committed_total: Decimal,
    /// Sum of realized costs.
    pub actuals_total: Decimal,
    /// Current contract value less actuals, zero with no contract value.
    pub forecast_margin: Decimal,
    /// Forecast margin as a percentage of the current contract value, 2 dp.
    pub forecast_margin_pct: Decimal,
    /// Sum of non-void supplier bills.
    pub bills_total: Decimal,
    /// Sum of paid supplier bills.
    pub bills_paid_total: Decimal,
    /// Number of non-void supplier bills.
    pub bills_count: usize,
    /// Per-line budget breakdown.
    pub budget_breakdown: Vec<BudgetLineSummary>,
}
