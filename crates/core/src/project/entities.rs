//! Entities owned by a project.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::types::{
    ActualId, BillId, BillLineId, BudgetLineId, ClaimStageId, CommitmentId, DefectId,
    DiaryEntryId, InvoiceId, ScopeItemId, TradeId, VariationId, VariationLedgerEntryId,
};

use super::status::{
    BillStatus, BudgetSource, ClaimStatus, ClaimTrigger, CommitmentStatus, InvoiceStatus,
    VariationStatus,
};

fn enabled_by_default() -> bool {
    true
}

/// A priced line of quote scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    /// Scope item ID.
    pub id: ScopeItemId,
    /// Section the item is grouped under (e.g. "Demolition").
    #[serde(alias = "section")]
    pub category: String,
    /// Item description.
    pub description: String,
    /// Unit of measure (e.g. "m2", "ea").
    #[serde(default)]
    pub unit: String,
    /// Rate per unit.
    pub rate: Decimal,
    /// Quantity.
    #[serde(alias = "quantity")]
    pub qty: Decimal,
    /// Only enabled items contribute to the subtotal.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Cost recorded against the item after the fact, if any.
    #[serde(default)]
    pub actual_cost: Option<Decimal>,
}

impl ScopeItem {
    /// Returns `rate × qty`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.rate * self.qty
    }
}

/// A line of the job budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Budget line ID.
    pub id: BudgetLineId,
    /// Display label.
    pub label: String,
    /// Scope category the line was imported from, if any.
    #[serde(default)]
    pub category: Option<String>,
    /// Budgeted amount.
    #[serde(alias = "amount")]
    pub budget_amount: Decimal,
    /// Where the line came from.
    pub source: BudgetSource,
    /// The variation this line was generated for. At most one line per variation.
    #[serde(default)]
    pub linked_variation_id: Option<VariationId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reserved spend against a vendor, independent of billing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    /// Commitment ID.
    pub id: CommitmentId,
    /// Vendor display name.
    pub vendor: String,
    /// Vendor in the trade directory, if linked.
    #[serde(default)]
    pub trade_id: Option<TradeId>,
    /// What was ordered.
    #[serde(default)]
    pub description: String,
    /// Committed amount.
    pub amount: Decimal,
    /// Commitment status.
    pub status: CommitmentStatus,
    /// Budget line this commitment draws on, if any.
    #[serde(default)]
    pub budget_line_id: Option<BudgetLineId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A line on a supplier bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillLine {
    /// Bill line ID.
    pub id: BillLineId,
    /// Line description.
    #[serde(default)]
    pub description: String,
    /// Line amount.
    pub amount: Decimal,
    /// Commitment this line is matched against, if any.
    #[serde(default)]
    pub commitment_id: Option<CommitmentId>,
    /// Budget line the cost lands on, if any.
    #[serde(default)]
    pub budget_line_id: Option<BudgetLineId>,
}

/// An accounts-payable document from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierBill {
    /// Bill ID.
    pub id: BillId,
    /// Vendor display name.
    pub vendor: String,
    /// Vendor in the trade directory, if linked.
    #[serde(default)]
    pub trade_id: Option<TradeId>,
    /// Supplier's bill number.
    #[serde(default)]
    pub bill_number: String,
    /// Date printed on the bill.
    pub bill_date: NaiveDate,
    /// Bill status.
    pub status: BillStatus,
    /// Bill lines.
    pub lines: Vec<BillLine>,
    /// When the bill was marked paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl SupplierBill {
    /// Returns the sum of all line amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Returns the sum of line amounts matched to a commitment.
    #[must_use]
    pub fn matched_to(&self, commitment_id: CommitmentId) -> Decimal {
        self.lines
            .iter()
            .filter(|line| line.commitment_id == Some(commitment_id))
            .map(|line| line.amount)
            .sum()
    }
}

/// Where a realized cost came from.
///
/// The bill and invoice variants double as idempotency keys: at most one actual may
/// carry a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActualSource {
    /// Entered by hand.
    Manual,
    /// Generated by a paid supplier bill line.
    Bill {
        /// The paid bill.
        bill_id: BillId,
        /// The bill line this actual realizes.
        line_id: BillLineId,
    },
    /// Generated by a paid client invoice.
    Invoice {
        /// The paid invoice.
        invoice_id: InvoiceId,
    },
}

/// A realized cost entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actual {
    /// Actual ID.
    pub id: ActualId,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Realized amount.
    pub amount: Decimal,
    /// Source and back-reference.
    pub source: ActualSource,
    /// Budget line the cost lands on, if any.
    #[serde(default)]
    pub budget_line_id: Option<BudgetLineId>,
    /// When the cost was realized.
    pub recorded_at: DateTime<Utc>,
}

/// A change to contract price or scope after the original quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// Variation ID.
    pub id: VariationId,
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Signed price change.
    pub amount: Decimal,
    /// Variation status.
    pub status: VariationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the variation was sent for sign-off.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    /// When the variation was approved.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// When the variation was rejected.
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Audit record linking an approved variation to its generated budget line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationLedgerEntry {
    /// Ledger entry ID.
    pub id: VariationLedgerEntryId,
    /// The approved variation.
    pub variation_id: VariationId,
    /// Amount at approval.
    pub amount: Decimal,
    /// The generated budget line.
    pub budget_line_id: BudgetLineId,
    /// Approval timestamp.
    pub approved_at: DateTime<Utc>,
}

/// A client invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Sequential invoice number (e.g. "INV-0003").
    pub number: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Invoice amount.
    pub amount: Decimal,
    /// Invoice status.
    pub status: InvoiceStatus,
    /// Payment schedule stage this invoice claims, if any.
    #[serde(default)]
    pub claim_stage_id: Option<ClaimStageId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the invoice was sent.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    /// Payment due date, set when sent.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// When the invoice was paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// How a claim stage is priced. Exactly one of percent or fixed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimBasis {
    /// Percentage of the current contract value.
    Percent(Decimal),
    /// Fixed amount.
    Amount(Decimal),
}

/// A planned payment milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimStage {
    /// Claim stage ID.
    pub id: ClaimStageId,
    /// Stage name (e.g. "Deposit").
    pub name: String,
    /// Percent or fixed amount.
    pub basis: ClaimBasis,
    /// What makes the stage due.
    #[serde(default)]
    pub due_on: ClaimTrigger,
    /// Claim status.
    pub status: ClaimStatus,
    /// Invoice raised for this stage, if any.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
}

impl ClaimStage {
    /// Returns the percent if this stage is percent-based.
    #[must_use]
    pub fn percent(&self) -> Option<Decimal> {
        match self.basis {
            ClaimBasis::Percent(percent) => Some(percent),
            ClaimBasis::Amount(_) => None,
        }
    }
}

/// A site diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Diary entry ID.
    pub id: DiaryEntryId,
    /// Day the entry covers.
    pub date: NaiveDate,
    /// Free-text note.
    pub note: String,
}

/// A defect register entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// Defect ID.
    pub id: DefectId,
    /// What is wrong.
    pub description: String,
    /// Whether the defect has been rectified.
    #[serde(default)]
    pub resolved: bool,
}
