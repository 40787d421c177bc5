//! One tagged enum per status dimension.
//!
//! Legacy labels are folded into the canonical variants by each `parse`, which serde
//! also uses, so aliases never reach business logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `Display` and `TryFrom<String>` in terms of `as_str` and `parse`.
macro_rules! impl_status_text {
    ($name:ident, $label:literal) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(&raw).ok_or_else(|| format!("Unknown {} status: {raw}", $label))
            }
        }
    };
}

fn fold(raw: &str) -> String {
    raw.trim().replace([' ', '-'], "_").to_lowercase()
}

/// Where a budget line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum BudgetSource {
    /// Imported from the quote scope at conversion.
    QuoteImport,
    /// Generated by an approved variation.
    Variation,
    /// Entered by hand.
    Manual,
}

impl BudgetSource {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuoteImport => "quote_import",
            Self::Variation => "variation",
            Self::Manual => "manual",
        }
    }

    /// Parses a source label, accepting legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "quote_import" | "quote" | "import" | "quoteimport" => Some(Self::QuoteImport),
            "variation" | "vo" => Some(Self::Variation),
            "manual" | "" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl_status_text!(BudgetSource, "budget source");

/// Commitment (purchase order) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CommitmentStatus {
    /// Being prepared; not counted.
    Draft,
    /// Issued to the vendor; counts toward the committed total.
    Committed,
    /// Withdrawn. Terminal.
    Cancelled,
}

impl CommitmentStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status label. `approved` is a historical alias of `committed`.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "draft" => Some(Self::Draft),
            "committed" | "approved" | "issued" => Some(Self::Committed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Draft and Committed move freely between each other; Cancelled is terminal.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        *self != to && *self != Self::Cancelled
    }
}

impl_status_text!(CommitmentStatus, "commitment");

/// Supplier bill status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BillStatus {
    /// Entered, not yet approved for payment.
    Draft,
    /// Approved for payment.
    Approved,
    /// Paid; each line has a realized cost.
    Paid,
    /// Voided. Terminal.
    Void,
}

impl BillStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }

    /// Parses a status label, accepting legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "draft" | "entered" => Some(Self::Draft),
            "approved" | "awaiting_payment" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            "void" | "voided" => Some(Self::Void),
            _ => None,
        }
    }

    /// Forward moves toward Paid, Void from any unpaid state, and reversals out of Paid.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        match (self, to) {
            (Self::Void, _) => false,
            (Self::Paid, to) => to != Self::Paid,
            (Self::Draft, to) => to != Self::Draft,
            (Self::Approved, to) => matches!(to, Self::Paid | Self::Void),
        }
    }
}

impl_status_text!(BillStatus, "bill");

/// Contract variation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum VariationStatus {
    /// Being drafted.
    Draft,
    /// Sent to the client for sign-off.
    Sent,
    /// Approved. Terminal; counts toward the contract value.
    Approved,
    /// Rejected. Terminal.
    Rejected,
}

impl VariationStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status label, accepting legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "draft" => Some(Self::Draft),
            "sent" | "pending" | "submitted" => Some(Self::Sent),
            "approved" | "accepted" | "signed" => Some(Self::Approved),
            "rejected" | "declined" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once approved or rejected.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl_status_text!(VariationStatus, "variation");

/// Client invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InvoiceStatus {
    /// Being prepared; not counted as invoiced.
    Draft,
    /// Issued to the client and outstanding.
    Sent,
    /// Paid by the client.
    Paid,
    /// Voided. Terminal.
    Void,
}

impl InvoiceStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }

    /// Parses a status label. `pending` and `issued` are aliases of `sent`.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "draft" => Some(Self::Draft),
            "sent" | "pending" | "issued" | "overdue" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "void" | "voided" | "cancelled" => Some(Self::Void),
            _ => None,
        }
    }

    /// Returns true if the invoice counts toward the invoiced total.
    #[must_use]
    pub fn counts_as_invoiced(&self) -> bool {
        matches!(self, Self::Sent | Self::Paid)
    }

    /// Forward moves toward Paid, Void from Draft or Sent, and reversals out of Paid.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        match (self, to) {
            (Self::Void, _) => false,
            (Self::Paid, to) => to != Self::Paid,
            (Self::Draft, to) => to != Self::Draft,
            (Self::Sent, to) => matches!(to, Self::Paid | Self::Void),
        }
    }
}

impl_status_text!(InvoiceStatus, "invoice");

/// Payment schedule stage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ClaimStatus {
    /// Not yet invoiced.
    Planned,
    /// A draft or sent invoice covers this stage.
    Invoiced,
    /// The covering invoice has been paid.
    Paid,
}

impl ClaimStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
        }
    }

    /// Parses a status label, accepting legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match fold(s).as_str() {
            "planned" | "pending" | "scheduled" => Some(Self::Planned),
            "invoiced" | "claimed" => Some(Self::Invoiced),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl_status_text!(ClaimStatus, "claim");

/// What makes a claim stage due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimTrigger {
    /// Due on signing the contract (e.g. a deposit).
    #[default]
    Contract,
    /// Due when a construction milestone is reached.
    Milestone,
}
