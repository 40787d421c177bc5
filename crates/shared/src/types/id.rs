//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BillId` where a `CommitmentId` is expected,
//! which matters here because several collections link to each other by ID.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(ProjectId, "Unique identifier for a project.");
typed_id!(ScopeItemId, "Unique identifier for a priced scope item.");
typed_id!(BudgetLineId, "Unique identifier for a budget line.");
typed_id!(CommitmentId, "Unique identifier for a commitment (purchase order).");
typed_id!(BillId, "Unique identifier for a supplier bill.");
typed_id!(BillLineId, "Unique identifier for a line on a supplier bill.");
typed_id!(ActualId, "Unique identifier for a realized cost entry.");
typed_id!(VariationId, "Unique identifier for a contract variation.");
typed_id!(InvoiceId, "Unique identifier for a client invoice.");
typed_id!(ClaimStageId, "Unique identifier for a payment schedule stage.");
typed_id!(
    VariationLedgerEntryId,
    "Unique identifier for a variation ledger audit entry."
);
typed_id!(ClientId, "Unique identifier for a client in the client directory.");
typed_id!(TradeId, "Unique identifier for a trade in the trade directory.");
typed_id!(DiaryEntryId, "Unique identifier for a site diary entry.");
typed_id!(DefectId, "Unique identifier for a defect register entry.");
