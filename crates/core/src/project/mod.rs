//! The project aggregate, its entities and status vocabularies.

pub mod entities;
pub mod service;
pub mod status;
pub mod types;

pub use entities::{
    Actual, ActualSource, BillLine, BudgetLine, ClaimBasis, ClaimStage, Commitment, Defect,
    DiaryEntry, Invoice, ScopeItem, SupplierBill, Variation, VariationLedgerEntry,
};
pub use service::{NewScopeItem, ProjectService};
pub use status::{
    BillStatus, BudgetSource, ClaimStatus, ClaimTrigger, CommitmentStatus, InvoiceStatus,
    VariationStatus,
};
pub use types::{ACTIVITY_LOG_LIMIT, ActivityEntry, JobRecords, Project, QuoteSection};
