//! The project aggregate root.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::ProjectDefaults;
use siteledger_shared::types::{ClientId, Currency, ProjectId};
use uuid::Uuid;

use super::entities::{
    Actual, BudgetLine, ClaimStage, Commitment, Defect, DiaryEntry, Invoice, ScopeItem,
    SupplierBill, Variation, VariationLedgerEntry,
};
use crate::error::EngineError;
use crate::lifecycle::Stage;

/// Maximum number of activity entries kept on a project.
pub const ACTIVITY_LOG_LIMIT: usize = 30;

/// A timestamped note of something that happened to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// When it happened.
    pub at: DateTime<Utc>,
    /// What happened.
    pub message: String,
}

/// One section of the quote as it stood at conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSection {
    /// Scope category.
    pub section_name: String,
    /// Enabled items in the section.
    pub items: Vec<ScopeItem>,
    /// Section subtotal (`Σ rate × qty`).
    pub total: Decimal,
}

/// Collections that only exist once the project is a job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecords {
    /// When the project was converted to a job.
    pub converted_at: Option<DateTime<Utc>>,
    /// Quote sections captured at conversion. Never mutated afterwards.
    pub quote_snapshot: Vec<QuoteSection>,
    /// When quote scope was imported into the budget, if it was.
    pub budget_imported_at: Option<DateTime<Utc>>,
    /// Budget lines.
    pub budget: Vec<BudgetLine>,
    /// Commitments.
    pub commitments: Vec<Commitment>,
    /// Supplier bills.
    #[serde(alias = "supplier_bills")]
    pub bills: Vec<SupplierBill>,
    /// Realized costs.
    pub actuals: Vec<Actual>,
    /// Variations.
    pub variations: Vec<Variation>,
    /// Variation approval audit trail.
    pub variation_ledger: Vec<VariationLedgerEntry>,
    /// Client invoices.
    pub invoices: Vec<Invoice>,
    /// Site diary.
    pub diary: Vec<DiaryEntry>,
    /// Defect register.
    pub defects: Vec<Defect>,
}

/// A construction project: the aggregate every engine operation reads and returns.
///
/// Writes never mutate a project in place. Each operation clones the snapshot, applies
/// all of its sub-mutations to the clone and bumps `revision` before returning it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Client in the client directory, if linked.
    #[serde(default)]
    pub client_id: Option<ClientId>,
    /// Currency for documents.
    #[serde(default)]
    pub currency: Currency,
    /// Lifecycle stage.
    #[serde(default, alias = "status")]
    pub stage: Stage,
    /// Margin percentage.
    #[serde(alias = "marginPct", alias = "margin")]
    pub margin_pct: Decimal,
    /// Contingency percentage.
    #[serde(alias = "contingencyPct", alias = "contingency")]
    pub contingency_pct: Decimal,
    /// Days until an invoice falls due.
    #[serde(default)]
    pub payment_terms_days: u32,
    /// Retention percentage. Informational only.
    #[serde(default)]
    pub retention_percent: Decimal,
    /// Priced scope.
    #[serde(default)]
    pub scope: Vec<ScopeItem>,
    /// Payment schedule.
    #[serde(default, alias = "claims")]
    pub payment_schedule: Vec<ClaimStage>,
    /// Job-only collections; `None` while quoting.
    #[serde(default)]
    pub job: Option<JobRecords>,
    /// Activity log, newest first.
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
    /// Bumped on every successful write.
    #[serde(default)]
    pub revision: u64,
    /// Fresh on every successful write, so sibling snapshots written from the same
    /// parent never share a cache key even though they share a revision.
    #[serde(default)]
    pub write_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a quote-stage project with the configured default terms.
    #[must_use]
    pub fn new(name: impl Into<String>, defaults: &ProjectDefaults) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            client_id: None,
            currency: Currency::default(),
            stage: Stage::Lead,
            margin_pct: defaults.margin_pct,
            contingency_pct: defaults.contingency_pct,
            payment_terms_days: defaults.payment_terms_days,
            retention_percent: defaults.retention_percent,
            scope: Vec::new(),
            payment_schedule: Vec::new(),
            job: None,
            activity: Vec::new(),
            revision: 0,
            write_id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Tidies a snapshot read from storage.
    ///
    /// Job-stage projects always get job records, and the activity log is trimmed
    /// to its limit. Status aliases are already folded by deserialization.
    #[must_use]
    pub fn normalise(mut self) -> Self {
        if self.stage.is_job() && self.job.is_none() {
            self.job = Some(JobRecords::default());
        }
        self.activity.truncate(ACTIVITY_LOG_LIMIT);
        self
    }

    /// Returns true once the project has job records.
    #[must_use]
    pub fn is_job(&self) -> bool {
        self.job.is_some()
    }

    /// Returns the job records.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` while the project is still a quote.
    pub fn job(&self) -> Result<&JobRecords, EngineError> {
        self.job.as_ref().ok_or(EngineError::JobNotStarted)
    }

    /// Returns the job records mutably.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` while the project is still a quote.
    pub fn job_mut(&mut self) -> Result<&mut JobRecords, EngineError> {
        self.job.as_mut().ok_or(EngineError::JobNotStarted)
    }

    /// Prepends an activity entry, dropping the oldest beyond the limit.
    pub fn record_activity(&mut self, message: impl Into<String>) {
        self.activity.insert(
            0,
            ActivityEntry {
                at: Utc::now(),
                message: message.into(),
            },
        );
        self.activity.truncate(ACTIVITY_LOG_LIMIT);
    }

    /// Marks the snapshot as a new revision.
    pub(crate) fn touch(&mut self) {
        self.revision += 1;
        self.write_id = Uuid::now_v7();
        self.updated_at = Utc::now();
    }
}
