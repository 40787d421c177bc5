//! Project stages and the modules each stage exposes.
//!
//! Stages are strictly linear:
//! Lead → Quoted → Approved → Active → Invoiced → Complete.
//! Lead and Quoted are quote stages; Approved onwards are job stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Stage {
    /// Enquiry received, scope being gathered.
    #[default]
    Lead,
    /// Quote issued to the client.
    Quoted,
    /// Quote accepted; the project is now a job.
    Approved,
    /// Work under way on site.
    Active,
    /// Final invoicing in progress.
    Invoiced,
    /// Job closed out.
    Complete,
}

impl Stage {
    /// Every stage in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Lead,
        Self::Quoted,
        Self::Approved,
        Self::Active,
        Self::Invoiced,
        Self::Complete,
    ];

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Quoted => "quoted",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Invoiced => "invoiced",
            Self::Complete => "complete",
        }
    }

    /// Maps a raw stage label, including legacy aliases, to a stage.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace, dashes and
    /// underscores. Unrecognized labels fall back to `Lead`.
    #[must_use]
    pub fn normalise(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "quoted" | "quote" | "quoting" | "estimate" | "estimating" | "proposal" => {
                Self::Quoted
            }
            "approved" | "accepted" | "won" | "signed" => Self::Approved,
            "active" | "inprogress" | "underway" | "onsite" | "job" | "started" => Self::Active,
            "invoiced" | "invoicing" | "billing" | "finalinvoice" => Self::Invoiced,
            "complete" | "completed" | "closed" | "done" | "finished" => Self::Complete,
            _ => Self::Lead,
        }
    }

    /// Returns the single legal successor, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Lead => Some(Self::Quoted),
            Self::Quoted => Some(Self::Approved),
            Self::Approved => Some(Self::Active),
            Self::Active => Some(Self::Invoiced),
            Self::Invoiced => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Returns true if `to` is the single legal successor of this stage.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Returns true for Approved and every later stage.
    #[must_use]
    pub fn is_job(&self) -> bool {
        *self >= Self::Approved
    }

    /// Returns true for Lead and Quoted.
    #[must_use]
    pub fn is_quote(&self) -> bool {
        !self.is_job()
    }

    /// Returns the modules the host should expose for this stage.
    #[must_use]
    pub fn allowed_modules(&self) -> &'static [Module] {
        if self.is_job() {
            JOB_MODULES
        } else {
            QUOTE_MODULES
        }
    }
}

impl From<String> for Stage {
    fn from(raw: String) -> Self {
        Self::normalise(&raw)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A navigable area of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Project summary.
    Overview,
    /// Priced scope items.
    Scope,
    /// Quote document.
    Quote,
    /// Payment schedule (claim stages).
    PaymentSchedule,
    /// Attached documents.
    Documents,
    /// Contract variations.
    Variations,
    /// Budget lines.
    Budget,
    /// Commitments and supplier bills.
    Costs,
    /// Client invoices.
    Invoices,
    /// Site diary.
    Diary,
    /// Defect register.
    Defects,
    /// Financial reports.
    Reports,
}

/// Modules visible while quoting.
pub const QUOTE_MODULES: &[Module] = &[
    Module::Overview,
    Module::Scope,
    Module::Quote,
    Module::PaymentSchedule,
    Module::Documents,
];

/// Modules visible once the project is a job.
pub const JOB_MODULES: &[Module] = &[
    Module::Overview,
    Module::Scope,
    Module::Quote,
    Module::PaymentSchedule,
    Module::Documents,
    Module::Variations,
    Module::Budget,
    Module::Costs,
    Module::Invoices,
    Module::Diary,
    Module::Defects,
    Module::Reports,
];

/// Returns the fixed module whitelist for a stage.
#[must_use]
pub fn allowed_modules(stage: Stage) -> &'static [Module] {
    stage.allowed_modules()
}
