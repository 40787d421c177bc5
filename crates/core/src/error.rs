//! Engine error types.
//!
//! Every rejected write returns one of these with the input snapshot left untouched.
//! Illegal status transitions are not errors; they come back as unchanged snapshots.

use rust_decimal::Decimal;
use siteledger_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::advisory::Advisory;

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    // ========== Validation Errors ==========
    /// A required field is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Adding the claim stage would push the schedule above 100%.
    #[error("Claim percentages would total {}% (existing {existing}% + requested {requested}%)", .existing + .requested)]
    PercentSumExceeded {
        /// Sum of percent-based stages already on the schedule.
        existing: Decimal,
        /// Percent of the stage being added.
        requested: Decimal,
    },

    /// Referenced entity does not exist on the project.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The missing ID.
        id: Uuid,
    },

    /// The project has not been converted to a job yet.
    #[error("Project is still a quote; convert it to a job first")]
    JobNotStarted,

    // ========== Advisory Errors ==========
    /// The write raised advisory warnings that the caller has not confirmed.
    #[error("{} advisory warning(s) require confirmation", .0.len())]
    ConfirmationRequired(Vec<Advisory>),

    /// The guard policy turned an advisory into a hard cap.
    #[error("Hard cap exceeded: {0}")]
    HardCapExceeded(Advisory),

    // ========== Deletion Errors ==========
    /// The entity is tied to paid, approved or terminal state.
    #[error("Cannot delete {entity}: {reason}")]
    DeletionRefused {
        /// Entity kind.
        entity: &'static str,
        /// Why deletion is refused.
        reason: &'static str,
    },
}

impl EngineError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the error code for callers that render messages.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PercentSumExceeded { .. } => "PERCENT_SUM_EXCEEDED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::JobNotStarted => "JOB_NOT_STARTED",
            Self::ConfirmationRequired(_) => "CONFIRMATION_REQUIRED",
            Self::HardCapExceeded(_) => "HARD_CAP_EXCEEDED",
            Self::DeletionRefused { .. } => "DELETION_REFUSED",
        }
    }

    /// Returns the advisories a caller may confirm past, if any.
    #[must_use]
    pub fn advisories(&self) -> &[Advisory] {
        match self {
            Self::ConfirmationRequired(advisories) => advisories,
            _ => &[],
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => Self::NotFound(err.to_string()),
            EngineError::Validation(_) | EngineError::PercentSumExceeded { .. } => {
                Self::Validation(err.to_string())
            }
            EngineError::ConfirmationRequired(_) => Self::Conflict(err.to_string()),
            EngineError::JobNotStarted
            | EngineError::HardCapExceeded(_)
            | EngineError::DeletionRefused { .. } => Self::BusinessRule(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use siteledger_shared::types::InvoiceId;

    #[test]
    fn test_percent_sum_message() {
        let err = EngineError::PercentSumExceeded {
            existing: dec!(95),
            requested: dec!(10),
        };
        assert_eq!(err.error_code(), "PERCENT_SUM_EXCEEDED");
        assert!(err.to_string().contains("105%"));
    }

    #[test]
    fn test_not_found_shorthand() {
        let id = InvoiceId::new();
        let err = EngineError::not_found("Invoice", id);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), format!("Invoice not found: {id}"));
    }

    #[test]
    fn test_confirmation_required_exposes_advisories() {
        let advisory = Advisory::OverInvoice {
            contract_value: dec!(100),
            invoiced_total: dec!(90),
            proposed: dec!(20),
        };
        let err = EngineError::ConfirmationRequired(vec![advisory.clone()]);
        assert_eq!(err.advisories(), &[advisory]);
        assert_eq!(err.to_string(), "1 advisory warning(s) require confirmation");
        assert!(EngineError::JobNotStarted.advisories().is_empty());
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = EngineError::Validation("name is required".into()).into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = EngineError::ConfirmationRequired(vec![]).into();
        assert_eq!(app.error_code(), "CONFLICT");

        let app: AppError = EngineError::DeletionRefused {
            entity: "Invoice",
            reason: "only draft invoices can be deleted",
        }
        .into();
        assert_eq!(app.error_code(), "BUSINESS_RULE_VIOLATION");
    }
}
