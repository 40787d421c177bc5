//! Advisory warnings and caller confirmation.
//!
//! Over-invoicing, over-matching a commitment and possible duplicate bills are
//! warnings, not errors. Each write that can raise them has a pure pre-check; the
//! write itself only proceeds once the caller passes `Confirmation::Confirmed`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::GuardPolicy;
use siteledger_shared::types::{BillId, CommitmentId};
use tracing::warn;

use crate::error::EngineError;

/// Why a bill looks like a duplicate of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    /// Same vendor and the same bill number.
    VendorAndNumber,
    /// Same bill total on the same date.
    TotalAndDate,
}

/// A non-blocking warning raised before a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The write would push the invoiced total above the current contract value.
    OverInvoice {
        /// Current contract value.
        contract_value: Decimal,
        /// Invoiced total before the write.
        invoiced_total: Decimal,
        /// Amount being invoiced.
        proposed: Decimal,
    },
    /// Bill lines matched to a commitment exceed what is left on it.
    OverMatch {
        /// The over-matched commitment.
        commitment_id: CommitmentId,
        /// Remaining amount before the write.
        remaining: Decimal,
        /// Amount the new lines match against it.
        matched: Decimal,
    },
    /// The bill may already have been entered.
    PossibleDuplicateBill {
        /// The bill it resembles.
        existing_bill_id: BillId,
        /// What matched.
        reason: DuplicateReason,
    },
}

impl Advisory {
    /// Returns true if the guard policy refuses this advisory outright.
    #[must_use]
    pub fn is_hard_capped(&self, policy: &GuardPolicy) -> bool {
        match self {
            Self::OverInvoice { .. } => policy.hard_cap_over_invoice,
            Self::OverMatch { .. } => policy.hard_cap_over_match,
            Self::PossibleDuplicateBill { .. } => false,
        }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverInvoice {
                contract_value,
                invoiced_total,
                proposed,
            } => write!(
                f,
                "invoicing {proposed} on top of {invoiced_total} exceeds contract value {contract_value}"
            ),
            Self::OverMatch {
                commitment_id,
                remaining,
                matched,
            } => write!(
                f,
                "matching {matched} against commitment {commitment_id} exceeds remaining {remaining}"
            ),
            Self::PossibleDuplicateBill {
                existing_bill_id,
                reason,
            } => write!(f, "possible duplicate of bill {existing_bill_id} ({reason:?})"),
        }
    }
}

/// Whether the caller has acknowledged the advisories for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// Not yet acknowledged; any advisory blocks the write.
    #[default]
    Unconfirmed,
    /// Acknowledged; advisories are logged and the write proceeds.
    Confirmed,
}

/// Decides whether a write may proceed given its advisories.
///
/// # Errors
///
/// Returns `EngineError::HardCapExceeded` if the policy caps any advisory, or
/// `EngineError::ConfirmationRequired` if advisories remain unconfirmed.
pub fn enforce(
    advisories: Vec<Advisory>,
    confirmation: Confirmation,
    policy: &GuardPolicy,
) -> Result<(), EngineError> {
    if let Some(capped) = advisories.iter().find(|a| a.is_hard_capped(policy)) {
        return Err(EngineError::HardCapExceeded(capped.clone()));
    }

    if advisories.is_empty() {
        return Ok(());
    }

    match confirmation {
        Confirmation::Unconfirmed => Err(EngineError::ConfirmationRequired(advisories)),
        Confirmation::Confirmed => {
            for advisory in &advisories {
                warn!(%advisory, "proceeding past confirmed advisory");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn over_invoice() -> Advisory {
        Advisory::OverInvoice {
            contract_value: dec!(1000),
            invoiced_total: dec!(900),
            proposed: dec!(200),
        }
    }

    #[test]
    fn test_no_advisories_always_passes() {
        assert!(enforce(vec![], Confirmation::Unconfirmed, &GuardPolicy::default()).is_ok());
    }

    #[test]
    fn test_unconfirmed_advisory_blocks() {
        let result = enforce(
            vec![over_invoice()],
            Confirmation::Unconfirmed,
            &GuardPolicy::default(),
        );
        assert_eq!(
            result,
            Err(EngineError::ConfirmationRequired(vec![over_invoice()]))
        );
    }

    #[test]
    fn test_confirmed_advisory_passes() {
        let result = enforce(
            vec![over_invoice()],
            Confirmation::Confirmed,
            &GuardPolicy::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_hard_cap_ignores_confirmation() {
        let policy = GuardPolicy {
            hard_cap_over_invoice: true,
            hard_cap_over_match: false,
        };
        let result = enforce(vec![over_invoice()], Confirmation::Confirmed, &policy);
        assert_eq!(result, Err(EngineError::HardCapExceeded(over_invoice())));
    }

    #[test]
    fn test_duplicates_are_never_capped() {
        let policy = GuardPolicy {
            hard_cap_over_invoice: true,
            hard_cap_over_match: true,
        };
        let duplicate = Advisory::PossibleDuplicateBill {
            existing_bill_id: BillId::new(),
            reason: DuplicateReason::TotalAndDate,
        };
        assert!(!duplicate.is_hard_capped(&policy));
    }

    #[test]
    fn test_display_mentions_amounts() {
        let text = over_invoice().to_string();
        assert!(text.contains("200"));
        assert!(text.contains("1000"));
    }
}
