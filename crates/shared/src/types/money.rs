//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the engine is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Goods and services tax applied to the contract price.
///
/// Fixed at 10%. Not configurable.
pub const GST_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Currency a project is quoted and invoiced in.
///
/// Only used when rendering documents; the engine never converts between currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Australian Dollar
    #[default]
    Aud,
    /// New Zealand Dollar
    Nzd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aud => write!(f, "AUD"),
            Self::Nzd => write!(f, "NZD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AUD" => Ok(Self::Aud),
            "NZD" => Ok(Self::Nzd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Rounds an amount to whole cents, midpoint away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent`% of `amount` without rounding.
#[must_use]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

/// Returns `part` as a percentage of `whole`, rounded to 2 dp.
///
/// Zero when `whole` is zero.
#[must_use]
pub fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
    }
}
