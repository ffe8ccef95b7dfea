//! Error types for the pricing engine.

use std::fmt;

/// Conditions the strict Greeks bundle reports instead of pricing.
///
/// The lenient pricer never produces these: it substitutes intrinsic value.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Time to expiry is zero or negative.
    Expired {
        /// Time to expiry in years.
        time_to_expiry: f64,
    },

    /// Volatility is zero or negative.
    InvalidVolatility {
        /// Volatility that was supplied.
        volatility: f64,
    },
}

impl PricingError {
    /// Stable machine-readable marker for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::Expired { .. } => "expired",
            PricingError::InvalidVolatility { .. } => "invalid_volatility",
        }
    }
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::Expired { .. } => write!(f, "option has expired"),
            PricingError::InvalidVolatility { .. } => write!(f, "invalid volatility"),
        }
    }
}

impl std::error::Error for PricingError {}
