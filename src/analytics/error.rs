//! Error types for the analytics built on the pricing engine.

use crate::pricing::PricingError;
use std::fmt;

/// Reasons an analysis cannot produce a result.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Neither an expiry date nor a days-to-expiry count was supplied.
    MissingExpiry,

    /// The option expires today or has already expired.
    Expired {
        /// Days remaining (zero or negative).
        days_to_expiry: i64,
    },

    /// No expiration far enough out to serve as the LEAPS leg.
    NoLeapsExpiry {
        /// Minimum days required.
        min_days: i64,
    },

    /// No expiration inside the short-leg window.
    NoShortExpiry,

    /// No quoted strike could be matched to the LEAPS delta target.
    NoLeapsStrike {
        /// Target delta.
        target_delta: f64,
    },

    /// No quoted strike above the LEAPS strike for the short leg.
    NoShortStrike {
        /// Strike of the selected LEAPS.
        leaps_strike: f64,
    },

    /// Error from the pricing engine.
    Pricing(PricingError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingExpiry => {
                write!(f, "must provide either an expiry date or days to expiry")
            }
            AnalysisError::Expired { days_to_expiry } => {
                write!(
                    f,
                    "option has expired or expires today ({days_to_expiry} days to expiry)"
                )
            }
            AnalysisError::NoLeapsExpiry { min_days } => {
                write!(f, "no LEAPS expiry >= {min_days} days found")
            }
            AnalysisError::NoShortExpiry => write!(f, "no suitable short-term expiry found"),
            AnalysisError::NoLeapsStrike { target_delta } => {
                write!(
                    f,
                    "could not find suitable LEAPS strike with delta ~{target_delta}"
                )
            }
            AnalysisError::NoShortStrike { leaps_strike } => {
                write!(f, "could not find short strike > LEAPS strike ${leaps_strike}")
            }
            AnalysisError::Pricing(err) => write!(f, "pricing error: {err}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Pricing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PricingError> for AnalysisError {
    fn from(err: PricingError) -> Self {
        AnalysisError::Pricing(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        assert!(
            AnalysisError::MissingExpiry
                .to_string()
                .contains("days to expiry")
        );

        let err = AnalysisError::Expired { days_to_expiry: 0 };
        assert!(err.to_string().contains("expires today"));

        let err = AnalysisError::NoLeapsExpiry { min_days: 270 };
        assert_eq!(err.to_string(), "no LEAPS expiry >= 270 days found");

        let err = AnalysisError::NoLeapsStrike { target_delta: 0.8 };
        assert!(err.to_string().contains("delta ~0.8"));

        let err = AnalysisError::NoShortStrike {
            leaps_strike: 95.0,
        };
        assert!(err.to_string().contains("$95"));
    }

    #[test]
    fn test_from_pricing_error() {
        let err: AnalysisError = PricingError::InvalidVolatility { volatility: 0.0 }.into();
        assert!(err.to_string().contains("invalid volatility"));
        assert!(err.source().is_some());
    }
}
