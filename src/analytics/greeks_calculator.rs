//! Greeks for a single option described by dates and an optional market price.
//!
//! Resolves the expiry (explicit days-to-expiry or a calendar date), picks a
//! volatility (solved from the market price, an override, or a default) and
//! runs the strict Greeks bundle.

use super::error::AnalysisError;
use crate::pricing::{
    BlackScholes, DAYS_PER_YEAR, Greeks, OptionParams, OptionType, implied_volatility,
};
use crate::utils::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Risk-free rate used when the request does not set one.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// Volatility used when neither a market price nor an override yields one.
pub const DEFAULT_VOLATILITY: f64 = 0.30;

/// Inputs for [`calculate_greeks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreeksRequest {
    /// Current underlying price.
    pub spot: f64,
    /// Option strike price.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Expiration date. Ignored when `dte` is set.
    pub expiry: Option<NaiveDate>,
    /// Days to expiration.
    pub dte: Option<i64>,
    /// Reference date for `expiry`; defaults to the caller's `today`.
    pub as_of: Option<NaiveDate>,
    /// Observed option price, used to solve for implied volatility.
    pub market_price: Option<f64>,
    /// Risk-free rate (annualized).
    pub rate: f64,
    /// Volatility override, used when no market price is given.
    pub volatility: Option<f64>,
}

impl GreeksRequest {
    /// Creates a request with the default rate and no expiry set.
    #[must_use]
    pub fn new(spot: f64, strike: f64, option_type: OptionType) -> Self {
        Self {
            spot,
            strike,
            option_type,
            expiry: None,
            dte: None,
            as_of: None,
            market_price: None,
            rate: DEFAULT_RISK_FREE_RATE,
            volatility: None,
        }
    }

    /// Sets the expiration date.
    #[must_use]
    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets days to expiration.
    #[must_use]
    pub fn with_dte(mut self, dte: i64) -> Self {
        self.dte = Some(dte);
        self
    }

    /// Sets the reference date used with [`GreeksRequest::with_expiry`].
    #[must_use]
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Sets the observed market price.
    #[must_use]
    pub fn with_market_price(mut self, market_price: f64) -> Self {
        self.market_price = Some(market_price);
        self
    }

    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the volatility override.
    #[must_use]
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }
}

/// Greeks, or the reason the strict bundle refused to compute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GreeksOutput {
    /// Computed Greeks.
    Greeks(Greeks),
    /// Error marker in place of the Greeks.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl GreeksOutput {
    /// The Greeks, if they were computed.
    #[must_use]
    pub fn greeks(&self) -> Option<&Greeks> {
        match self {
            GreeksOutput::Greeks(greeks) => Some(greeks),
            GreeksOutput::Error { .. } => None,
        }
    }
}

/// Result of [`calculate_greeks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreeksReport {
    /// Spot, rounded to cents.
    pub spot: f64,
    /// Strike as requested.
    pub strike: f64,
    /// ISO expiry date, or `"{n} DTE"` when days were given directly.
    pub expiry: String,
    /// Days to expiration.
    pub days_to_expiry: i64,
    /// Call or put.
    pub option_type: OptionType,
    /// Market price rounded to cents, absent when none was given.
    pub market_price: Option<f64>,
    /// Volatility used, in percent with two decimals.
    pub iv: f64,
    /// Risk-free rate used.
    pub risk_free_rate: f64,
    /// Greeks or the error marker.
    pub greeks: GreeksOutput,
}

/// Computes the Greeks report for one option.
///
/// `today` is the reference date when the request carries an `expiry` but no
/// `as_of`.
///
/// # Errors
/// - [`AnalysisError::MissingExpiry`] when neither `dte` nor `expiry` is set
/// - [`AnalysisError::Expired`] when the option has no days left
pub fn calculate_greeks(
    request: &GreeksRequest,
    today: NaiveDate,
) -> Result<GreeksReport, AnalysisError> {
    let (days_to_expiry, expiry_label) = match (request.dte, request.expiry) {
        (Some(dte), _) => (dte, format!("{dte} DTE")),
        (None, Some(expiry)) => {
            let reference = request.as_of.unwrap_or(today);
            (
                (expiry - reference).num_days(),
                expiry.format("%Y-%m-%d").to_string(),
            )
        }
        (None, None) => return Err(AnalysisError::MissingExpiry),
    };

    let time_to_expiry = days_to_expiry as f64 / DAYS_PER_YEAR;
    if time_to_expiry <= 0.0 {
        return Err(AnalysisError::Expired { days_to_expiry });
    }

    let params = OptionParams::new(
        request.spot,
        request.strike,
        time_to_expiry,
        request.rate,
        request.option_type,
    );

    let iv = match (request.market_price, request.volatility) {
        (Some(market_price), _) if market_price > 0.0 => {
            implied_volatility(&params, market_price).unwrap_or_else(|| {
                warn!(
                    "no implied volatility for market price {}, using {}",
                    market_price, DEFAULT_VOLATILITY
                );
                DEFAULT_VOLATILITY
            })
        }
        (_, Some(volatility)) => volatility,
        _ => DEFAULT_VOLATILITY,
    };
    debug!(
        "greeks for {} {} with {} days, iv {:.4}",
        request.option_type, request.strike, days_to_expiry, iv
    );

    let greeks = match BlackScholes::greeks(&params, iv) {
        Ok(greeks) => GreeksOutput::Greeks(greeks),
        Err(err) => GreeksOutput::Error {
            error: err.to_string(),
        },
    };

    Ok(GreeksReport {
        spot: round_to(request.spot, 2),
        strike: request.strike,
        expiry: expiry_label,
        days_to_expiry,
        option_type: request.option_type,
        market_price: request
            .market_price
            .filter(|price| *price != 0.0)
            .map(|price| round_to(price, 2)),
        iv: round_to(iv * 100.0, 2),
        risk_free_rate: request.rate,
        greeks,
    })
}
