//! Types and constants shared by the pricing engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower clamp for any volatility produced by the solver (0.1%).
pub const MIN_VOLATILITY: f64 = 0.001;

/// Upper clamp for any volatility produced by the solver (500%).
pub const MAX_VOLATILITY: f64 = 5.0;

/// Starting point of the Newton-Raphson iteration (30%).
pub const INITIAL_VOLATILITY_GUESS: f64 = 0.30;

/// Absolute price difference at which the solver stops.
pub const PRICE_TOLERANCE: f64 = 1e-6;

/// Iteration cap for each solver stage.
pub const MAX_ITERATIONS: u32 = 100;

/// Below this vega the Newton step is considered undefined.
pub const MIN_VEGA: f64 = 1e-10;

/// Calendar days used to annualise day counts and to express daily theta.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option (right to buy the underlying at strike price).
    Call,
    /// Put option (right to sell the underlying at strike price).
    Put,
}

impl OptionType {
    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is neither `call` nor `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionTypeError(pub String);

impl fmt::Display for ParseOptionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option type '{}', expected 'call' or 'put'", self.0)
    }
}

impl std::error::Error for ParseOptionTypeError {}

impl FromStr for OptionType {
    type Err = ParseOptionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(ParseOptionTypeError(s.to_string())),
        }
    }
}

/// Contract and market inputs for a pricing call.
///
/// Volatility is deliberately not part of this struct: every pricing
/// function takes it as a separate argument so the solver can vary it
/// without rebuilding the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParams {
    /// Underlying spot price.
    pub spot: f64,
    /// Option strike price.
    pub strike: f64,
    /// Time to expiration in years (e.g., 30 days = 30.0 / 365.0).
    pub time_to_expiry: f64,
    /// Risk-free interest rate (annualized, continuous, e.g. 0.05 for 5%).
    pub risk_free_rate: f64,
    /// Option type (Call or Put).
    pub option_type: OptionType,
}

impl OptionParams {
    /// Creates new option parameters.
    ///
    /// # Arguments
    /// - `spot`: Underlying spot price
    /// - `strike`: Option strike price
    /// - `time_to_expiry`: Time to expiration in years
    /// - `risk_free_rate`: Risk-free interest rate (annualized)
    /// - `option_type`: Call or Put
    #[must_use]
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            option_type,
        }
    }

    /// Creates parameters for a call option.
    #[must_use]
    pub fn call(spot: f64, strike: f64, time_to_expiry: f64, risk_free_rate: f64) -> Self {
        Self::new(
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            OptionType::Call,
        )
    }

    /// Creates parameters for a put option.
    #[must_use]
    pub fn put(spot: f64, strike: f64, time_to_expiry: f64, risk_free_rate: f64) -> Self {
        Self::new(
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            OptionType::Put,
        )
    }

    /// Returns a copy with a different spot price.
    #[must_use]
    pub fn with_spot(mut self, spot: f64) -> Self {
        self.spot = spot;
        self
    }

    /// Calculates the intrinsic value of the option.
    ///
    /// For calls: max(0, spot - strike)
    /// For puts: max(0, strike - spot)
    #[must_use]
    pub fn intrinsic_value(&self) -> f64 {
        match self.option_type {
            OptionType::Call => (self.spot - self.strike).max(0.0),
            OptionType::Put => (self.strike - self.spot).max(0.0),
        }
    }

    /// Spot over strike.
    #[must_use]
    pub fn moneyness(&self) -> f64 {
        self.spot / self.strike
    }

    /// Returns true if the option is in-the-money.
    #[must_use]
    pub fn is_itm(&self) -> bool {
        self.intrinsic_value() > 0.0
    }
}

/// Full set of first-order Greeks plus the model price.
///
/// Theta is per calendar day, vega per volatility point and rho per rate
/// point. Values are rounded: gamma to 6 decimals, everything else to 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Model price.
    pub price: f64,
    /// ∂price/∂S.
    pub delta: f64,
    /// ∂²price/∂S².
    pub gamma: f64,
    /// Price change per calendar day.
    pub theta: f64,
    /// Price change per 1% move in volatility.
    pub vega: f64,
    /// Price change per 1% move in the risk-free rate.
    pub rho: f64,
}

/// Which solver stage produced an implied volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Newton-Raphson on vega.
    NewtonRaphson,
    /// Bracketing bisection over the volatility bounds.
    Bisection,
}

/// Result of an implied volatility solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IVSolution {
    /// Implied volatility (annualized, e.g. 0.25 = 25%).
    pub iv: f64,
    /// Stage that produced `iv`.
    pub method: SolverMethod,
    /// Iterations spent in the stage that produced `iv`.
    pub iterations: u32,
    /// False when the bisection ran out of iterations before meeting the
    /// price tolerance; `iv` is then the midpoint of the last bracket.
    pub converged: bool,
}

impl IVSolution {
    /// Returns the IV as a percentage (e.g., 25.0 for 25%).
    #[must_use]
    pub fn iv_percent(&self) -> f64 {
        self.iv * 100.0
    }
}
