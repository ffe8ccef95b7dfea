//! Black-Scholes pricing, Greeks and implied volatility.
//!
//! # Overview
//!
//! Everything here is pure and synchronous: no I/O, no shared state. Two
//! deliberately different policies coexist:
//!
//! - [`BlackScholes::price`] and [`BlackScholes::delta`] never fail. At
//!   expiry or with zero volatility they return intrinsic value and a step
//!   delta.
//! - [`BlackScholes::greeks`] rejects the same inputs with a
//!   [`PricingError`].
//!
//! # Implied volatility
//!
//! There is no closed-form inverse, so [`solve_iv`] runs Newton-Raphson from
//! a 30% guess and falls back to bisection when vega collapses or the
//! iteration cap is hit. When no market price exists at all,
//! [`estimate_iv`] gives a moneyness-based guess.
//!
//! # Example
//!
//! ```
//! use greeks_rs::pricing::{BlackScholes, OptionParams, implied_volatility};
//!
//! let params = OptionParams::call(100.0, 100.0, 1.0, 0.05);
//! let price = BlackScholes::price(&params, 0.2);
//! assert!(price > 10.0 && price < 15.0);
//!
//! let greeks = BlackScholes::greeks(&params, 0.2).unwrap();
//! assert_eq!(greeks.delta, 0.6368);
//!
//! let iv = implied_volatility(&params, price).unwrap();
//! assert!((iv - 0.2).abs() < 1e-3);
//! ```

mod black_scholes;
mod error;
mod estimate;
mod solver;
mod types;

pub use black_scholes::BlackScholes;
pub use error::PricingError;
pub use estimate::{
    BASE_IV, ITM_IV_MULTIPLIER, LOWER_MONEYNESS, OTM_IV_MULTIPLIER, UPPER_MONEYNESS, estimate_iv,
};
pub use solver::{
    NewtonOutcome, SolverConfig, bisection, implied_volatility, newton_raphson, solve_iv,
};
pub use types::{
    DAYS_PER_YEAR, Greeks, INITIAL_VOLATILITY_GUESS, IVSolution, MAX_ITERATIONS, MAX_VOLATILITY,
    MIN_VEGA, MIN_VOLATILITY, OptionParams, OptionType, PRICE_TOLERANCE, ParseOptionTypeError,
    SolverMethod,
};
