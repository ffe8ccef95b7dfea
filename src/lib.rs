//! # greeks-rs
//!
//! Black-Scholes pricing, Greeks and implied volatility for European options,
//! plus the position analytics that consume them.
//!
//! ## Crate layout
//!
//! - [`pricing`]: option types, the lenient pricer and delta, the strict
//!   Greeks bundle, the Newton-Raphson/bisection implied volatility solver
//!   and a moneyness-based IV estimate.
//! - [`analytics`]: a Greeks calculator driven by calendar dates and market
//!   prices, delta-adjusted portfolio exposure, PMCC scanning and collar
//!   analysis for earnings protection.
//! - [`utils`]: rounding and averaging helpers shared by the reports.
//!
//! ## Conventions
//!
//! - Time to expiry is in years, calendar days divided by 365.
//! - Rates and volatilities are decimals (`0.05`, `0.30`).
//! - Theta is per calendar day, vega and rho per one percentage point.
//!
//! ## Example
//!
//! ```
//! use greeks_rs::prelude::*;
//!
//! let params = OptionParams::put(450.0, 440.0, 30.0 / 365.0, 0.05);
//! let greeks = BlackScholes::greeks(&params, 0.25).unwrap();
//! assert!(greeks.delta < 0.0 && greeks.delta > -0.5);
//!
//! let iv = implied_volatility(&params, greeks.price).unwrap();
//! assert!((iv - 0.25).abs() < 0.01);
//! ```

pub mod analytics;
pub mod pricing;
pub mod utils;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::analytics::{
        AnalysisError, CollarConfig, DeltaExposureCalculator, ExposureConfig, GreeksRequest,
        PmccConfig, Position, analyze_collar, analyze_pmcc, calculate_greeks,
    };
    pub use crate::pricing::{
        BlackScholes, Greeks, IVSolution, OptionParams, OptionType, PricingError, SolverConfig,
        estimate_iv, implied_volatility, solve_iv,
    };
}
