//! Implied volatility solver.
//!
//! Two stages, tried in order:
//!
//! 1. [`newton_raphson`] from a fixed initial guess. It stops early when vega
//!    collapses (deep ITM/OTM or very short-dated options), where the Newton
//!    step is undefined.
//! 2. [`bisection`] over `[min_iv, max_iv]`, which only relies on the price
//!    being increasing in volatility and therefore always returns a value.

use super::black_scholes::BlackScholes;
use super::types::{
    INITIAL_VOLATILITY_GUESS, IVSolution, MAX_ITERATIONS, MAX_VOLATILITY, MIN_VEGA,
    MIN_VOLATILITY, OptionParams, PRICE_TOLERANCE, SolverMethod,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration for the implied volatility solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum iterations per stage.
    pub max_iterations: u32,
    /// Convergence tolerance on the absolute price difference.
    pub tolerance: f64,
    /// Newton-Raphson starting volatility.
    pub initial_guess: f64,
    /// Minimum IV bound.
    pub min_iv: f64,
    /// Maximum IV bound.
    pub max_iv: f64,
    /// Vega below which Newton-Raphson hands over to bisection.
    pub min_vega: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: PRICE_TOLERANCE,
            initial_guess: INITIAL_VOLATILITY_GUESS,
            min_iv: MIN_VOLATILITY,
            max_iv: MAX_VOLATILITY,
            min_vega: MIN_VEGA,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the initial IV guess.
    #[must_use]
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    /// Sets the IV bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_iv: f64, max_iv: f64) -> Self {
        self.min_iv = min_iv;
        self.max_iv = max_iv;
        self
    }

    /// Sets the vega threshold that triggers the bisection fallback.
    #[must_use]
    pub fn with_min_vega(mut self, min_vega: f64) -> Self {
        self.min_vega = min_vega;
        self
    }
}

/// How the Newton-Raphson stage ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewtonOutcome {
    /// Price matched within tolerance.
    Converged {
        /// Solved volatility.
        iv: f64,
        /// Iterations used, including the converging one.
        iterations: u32,
    },
    /// Vega fell below the threshold; no step could be taken.
    FlatVega {
        /// Volatility at which vega collapsed.
        iv: f64,
        /// Iterations used before giving up.
        iterations: u32,
    },
    /// Iteration cap reached without meeting the tolerance.
    Exhausted {
        /// Last volatility estimate.
        last_iv: f64,
    },
}

/// Runs the Newton-Raphson stage.
///
/// σ_{n+1} = clamp(σ_n - (BS(σ_n) - market_price) / vega(σ_n), min_iv, max_iv)
///
/// The vega check comes before the convergence check, so a flat-vega point
/// hands over to bisection even if its price happens to match.
pub fn newton_raphson(
    params: &OptionParams,
    market_price: f64,
    config: &SolverConfig,
) -> NewtonOutcome {
    let mut iv = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let price = BlackScholes::price(params, iv);
        let vega = BlackScholes::vega(params, iv);

        if vega < config.min_vega {
            return NewtonOutcome::FlatVega {
                iv,
                iterations: iteration + 1,
            };
        }

        let diff = price - market_price;
        if diff.abs() < config.tolerance {
            return NewtonOutcome::Converged {
                iv,
                iterations: iteration + 1,
            };
        }

        iv = (iv - diff / vega).clamp(config.min_iv, config.max_iv);
        trace!("newton iteration {}: iv={:.6}, diff={:.3e}", iteration, iv, diff);
    }

    NewtonOutcome::Exhausted { last_iv: iv }
}

/// Runs the bisection stage over `[min_iv, max_iv]`.
///
/// Returns the first midpoint whose price is within tolerance, otherwise the
/// midpoint of the final bracket with `converged` set to false.
#[must_use]
pub fn bisection(params: &OptionParams, market_price: f64, config: &SolverConfig) -> IVSolution {
    let mut low = config.min_iv;
    let mut high = config.max_iv;

    for iteration in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let price = BlackScholes::price(params, mid);

        if (price - market_price).abs() < config.tolerance {
            return IVSolution {
                iv: mid,
                method: SolverMethod::Bisection,
                iterations: iteration + 1,
                converged: true,
            };
        }

        if price > market_price {
            high = mid;
        } else {
            low = mid;
        }
    }

    IVSolution {
        iv: (low + high) / 2.0,
        method: SolverMethod::Bisection,
        iterations: config.max_iterations,
        converged: false,
    }
}

/// Solves for implied volatility, Newton-Raphson first and bisection as the
/// fallback.
///
/// # Returns
/// - `None` when `market_price <= 0` or the option has no time left
/// - `Some(solution)` otherwise; the value always lies in `[min_iv, max_iv]`
///
/// # Example
/// ```
/// use greeks_rs::pricing::{BlackScholes, OptionParams, SolverConfig, solve_iv};
///
/// let params = OptionParams::call(100.0, 100.0, 0.5, 0.05);
/// let market_price = BlackScholes::price(&params, 0.25);
///
/// let solution = solve_iv(&params, market_price, &SolverConfig::default()).unwrap();
/// assert!((solution.iv - 0.25).abs() < 1e-3);
/// ```
#[must_use]
pub fn solve_iv(
    params: &OptionParams,
    market_price: f64,
    config: &SolverConfig,
) -> Option<IVSolution> {
    if market_price <= 0.0 || params.time_to_expiry <= 0.0 {
        debug!(
            "no implied volatility for price {} with time to expiry {}",
            market_price, params.time_to_expiry
        );
        return None;
    }

    match newton_raphson(params, market_price, config) {
        NewtonOutcome::Converged { iv, iterations } => Some(IVSolution {
            iv,
            method: SolverMethod::NewtonRaphson,
            iterations,
            converged: true,
        }),
        NewtonOutcome::FlatVega { iv, iterations } => {
            debug!(
                "vega collapsed at iv {:.6} after {} iterations, falling back to bisection",
                iv, iterations
            );
            Some(bisection(params, market_price, config))
        }
        NewtonOutcome::Exhausted { last_iv } => {
            debug!(
                "newton-raphson did not converge (last iv {:.6}), falling back to bisection",
                last_iv
            );
            Some(bisection(params, market_price, config))
        }
    }
}

/// Implied volatility with the default solver configuration.
#[must_use]
pub fn implied_volatility(params: &OptionParams, market_price: f64) -> Option<f64> {
    solve_iv(params, market_price, &SolverConfig::default()).map(|solution| solution.iv)
}
