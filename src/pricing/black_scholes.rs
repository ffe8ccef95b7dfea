//! Black-Scholes pricing model and Greeks calculation.
//!
//! European options on a non-dividend-paying underlying with continuous
//! compounding. Two entry points price an option:
//!
//! - [`BlackScholes::price`] is lenient: at expiry or with zero volatility it
//!   returns intrinsic value. Scenario repricing relies on this.
//! - [`BlackScholes::greeks`] is strict: the same inputs are reported as
//!   [`PricingError`] so user-facing Greeks never silently degrade.

use super::error::PricingError;
use super::types::{DAYS_PER_YEAR, Greeks, OptionParams, OptionType};
use crate::utils::round_to;
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// Black-Scholes pricing model implementation.
///
/// Provides methods for calculating option prices and Greeks
/// using the Black-Scholes-Merton formula.
pub struct BlackScholes;

impl BlackScholes {
    /// Standard normal cumulative distribution function (CDF).
    ///
    /// Calculates P(Z ≤ x) where Z is a standard normal random variable.
    /// Evaluated through `erfc` so the lower tail keeps full precision.
    #[must_use]
    pub fn norm_cdf(x: f64) -> f64 {
        0.5 * erfc(-x / SQRT_2)
    }

    /// Standard normal probability density function (PDF).
    #[must_use]
    pub fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Calculates the d1 parameter of the Black-Scholes formula.
    ///
    /// d1 = [ln(S/K) + (r + σ²/2)T] / (σ√T)
    ///
    /// # Arguments
    /// - `spot`: Current underlying price (S)
    /// - `strike`: Option strike price (K)
    /// - `rate`: Risk-free interest rate (r)
    /// - `time`: Time to expiration in years (T)
    /// - `vol`: Volatility (σ)
    #[must_use]
    pub fn d1(spot: f64, strike: f64, rate: f64, time: f64, vol: f64) -> f64 {
        let sqrt_time = time.sqrt();
        ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * sqrt_time)
    }

    /// Calculates the d2 parameter of the Black-Scholes formula.
    ///
    /// d2 = d1 - σ√T
    #[must_use]
    pub fn d2(d1: f64, vol: f64, time: f64) -> f64 {
        d1 - vol * time.sqrt()
    }

    fn d1_d2(params: &OptionParams, vol: f64) -> (f64, f64) {
        let d1 = Self::d1(
            params.spot,
            params.strike,
            params.risk_free_rate,
            params.time_to_expiry,
            vol,
        );
        (d1, Self::d2(d1, vol, params.time_to_expiry))
    }

    /// True when the closed form is undefined and boundary values apply.
    fn at_boundary(params: &OptionParams, vol: f64) -> bool {
        params.time_to_expiry <= 0.0 || vol <= 0.0
    }

    /// Calculates the theoretical option price using Black-Scholes formula.
    ///
    /// For calls: C = S·N(d1) - K·e^(-rT)·N(d2)
    /// For puts:  P = K·e^(-rT)·N(-d2) - S·N(-d1)
    ///
    /// Returns intrinsic value when `T <= 0` or `vol <= 0`. Spot and strike
    /// are not validated; non-positive values propagate as NaN.
    ///
    /// # Arguments
    /// - `params`: Option parameters (spot, strike, time, rate, type)
    /// - `vol`: Volatility (σ)
    #[must_use]
    pub fn price(params: &OptionParams, vol: f64) -> f64 {
        if Self::at_boundary(params, vol) {
            return params.intrinsic_value();
        }

        let (d1, d2) = Self::d1_d2(params, vol);
        let discount = (-params.risk_free_rate * params.time_to_expiry).exp();

        match params.option_type {
            OptionType::Call => {
                params.spot * Self::norm_cdf(d1) - params.strike * discount * Self::norm_cdf(d2)
            }
            OptionType::Put => {
                params.strike * discount * Self::norm_cdf(-d2) - params.spot * Self::norm_cdf(-d1)
            }
        }
    }

    /// Calculates vega (∂price/∂σ) - sensitivity to volatility.
    ///
    /// Vega = S · N'(d1) · √T
    ///
    /// This is the raw derivative (per unit of σ) used by the IV solver, not
    /// the per-point figure reported by [`BlackScholes::greeks`].
    #[must_use]
    pub fn vega(params: &OptionParams, vol: f64) -> f64 {
        if Self::at_boundary(params, vol) {
            return 0.0;
        }

        let (d1, _) = Self::d1_d2(params, vol);
        params.spot * Self::norm_pdf(d1) * params.time_to_expiry.sqrt()
    }

    /// Calculates delta (∂price/∂S) - sensitivity to underlying price.
    ///
    /// For calls: Δ = N(d1)
    /// For puts:  Δ = N(d1) - 1
    ///
    /// At the boundary delta is a step: a call is 1 when `S > K`, a put is
    /// -1 when `S < K`, and 0 otherwise.
    #[must_use]
    pub fn delta(params: &OptionParams, vol: f64) -> f64 {
        if Self::at_boundary(params, vol) {
            return match params.option_type {
                OptionType::Call => {
                    if params.spot > params.strike {
                        1.0
                    } else {
                        0.0
                    }
                }
                OptionType::Put => {
                    if params.spot < params.strike {
                        -1.0
                    } else {
                        0.0
                    }
                }
            };
        }

        let (d1, _) = Self::d1_d2(params, vol);

        match params.option_type {
            OptionType::Call => Self::norm_cdf(d1),
            OptionType::Put => Self::norm_cdf(d1) - 1.0,
        }
    }

    /// Calculates price, delta, gamma, theta, vega and rho in one pass.
    ///
    /// Theta is per calendar day, vega and rho per percentage point.
    ///
    /// # Errors
    /// - [`PricingError::Expired`] when `T <= 0`
    /// - [`PricingError::InvalidVolatility`] when `vol <= 0`
    pub fn greeks(params: &OptionParams, vol: f64) -> Result<Greeks, PricingError> {
        if params.time_to_expiry <= 0.0 {
            return Err(PricingError::Expired {
                time_to_expiry: params.time_to_expiry,
            });
        }
        if vol <= 0.0 {
            return Err(PricingError::InvalidVolatility { volatility: vol });
        }

        let spot = params.spot;
        let strike = params.strike;
        let rate = params.risk_free_rate;
        let time = params.time_to_expiry;

        let (d1, d2) = Self::d1_d2(params, vol);
        let sqrt_time = time.sqrt();
        let discount = (-rate * time).exp();
        let n_d1 = Self::norm_pdf(d1);
        let decay = -spot * n_d1 * vol / (2.0 * sqrt_time);

        let (price, delta, theta_annual, rho) = match params.option_type {
            OptionType::Call => {
                let cdf_d1 = Self::norm_cdf(d1);
                let cdf_d2 = Self::norm_cdf(d2);
                (
                    spot * cdf_d1 - strike * discount * cdf_d2,
                    cdf_d1,
                    decay - rate * strike * discount * cdf_d2,
                    strike * time * discount * cdf_d2,
                )
            }
            OptionType::Put => {
                let cdf_neg_d2 = Self::norm_cdf(-d2);
                (
                    strike * discount * cdf_neg_d2 - spot * Self::norm_cdf(-d1),
                    Self::norm_cdf(d1) - 1.0,
                    decay + rate * strike * discount * cdf_neg_d2,
                    -strike * time * discount * cdf_neg_d2,
                )
            }
        };

        let gamma = n_d1 / (spot * vol * sqrt_time);
        let vega = spot * n_d1 * sqrt_time;

        Ok(Greeks {
            price: round_to(price, 4),
            delta: round_to(delta, 4),
            gamma: round_to(gamma, 6),
            theta: round_to(theta_annual / DAYS_PER_YEAR, 4),
            vega: round_to(vega / 100.0, 4),
            rho: round_to(rho / 100.0, 4),
        })
    }
}
