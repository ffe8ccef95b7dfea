//! Moneyness-based volatility estimate.
//!
//! Used when no market price is available to solve from. It is a crude smile
//! approximation with fixed thresholds, not a calibrated surface; downstream
//! exposure figures depend on these exact numbers.

use super::types::OptionType;

/// Volatility assumed for options near the money.
pub const BASE_IV: f64 = 0.35;

/// Spot/strike ratio above which a call is deep ITM (a put deep OTM).
pub const UPPER_MONEYNESS: f64 = 1.1;

/// Spot/strike ratio below which a call is deep OTM (a put deep ITM).
pub const LOWER_MONEYNESS: f64 = 0.9;

/// Multiplier on [`BASE_IV`] for deep in-the-money options.
pub const ITM_IV_MULTIPLIER: f64 = 0.8;

/// Multiplier on [`BASE_IV`] for deep out-of-the-money options.
pub const OTM_IV_MULTIPLIER: f64 = 1.3;

/// Estimates IV from moneyness alone.
///
/// `time_to_expiry` is accepted for signature symmetry with the pricer and
/// does not affect the estimate.
#[must_use]
pub fn estimate_iv(spot: f64, strike: f64, _time_to_expiry: f64, option_type: OptionType) -> f64 {
    let moneyness = spot / strike;

    let (deep_itm, deep_otm) = match option_type {
        OptionType::Call => (moneyness > UPPER_MONEYNESS, moneyness < LOWER_MONEYNESS),
        OptionType::Put => (moneyness < LOWER_MONEYNESS, moneyness > UPPER_MONEYNESS),
    };

    if deep_itm {
        BASE_IV * ITM_IV_MULTIPLIER
    } else if deep_otm {
        BASE_IV * OTM_IV_MULTIPLIER
    } else {
        BASE_IV
    }
}
