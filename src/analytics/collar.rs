//! Tactical collar analysis for an open PMCC position.
//!
//! Around an earnings release the LEAPS leg of a PMCC is exposed to a gap
//! down. This module prices protective puts at three out-of-the-money levels,
//! replays gap scenarios after earnings and compares them with the loss the
//! unprotected long call would take.

use super::pmcc::ChainRow;
use crate::pricing::{BlackScholes, DAYS_PER_YEAR, OptionParams};
use crate::utils::round_to_step;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

/// Shares per equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum number of closes for a volatility profile.
pub const MIN_HISTORY_LEN: usize = 20;

/// Floor applied to heuristic long-call values.
const MIN_HEURISTIC_VALUE: f64 = 0.1;

/// Volatility assumptions and selection limits for [`analyze_collar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollarConfig {
    /// Risk-free rate.
    pub rate: f64,
    /// Put IV before earnings, used when no put quote exists.
    pub iv_before: f64,
    /// Put IV after a gap up.
    pub iv_after_up: f64,
    /// Put IV when the stock is flat after earnings.
    pub iv_flat: f64,
    /// Put IV after a gap down.
    pub iv_after_down: f64,
    /// Long-call IVs (now, down 10%, down 15%, up 10%) when it has no quote.
    pub long_call_ivs: [f64; 4],
    /// Latest put expiry accepted after earnings, in days.
    pub max_days_after_earnings: i64,
    /// Days after earnings assumed when no earnings date is known.
    pub default_days_after: i64,
    /// Without earnings, only expiries further out than this are used.
    pub min_days_out: i64,
    /// Without earnings, only this many leading expiries are considered.
    pub near_term_expiries: usize,
    /// Maximum number of put expiries analyzed.
    pub max_put_expiries: usize,
    /// Spot must be at least this fraction of the long strike for a healthy PMCC.
    pub healthy_strike_ratio: f64,
}

impl Default for CollarConfig {
    fn default() -> Self {
        Self {
            rate: 0.05,
            iv_before: 0.50,
            iv_after_up: 0.35,
            iv_flat: 0.40,
            iv_after_down: 0.45,
            long_call_ivs: [0.60, 0.65, 0.70, 0.50],
            max_days_after_earnings: 60,
            default_days_after: 7,
            min_days_out: 7,
            near_term_expiries: 6,
            max_put_expiries: 4,
            healthy_strike_ratio: 0.95,
        }
    }
}

impl CollarConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the post-earnings put IVs.
    #[must_use]
    pub fn with_post_earnings_ivs(mut self, up: f64, flat: f64, down: f64) -> Self {
        self.iv_after_up = up;
        self.iv_flat = flat;
        self.iv_after_down = down;
        self
    }
}

/// Put strikes 15%, 10% and 5% below `price`, on the $5 grid.
///
/// Halfway cases round to the even multiple. Duplicates produced by rounding
/// are dropped, keeping the deepest first.
#[must_use]
pub fn put_strike_ladder(price: f64) -> Vec<f64> {
    let mut strikes = Vec::with_capacity(3);
    for factor in [0.85, 0.90, 0.95] {
        let strike = round_to_step(price * factor, 5.0);
        if !strikes.contains(&strike) {
            strikes.push(strike);
        }
    }
    strikes
}

/// Volatility regime of a stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityClass {
    /// Annual volatility up to 25%.
    Low,
    /// Above 25%.
    Moderate,
    /// Above 40%.
    High,
    /// Above 60%.
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    /// Above 80%.
    Extreme,
}

impl VolatilityClass {
    /// Classifies an annualized volatility.
    #[must_use]
    pub fn from_annual(annual_vol: f64) -> Self {
        if annual_vol > 0.80 {
            VolatilityClass::Extreme
        } else if annual_vol > 0.60 {
            VolatilityClass::VeryHigh
        } else if annual_vol > 0.40 {
            VolatilityClass::High
        } else if annual_vol > 0.25 {
            VolatilityClass::Moderate
        } else {
            VolatilityClass::Low
        }
    }
}

/// Historical volatility and one-sigma expected moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    /// Last close.
    pub current_price: f64,
    /// Sample standard deviation of daily returns.
    pub daily_vol: f64,
    /// `daily_vol * sqrt(252)`.
    pub annual_vol: f64,
    /// `annual_vol` in percent.
    pub annual_vol_pct: f64,
    /// Expected move over 5 trading days.
    pub move_1_week: f64,
    /// Expected move over 10 trading days.
    pub move_2_weeks: f64,
    /// Expected move over 15 trading days.
    pub move_3_weeks: f64,
    /// Volatility regime.
    pub vol_class: VolatilityClass,
}

impl VolatilityProfile {
    /// Builds a profile from daily closes, oldest first.
    ///
    /// Returns `None` with fewer than [`MIN_HISTORY_LEN`] closes.
    #[must_use]
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        if closes.len() < MIN_HISTORY_LEN {
            return None;
        }
        let current_price = *closes.last()?;

        let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let daily_vol = returns.std_dev();
        let annual_vol = daily_vol * TRADING_DAYS_PER_YEAR.sqrt();
        let expected_move = |days: f64| current_price * daily_vol * days.sqrt();

        Some(Self {
            current_price,
            daily_vol,
            annual_vol,
            annual_vol_pct: annual_vol * 100.0,
            move_1_week: expected_move(5.0),
            move_2_weeks: expected_move(10.0),
            move_3_weeks: expected_move(15.0),
            vol_class: VolatilityClass::from_annual(annual_vol),
        })
    }

    /// Expected move as a percentage of the current price.
    #[must_use]
    pub fn move_pct(&self, expected_move: f64) -> f64 {
        expected_move / self.current_price * 100.0
    }
}

/// A put expiration considered for protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutExpiry {
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Days from today.
    pub days_out: i64,
    /// Days after the earnings date, when one is known.
    pub days_after_earnings: Option<i64>,
}

/// Chooses candidate put expirations.
///
/// With an earnings date: expiries after earnings by at most
/// `max_days_after_earnings` days that are still in the future. Without one:
/// among the first `near_term_expiries`, those more than `min_days_out` away.
#[must_use]
pub fn select_put_expiries(
    expirations: &[NaiveDate],
    today: NaiveDate,
    earnings: Option<NaiveDate>,
    config: &CollarConfig,
) -> Vec<PutExpiry> {
    match earnings {
        Some(earnings) => expirations
            .iter()
            .filter_map(|&expiry| {
                let days_after = (expiry - earnings).num_days();
                let days_out = (expiry - today).num_days();
                (days_after > 0 && days_after <= config.max_days_after_earnings && days_out > 0)
                    .then_some(PutExpiry {
                        expiry,
                        days_out,
                        days_after_earnings: Some(days_after),
                    })
            })
            .collect(),
        None => expirations
            .iter()
            .take(config.near_term_expiries)
            .filter_map(|&expiry| {
                let days_out = (expiry - today).num_days();
                (days_out > config.min_days_out).then_some(PutExpiry {
                    expiry,
                    days_out,
                    days_after_earnings: None,
                })
            })
            .collect(),
    }
}

/// Underlying price and put value in one scenario, scaled to the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Underlying price after the move.
    pub price: f64,
    /// Value of all puts.
    pub put_value: f64,
    /// Value minus cost of all puts.
    pub put_pnl: f64,
}

/// The four post-earnings scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenarios {
    /// Stock gaps up 10%.
    pub gap_up_10: Scenario,
    /// Stock unchanged.
    pub flat: Scenario,
    /// Stock gaps down 10%.
    pub gap_down_10: Scenario,
    /// Stock gaps down 15%.
    pub gap_down_15: Scenario,
}

/// One protective put candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutAnalysis {
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Days from today.
    pub days_out: i64,
    /// Days after earnings, when known.
    pub days_after_earnings: Option<i64>,
    /// Put strike.
    pub strike: f64,
    /// Distance below spot in percent.
    pub otm_pct: f64,
    /// Price of one put (per share).
    pub cost_per_contract: f64,
    /// Cost of protecting every long contract.
    pub total_cost: f64,
    /// Post-earnings outcomes.
    pub scenarios: Scenarios,
}

/// Prices one put and replays the post-earnings scenarios.
///
/// The cost is `market_mid` when quoted, otherwise Black-Scholes at the
/// pre-earnings IV. Scenario values are taken `days_after_earnings` days out
/// (or `default_days_after`) and gap-down values never drop below intrinsic.
#[must_use]
pub fn analyze_put(
    spot: f64,
    strike: f64,
    expiry: &PutExpiry,
    market_mid: Option<f64>,
    qty: i64,
    config: &CollarConfig,
) -> PutAnalysis {
    let t_before = expiry.days_out as f64 / DAYS_PER_YEAR;
    let days_after = expiry
        .days_after_earnings
        .filter(|days| *days != 0)
        .unwrap_or(config.default_days_after);
    let t_after = days_after as f64 / DAYS_PER_YEAR;

    let put_cost = market_mid.unwrap_or_else(|| {
        BlackScholes::price(
            &OptionParams::put(spot, strike, t_before, config.rate),
            config.iv_before,
        )
    });
    let scale = qty as f64 * CONTRACT_MULTIPLIER;

    let scenario = |price: f64, iv: f64, floor_at_intrinsic: bool| {
        let params = OptionParams::put(price, strike, t_after, config.rate);
        let mut value = BlackScholes::price(&params, iv);
        if floor_at_intrinsic {
            value = value.max(strike - price);
        }
        Scenario {
            price,
            put_value: value * scale,
            put_pnl: (value - put_cost) * scale,
        }
    };

    PutAnalysis {
        expiry: expiry.expiry,
        days_out: expiry.days_out,
        days_after_earnings: expiry.days_after_earnings,
        strike,
        otm_pct: (spot - strike) / spot * 100.0,
        cost_per_contract: put_cost,
        total_cost: put_cost * scale,
        scenarios: Scenarios {
            gap_up_10: scenario(spot * 1.10, config.iv_after_up, false),
            flat: scenario(spot, config.iv_flat, false),
            gap_down_10: scenario(spot * 0.90, config.iv_after_down, true),
            gap_down_15: scenario(spot * 0.85, config.iv_after_down, true),
        },
    }
}

/// The long call of the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongCall {
    /// Strike.
    pub strike: f64,
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Number of contracts.
    pub qty: i64,
    /// Average cost per contract.
    pub avg_cost: f64,
}

/// A short call written against the long call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCall {
    /// Strike.
    pub strike: f64,
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Number of contracts.
    pub qty: i64,
}

/// Long-call value now and its change under the gap scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnprotectedRisk {
    /// Per-share value of the long call now.
    pub long_value_now: f64,
    /// Position loss on a 10% drop.
    pub loss_10: f64,
    /// Position loss on a 15% drop.
    pub loss_15: f64,
    /// Position gain on a 10% rise.
    pub gain_10: f64,
}

/// Estimates what the long call loses or gains without protection.
///
/// With a positive `market_price` the moves are approximated from the quote:
/// near or in the money the call tracks a fixed share of the stock move,
/// out of the money it shrinks in proportion to moneyness. Without a quote
/// the call is repriced with Black-Scholes at stressed IVs.
#[must_use]
pub fn unprotected_risk(
    spot: f64,
    long: &LongCall,
    market_price: Option<f64>,
    today: NaiveDate,
    config: &CollarConfig,
) -> UnprotectedRisk {
    let (now, down_10, down_15, up_10) = match market_price.filter(|price| *price > 0.0) {
        Some(now) if spot >= long.strike * config.healthy_strike_ratio => (
            now,
            (now - spot * 0.10 * 0.55).max(MIN_HEURISTIC_VALUE),
            (now - spot * 0.15 * 0.50).max(MIN_HEURISTIC_VALUE),
            now + spot * 0.10 * 0.60,
        ),
        Some(now) => {
            let otm_ratio = spot / long.strike;
            (
                now,
                (now * 0.70 * otm_ratio).max(MIN_HEURISTIC_VALUE),
                (now * 0.55 * otm_ratio).max(MIN_HEURISTIC_VALUE),
                now + spot * 0.10 * 0.45,
            )
        }
        None => {
            let t_long = (long.expiry - today).num_days() as f64 / DAYS_PER_YEAR;
            let [iv_now, iv_down_10, iv_down_15, iv_up_10] = config.long_call_ivs;
            let value = |price: f64, iv: f64| {
                BlackScholes::price(&OptionParams::call(price, long.strike, t_long, config.rate), iv)
            };
            (
                value(spot, iv_now),
                value(spot * 0.90, iv_down_10),
                value(spot * 0.85, iv_down_15),
                value(spot * 1.10, iv_up_10),
            )
        }
    };

    let scale = long.qty as f64 * CONTRACT_MULTIPLIER;
    UnprotectedRisk {
        long_value_now: now,
        loss_10: (now - down_10) * scale,
        loss_15: (now - down_15) * scale,
        gain_10: (up_10 - now) * scale,
    }
}

/// Market data for one PMCC position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollarInput {
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying price.
    pub spot: f64,
    /// The LEAPS leg.
    pub long_call: LongCall,
    /// Calls written against it.
    pub short_calls: Vec<ShortCall>,
    /// Next earnings release.
    pub earnings_date: Option<NaiveDate>,
    /// Listed expirations, ascending.
    pub expirations: Vec<NaiveDate>,
    /// Put chains keyed by expiration.
    pub put_chains: BTreeMap<NaiveDate, Vec<ChainRow>>,
    /// Quote for the long call.
    pub long_call_quote: Option<f64>,
    /// Daily closes, oldest first.
    pub closes: Vec<f64>,
}

/// Collar report for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollarAnalysis {
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying price.
    pub current_price: f64,
    /// LEAPS strike.
    pub long_strike: f64,
    /// LEAPS expiration.
    pub long_expiry: NaiveDate,
    /// LEAPS contracts.
    pub long_qty: i64,
    /// LEAPS average cost.
    pub long_cost: f64,
    /// LEAPS value per share now.
    pub long_value_now: f64,
    /// Short calls.
    pub short_positions: Vec<ShortCall>,
    /// Spot is within reach of the long strike.
    pub is_proper_pmcc: bool,
    /// Every short strike is at or above the long strike.
    pub short_above_long: bool,
    /// Next earnings release.
    pub earnings_date: Option<NaiveDate>,
    /// Days until earnings.
    pub days_to_earnings: Option<i64>,
    /// Put candidates.
    pub put_analysis: Vec<PutAnalysis>,
    /// Unprotected loss on a 10% drop.
    pub unprotected_loss_10: f64,
    /// Unprotected loss on a 15% drop.
    pub unprotected_loss_15: f64,
    /// Unprotected gain on a 10% rise.
    pub unprotected_gain_10: f64,
    /// Historical volatility, when enough closes were supplied.
    pub volatility: Option<VolatilityProfile>,
}

/// Runs the full collar analysis for one position.
#[must_use]
pub fn analyze_collar(
    input: &CollarInput,
    today: NaiveDate,
    config: &CollarConfig,
) -> CollarAnalysis {
    let spot = input.spot;
    let long = &input.long_call;

    let is_proper_pmcc = spot >= long.strike * config.healthy_strike_ratio;
    let short_above_long = input.short_calls.iter().all(|s| s.strike >= long.strike);
    let days_to_earnings = input.earnings_date.map(|date| (date - today).num_days());

    let expiries = select_put_expiries(&input.expirations, today, input.earnings_date, config);
    let strikes = put_strike_ladder(spot);
    debug!(
        "{}: {} put expiries, strikes {:?}",
        input.symbol,
        expiries.len(),
        strikes
    );

    let mut put_analysis = Vec::new();
    for expiry in expiries.iter().take(config.max_put_expiries) {
        let chain = input.put_chains.get(&expiry.expiry);
        for &strike in &strikes {
            let market_mid = chain
                .and_then(|rows| rows.iter().find(|row| row.strike == strike))
                .map(ChainRow::mid);
            put_analysis.push(analyze_put(spot, strike, expiry, market_mid, long.qty, config));
        }
    }

    let risk = unprotected_risk(spot, long, input.long_call_quote, today, config);

    CollarAnalysis {
        symbol: input.symbol.clone(),
        current_price: spot,
        long_strike: long.strike,
        long_expiry: long.expiry,
        long_qty: long.qty,
        long_cost: long.avg_cost,
        long_value_now: risk.long_value_now,
        short_positions: input.short_calls.clone(),
        is_proper_pmcc,
        short_above_long,
        earnings_date: input.earnings_date,
        days_to_earnings,
        put_analysis,
        unprotected_loss_10: risk.loss_10,
        unprotected_loss_15: risk.loss_15,
        unprotected_gain_10: risk.gain_10,
        volatility: VolatilityProfile::from_closes(&input.closes),
    }
}
