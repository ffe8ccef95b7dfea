//! Poor man's covered call (PMCC) suitability analysis.
//!
//! A PMCC buys a deep in-the-money LEAPS call and sells short-dated
//! out-of-the-money calls against it. Given the two option chains this module
//! picks both strikes by Black-Scholes delta, derives the trade metrics and
//! scores how well the underlying suits the strategy.

use super::error::AnalysisError;
use crate::pricing::{BlackScholes, DAYS_PER_YEAR, OptionParams};
use crate::utils::{mean, round_to};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// One call quote from an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    /// Strike price.
    pub strike: f64,
    /// Best bid; rows without a positive bid are not tradeable.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
    /// Last traded price.
    pub last_price: Option<f64>,
    /// Implied volatility quoted by the data provider.
    pub implied_volatility: Option<f64>,
    /// Contracts traded today.
    pub volume: Option<u64>,
    /// Open interest.
    pub open_interest: Option<u64>,
}

impl ChainRow {
    /// Creates a row with only strike, bid and ask.
    #[must_use]
    pub fn new(strike: f64, bid: f64, ask: f64) -> Self {
        Self {
            strike,
            bid,
            ask,
            last_price: None,
            implied_volatility: None,
            volume: None,
            open_interest: None,
        }
    }

    /// Sets the quoted implied volatility.
    #[must_use]
    pub fn with_iv(mut self, iv: f64) -> Self {
        self.implied_volatility = Some(iv);
        self
    }

    /// Sets the last traded price.
    #[must_use]
    pub fn with_last_price(mut self, last_price: f64) -> Self {
        self.last_price = Some(last_price);
        self
    }

    /// Sets volume and open interest.
    #[must_use]
    pub fn with_activity(mut self, volume: u64, open_interest: u64) -> Self {
        self.volume = Some(volume);
        self.open_interest = Some(open_interest);
        self
    }

    /// Midpoint of bid and ask.
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Mid when both sides are quoted, else a positive last price.
    #[must_use]
    pub fn market_price(&self) -> Option<f64> {
        if self.bid > 0.0 && self.ask > 0.0 {
            Some(self.mid())
        } else {
            self.last_price.filter(|price| *price > 0.0)
        }
    }

    /// Bid-ask spread as a percentage of mid; 100 when mid is not positive.
    #[must_use]
    pub fn spread_pct(&self) -> f64 {
        let mid = self.mid();
        if mid > 0.0 {
            (self.ask - self.bid) / mid * 100.0
        } else {
            100.0
        }
    }

    /// Volume plus open interest.
    #[must_use]
    pub fn liquidity(&self) -> u64 {
        self.volume.unwrap_or(0) + self.open_interest.unwrap_or(0)
    }

    fn has_bid(&self) -> bool {
        !self.bid.is_nan() && self.bid > 0.0
    }

    fn usable_iv(&self) -> Option<f64> {
        self.implied_volatility.filter(|iv| !iv.is_nan() && *iv > 0.0)
    }
}

/// Strike chosen by [`find_strike_by_delta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaMatch {
    /// Matching chain row.
    pub row: ChainRow,
    /// Black-Scholes call delta of that row.
    pub delta: f64,
}

/// Finds the call whose delta is closest to `target_delta`.
///
/// Rows without a positive bid or outside `[min_strike, max_strike]` are
/// skipped. Each row is priced with its own quoted IV when positive, else
/// with `fallback_iv`. The first row wins ties.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn find_strike_by_delta(
    chain: &[ChainRow],
    spot: f64,
    target_delta: f64,
    expiry_days: i64,
    fallback_iv: f64,
    rate: f64,
    min_strike: Option<f64>,
    max_strike: Option<f64>,
) -> Option<DeltaMatch> {
    let time_to_expiry = expiry_days as f64 / DAYS_PER_YEAR;
    let mut best: Option<DeltaMatch> = None;
    let mut best_diff = f64::INFINITY;

    for row in chain {
        if !row.has_bid() {
            continue;
        }
        if min_strike.is_some_and(|min| row.strike < min)
            || max_strike.is_some_and(|max| row.strike > max)
        {
            continue;
        }

        let iv = row.usable_iv().unwrap_or(fallback_iv);
        let params = OptionParams::call(spot, row.strike, time_to_expiry, rate);
        let delta = BlackScholes::delta(&params, iv);
        let diff = (delta - target_delta).abs();
        trace!("strike {} delta {:.4} (target {})", row.strike, delta, target_delta);

        if diff < best_diff {
            best_diff = diff;
            best = Some(DeltaMatch {
                row: row.clone(),
                delta,
            });
        }
    }

    best
}

/// Tunables for [`analyze_pmcc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmccConfig {
    /// Minimum days to expiry for the LEAPS leg.
    pub min_leaps_days: i64,
    /// Preferred short-leg window (inclusive).
    pub short_days_range: (i64, i64),
    /// Wider short-leg window tried when the preferred one is empty.
    pub fallback_short_days_range: (i64, i64),
    /// Target LEAPS delta.
    pub leaps_delta: f64,
    /// Target short call delta.
    pub short_delta: f64,
    /// Risk-free rate.
    pub rate: f64,
    /// IV used when no at-the-money quotes carry one.
    pub default_iv: f64,
    /// Half-width of the at-the-money band, as a fraction of spot.
    pub atm_band: f64,
    /// LEAPS strikes above `spot * leaps_max_strike_ratio` are ignored.
    pub leaps_max_strike_ratio: f64,
    /// Gap between LEAPS strike and the lowest allowed short strike.
    pub min_strike_gap: f64,
}

impl Default for PmccConfig {
    fn default() -> Self {
        Self {
            min_leaps_days: 270,
            short_days_range: (7, 21),
            fallback_short_days_range: (5, 30),
            leaps_delta: 0.80,
            short_delta: 0.20,
            rate: 0.05,
            default_iv: 0.30,
            atm_band: 0.05,
            leaps_max_strike_ratio: 1.02,
            min_strike_gap: 0.01,
        }
    }
}

impl PmccConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum LEAPS days.
    #[must_use]
    pub fn with_min_leaps_days(mut self, days: i64) -> Self {
        self.min_leaps_days = days;
        self
    }

    /// Sets the delta targets.
    #[must_use]
    pub fn with_deltas(mut self, leaps_delta: f64, short_delta: f64) -> Self {
        self.leaps_delta = leaps_delta;
        self.short_delta = short_delta;
        self
    }
}

/// An expiration date and its distance from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryChoice {
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Days from today.
    pub days: i64,
}

/// Picks the LEAPS and short-leg expirations.
///
/// `expirations` must be in ascending order, as option chains list them.
///
/// # Errors
/// - [`AnalysisError::NoLeapsExpiry`] when nothing reaches `min_leaps_days`
/// - [`AnalysisError::NoShortExpiry`] when neither short window matches
pub fn select_expiries(
    expirations: &[NaiveDate],
    today: NaiveDate,
    config: &PmccConfig,
) -> Result<(ExpiryChoice, ExpiryChoice), AnalysisError> {
    let choices: Vec<ExpiryChoice> = expirations
        .iter()
        .map(|&expiry| ExpiryChoice {
            expiry,
            days: (expiry - today).num_days(),
        })
        .collect();

    let leaps = choices
        .iter()
        .find(|c| c.days >= config.min_leaps_days)
        .copied()
        .ok_or(AnalysisError::NoLeapsExpiry {
            min_days: config.min_leaps_days,
        })?;

    let in_window = |(low, high): (i64, i64)| {
        choices
            .iter()
            .find(|c| (low..=high).contains(&c.days))
            .copied()
    };
    let short = in_window(config.short_days_range)
        .or_else(|| in_window(config.fallback_short_days_range))
        .ok_or(AnalysisError::NoShortExpiry)?;

    Ok((leaps, short))
}

/// Mean quoted IV of strikes within `band` of spot; `default_iv` when none.
#[must_use]
pub fn atm_iv(chain: &[ChainRow], spot: f64, band: f64, default_iv: f64) -> f64 {
    let low = spot * (1.0 - band);
    let high = spot * (1.0 + band);
    mean(
        chain
            .iter()
            .filter(|row| row.strike >= low && row.strike <= high)
            .filter_map(|row| row.implied_volatility.filter(|iv| !iv.is_nan())),
    )
    .unwrap_or(default_iv)
}

/// Inputs the score is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    /// Achieved LEAPS delta.
    pub leaps_delta: f64,
    /// Achieved short delta.
    pub short_delta: f64,
    /// LEAPS volume plus open interest.
    pub leaps_liquidity: u64,
    /// Short call volume plus open interest.
    pub short_liquidity: u64,
    /// LEAPS bid-ask spread in percent.
    pub leaps_spread_pct: f64,
    /// Short call bid-ask spread in percent.
    pub short_spread_pct: f64,
    /// At-the-money IV.
    pub iv: f64,
    /// Annualized short premium yield in percent.
    pub annual_yield_pct: f64,
}

impl ScoreInputs {
    /// PMCC suitability score, 0 to 11.
    ///
    /// Points: LEAPS delta accuracy (2), short delta accuracy (1), LEAPS
    /// liquidity (1), short liquidity (1), LEAPS spread (1), short spread (1),
    /// IV band (2), yield (2).
    #[must_use]
    pub fn score(&self, config: &PmccConfig) -> f64 {
        let within = |actual: f64, target: f64, band: f64| {
            target - band <= actual && actual <= target + band
        };
        let mut score = 0.0;

        if within(self.leaps_delta, config.leaps_delta, 0.05) {
            score += 2.0;
        } else if within(self.leaps_delta, config.leaps_delta, 0.10) {
            score += 1.0;
        }

        if within(self.short_delta, config.short_delta, 0.05) {
            score += 1.0;
        } else if within(self.short_delta, config.short_delta, 0.10) {
            score += 0.5;
        }

        if self.leaps_liquidity > 100 {
            score += 1.0;
        } else if self.leaps_liquidity > 20 {
            score += 0.5;
        }

        if self.short_liquidity > 500 {
            score += 1.0;
        } else if self.short_liquidity > 100 {
            score += 0.5;
        }

        if self.leaps_spread_pct < 5.0 {
            score += 1.0;
        } else if self.leaps_spread_pct < 10.0 {
            score += 0.5;
        }

        if self.short_spread_pct < 10.0 {
            score += 1.0;
        } else if self.short_spread_pct < 20.0 {
            score += 0.5;
        }

        if (0.25..=0.50).contains(&self.iv) {
            score += 2.0;
        } else if (0.20..=0.60).contains(&self.iv) {
            score += 1.0;
        }

        if self.annual_yield_pct > 50.0 {
            score += 2.0;
        } else if self.annual_yield_pct > 30.0 {
            score += 1.0;
        } else if self.annual_yield_pct > 15.0 {
            score += 0.5;
        }

        score
    }
}

/// Market data needed to analyze one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmccInput {
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying price.
    pub spot: f64,
    /// LEAPS expiration.
    pub leaps: ExpiryChoice,
    /// Calls for the LEAPS expiration.
    pub leaps_chain: Vec<ChainRow>,
    /// Short-leg expiration.
    pub short: ExpiryChoice,
    /// Calls for the short-leg expiration.
    pub short_chain: Vec<ChainRow>,
}

/// One leg of the proposed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Days to expiration.
    pub days: i64,
    /// Strike.
    pub strike: f64,
    /// Black-Scholes delta (3 decimals).
    pub delta: f64,
    /// Bid.
    pub bid: f64,
    /// Ask.
    pub ask: f64,
    /// Mid.
    pub mid: f64,
    /// Bid-ask spread in percent of mid (1 decimal).
    pub spread_pct: f64,
    /// Volume.
    pub volume: u64,
    /// Open interest.
    pub oi: u64,
    /// Intrinsic value, LEAPS leg only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intrinsic: Option<f64>,
    /// Extrinsic value, LEAPS leg only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrinsic: Option<f64>,
}

impl LegSummary {
    fn from_match(choice: ExpiryChoice, matched: &DeltaMatch) -> Self {
        let row = &matched.row;
        Self {
            expiry: choice.expiry,
            days: choice.days,
            strike: row.strike,
            delta: round_to(matched.delta, 3),
            bid: round_to(row.bid, 2),
            ask: round_to(row.ask, 2),
            mid: round_to(row.mid(), 2),
            spread_pct: round_to(row.spread_pct(), 1),
            volume: row.volume.unwrap_or(0),
            oi: row.open_interest.unwrap_or(0),
            intrinsic: None,
            extrinsic: None,
        }
    }
}

/// Trade economics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmccMetrics {
    /// LEAPS mid minus short mid.
    pub net_debit: f64,
    /// Short premium as a percentage of the LEAPS cost.
    pub short_yield_pct: f64,
    /// `short_yield_pct` annualized over the short leg's days.
    pub annual_yield_est_pct: f64,
    /// LEAPS value at short expiry with spot at the short strike, plus the
    /// short premium, minus the LEAPS cost.
    pub max_profit: f64,
    /// `max_profit` as a percentage of the LEAPS cost.
    pub roi_pct: f64,
    /// Cost of one LEAPS contract.
    pub capital_required: f64,
}

/// PMCC analysis for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmccAnalysis {
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying price.
    pub price: f64,
    /// At-the-money IV in percent.
    pub iv_pct: f64,
    /// Suitability score.
    pub pmcc_score: f64,
    /// LEAPS leg.
    pub leaps: LegSummary,
    /// Short leg.
    pub short: LegSummary,
    /// Trade economics.
    pub metrics: PmccMetrics,
}

/// Analyzes one symbol for PMCC suitability.
///
/// # Errors
/// - [`AnalysisError::NoLeapsStrike`] when no LEAPS call has a bid
/// - [`AnalysisError::NoShortStrike`] when no short call above the LEAPS
///   strike has a bid
pub fn analyze_pmcc(input: &PmccInput, config: &PmccConfig) -> Result<PmccAnalysis, AnalysisError> {
    let spot = input.spot;
    let avg_iv = atm_iv(&input.leaps_chain, spot, config.atm_band, config.default_iv);

    let leaps = find_strike_by_delta(
        &input.leaps_chain,
        spot,
        config.leaps_delta,
        input.leaps.days,
        avg_iv,
        config.rate,
        None,
        Some(spot * config.leaps_max_strike_ratio),
    )
    .ok_or(AnalysisError::NoLeapsStrike {
        target_delta: config.leaps_delta,
    })?;

    let short = find_strike_by_delta(
        &input.short_chain,
        spot,
        config.short_delta,
        input.short.days,
        avg_iv,
        config.rate,
        Some(leaps.row.strike + config.min_strike_gap),
        None,
    )
    .ok_or(AnalysisError::NoShortStrike {
        leaps_strike: leaps.row.strike,
    })?;

    let leaps_mid = leaps.row.mid();
    let short_mid = short.row.mid();

    let leaps_intrinsic = (spot - leaps.row.strike).max(0.0);
    let leaps_extrinsic = leaps_mid - leaps_intrinsic;

    let short_yield = if leaps_mid > 0.0 {
        short_mid / leaps_mid * 100.0
    } else {
        0.0
    };
    let annual_yield = if input.short.days > 0 {
        short_yield * (DAYS_PER_YEAR / input.short.days as f64)
    } else {
        0.0
    };

    let remaining = (input.leaps.days - input.short.days) as f64 / DAYS_PER_YEAR;
    let leaps_at_short_expiry = BlackScholes::price(
        &OptionParams::call(short.row.strike, leaps.row.strike, remaining, config.rate),
        avg_iv,
    );
    let max_profit = leaps_at_short_expiry + short_mid - leaps_mid;
    let roi = if leaps_mid > 0.0 {
        max_profit / leaps_mid * 100.0
    } else {
        0.0
    };

    let score = ScoreInputs {
        leaps_delta: leaps.delta,
        short_delta: short.delta,
        leaps_liquidity: leaps.row.liquidity(),
        short_liquidity: short.row.liquidity(),
        leaps_spread_pct: leaps.row.spread_pct(),
        short_spread_pct: short.row.spread_pct(),
        iv: avg_iv,
        annual_yield_pct: annual_yield,
    }
    .score(config);
    debug!(
        "{}: leaps {} / short {} scored {}",
        input.symbol, leaps.row.strike, short.row.strike, score
    );

    let mut leaps_leg = LegSummary::from_match(input.leaps, &leaps);
    leaps_leg.intrinsic = Some(round_to(leaps_intrinsic, 2));
    leaps_leg.extrinsic = Some(round_to(leaps_extrinsic, 2));

    Ok(PmccAnalysis {
        symbol: input.symbol.clone(),
        price: round_to(spot, 2),
        iv_pct: round_to(avg_iv * 100.0, 1),
        pmcc_score: round_to(score, 1),
        leaps: leaps_leg,
        short: LegSummary::from_match(input.short, &short),
        metrics: PmccMetrics {
            net_debit: round_to(leaps_mid - short_mid, 2),
            short_yield_pct: round_to(short_yield, 2),
            annual_yield_est_pct: round_to(annual_yield, 1),
            max_profit: round_to(max_profit, 2),
            roi_pct: round_to(roi, 1),
            capital_required: round_to(leaps_mid * 100.0, 2),
        },
    })
}

/// Sorts candidates best first: by score, then by annualized yield.
pub fn rank_candidates(candidates: &mut [PmccAnalysis]) {
    candidates.sort_by(|a, b| {
        b.pmcc_score
            .partial_cmp(&a.pmcc_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.metrics
                    .annual_yield_est_pct
                    .partial_cmp(&a.metrics.annual_yield_est_pct)
                    .unwrap_or(Ordering::Equal)
            })
    });
}
