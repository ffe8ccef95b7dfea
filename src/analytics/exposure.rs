//! Delta-adjusted notional exposure across broker positions.
//!
//! Each position is converted to `delta * spot * quantity * multiplier`.
//! Equity options get their delta from Black-Scholes with a moneyness-based
//! volatility estimate; futures options use a flat index volatility and a
//! reference level for the future; futures and stock count with delta 1.

use crate::pricing::{BlackScholes, DAYS_PER_YEAR, OptionParams, OptionType, estimate_iv};
use crate::utils::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Security type of a broker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    /// Common stock.
    #[serde(rename = "STK")]
    Stock,
    /// Equity option.
    #[serde(rename = "OPT")]
    Option,
    /// Option on a future.
    #[serde(rename = "FOP")]
    FutureOption,
    /// Future.
    #[serde(rename = "FUT")]
    Future,
}

/// A position as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Account identifier.
    pub account: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Security type.
    pub sec_type: SecurityType,
    /// Signed quantity (negative for short).
    pub quantity: f64,
    /// Average cost per unit as reported by the broker.
    pub avg_cost: f64,
    /// Strike, for options.
    pub strike: Option<f64>,
    /// Expiration, for options.
    pub expiry: Option<NaiveDate>,
    /// Call or put, for options.
    pub right: Option<OptionType>,
    /// Contract multiplier; a per-type default applies when absent.
    pub multiplier: Option<f64>,
}

impl Position {
    /// Stock position.
    #[must_use]
    pub fn stock(account: &str, symbol: &str, quantity: f64, avg_cost: f64) -> Self {
        Self {
            account: account.to_string(),
            symbol: symbol.to_string(),
            sec_type: SecurityType::Stock,
            quantity,
            avg_cost,
            strike: None,
            expiry: None,
            right: None,
            multiplier: None,
        }
    }

    /// Future position.
    #[must_use]
    pub fn future(
        account: &str,
        symbol: &str,
        quantity: f64,
        avg_cost: f64,
        multiplier: Option<f64>,
    ) -> Self {
        Self {
            sec_type: SecurityType::Future,
            multiplier,
            ..Self::stock(account, symbol, quantity, avg_cost)
        }
    }

    /// Equity option position.
    #[must_use]
    pub fn option(
        account: &str,
        symbol: &str,
        right: OptionType,
        strike: f64,
        expiry: NaiveDate,
        quantity: f64,
    ) -> Self {
        Self {
            sec_type: SecurityType::Option,
            strike: Some(strike),
            expiry: Some(expiry),
            right: Some(right),
            ..Self::stock(account, symbol, quantity, 0.0)
        }
    }

    /// Futures option position.
    #[must_use]
    pub fn future_option(
        account: &str,
        symbol: &str,
        right: OptionType,
        strike: f64,
        expiry: NaiveDate,
        quantity: f64,
    ) -> Self {
        Self {
            sec_type: SecurityType::FutureOption,
            ..Self::option(account, symbol, right, strike, expiry, quantity)
        }
    }

    /// Sets the contract multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }
}

/// Tunables for [`DeltaExposureCalculator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Risk-free rate for option deltas.
    pub rate: f64,
    /// Flat volatility for futures options.
    pub futures_option_iv: f64,
    /// Floor on time to expiry in years, so expiring options keep a delta.
    pub min_time_to_expiry: f64,
    /// Spot used for an equity option when no quote is available, as a
    /// fraction of its strike.
    pub missing_spot_strike_ratio: f64,
    /// Multiplier for equity options without one.
    pub option_multiplier: f64,
    /// Multiplier for futures and futures options without one.
    pub futures_multiplier: f64,
    /// Reference level per futures root, used as the underlying of
    /// futures options.
    pub futures_reference: BTreeMap<String, f64>,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        let futures_reference = [("NQ".to_string(), 21_500.0), ("ES".to_string(), 5_000.0)]
            .into_iter()
            .collect();
        Self {
            rate: 0.05,
            futures_option_iv: 0.20,
            min_time_to_expiry: 0.001,
            missing_spot_strike_ratio: 0.95,
            option_multiplier: 100.0,
            futures_multiplier: 20.0,
            futures_reference,
        }
    }
}

impl ExposureConfig {
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

    /// Sets the reference level for a futures root.
    #[must_use]
    pub fn with_futures_reference(mut self, symbol: &str, level: f64) -> Self {
        self.futures_reference.insert(symbol.to_string(), level);
        self
    }
}

/// Exposure of one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionExposure {
    /// Account identifier.
    pub account: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Security type.
    pub sec_type: SecurityType,
    /// Strike, for options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    /// Expiration, for options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    /// Call or put, for options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<OptionType>,
    /// Signed quantity.
    pub qty: f64,
    /// Underlying price used.
    pub spot: f64,
    /// Delta used (1 for stock and futures).
    pub delta: f64,
    /// Contract multiplier used.
    pub multiplier: f64,
    /// `spot * qty * multiplier`.
    pub raw_notional: f64,
    /// `delta * spot * qty * multiplier`.
    pub delta_notional: f64,
}

/// Long and short exposure of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideTotals {
    /// Sum of positive delta notionals.
    pub long: f64,
    /// Sum of non-positive delta notionals.
    pub short: f64,
}

/// Long, short and net exposure of one underlying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetTotals {
    /// Sum of positive delta notionals.
    pub long: f64,
    /// Sum of non-positive delta notionals.
    pub short: f64,
    /// `long + short`.
    pub net: f64,
}

/// Portfolio-level aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureSummary {
    /// Sum of positive delta notionals.
    pub total_long_delta_notional: f64,
    /// Sum of negative delta notionals.
    pub total_short_delta_notional: f64,
    /// Long plus short.
    pub net_delta_notional: f64,
    /// Per-account totals.
    pub by_account: BTreeMap<String, SideTotals>,
    /// Per-underlying totals.
    pub by_underlying: BTreeMap<String, NetTotals>,
}

/// Full exposure report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    /// Number of positions that produced a row.
    pub position_count: usize,
    /// Per-position rows, options first, then futures options, futures and
    /// stock.
    pub positions: Vec<PositionExposure>,
    /// Aggregates.
    pub summary: ExposureSummary,
}

/// Computes delta-adjusted notional exposure for a set of positions.
#[derive(Debug, Clone, Default)]
pub struct DeltaExposureCalculator {
    config: ExposureConfig,
}

impl DeltaExposureCalculator {
    /// Creates a calculator with the given configuration.
    #[must_use]
    pub fn new(config: ExposureConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    /// Builds the exposure report.
    ///
    /// # Arguments
    /// - `positions`: Broker positions, any order
    /// - `spot_prices`: Last price per underlying symbol
    /// - `today`: Date used to compute days to expiry
    #[must_use]
    pub fn calculate(
        &self,
        positions: &[Position],
        spot_prices: &HashMap<String, f64>,
        today: NaiveDate,
    ) -> ExposureReport {
        let mut rows = Vec::with_capacity(positions.len());

        for sec_type in [
            SecurityType::Option,
            SecurityType::FutureOption,
            SecurityType::Future,
            SecurityType::Stock,
        ] {
            for position in positions.iter().filter(|p| p.sec_type == sec_type) {
                let row = match sec_type {
                    SecurityType::Option | SecurityType::FutureOption => {
                        self.option_exposure(position, spot_prices, today)
                    }
                    SecurityType::Future => Some(self.future_exposure(position)),
                    SecurityType::Stock => Some(Self::stock_exposure(position, spot_prices)),
                };
                if let Some(row) = row {
                    rows.push(row);
                }
            }
        }

        let summary = summarize(&rows);
        debug!(
            "exposure over {} positions: net {}",
            rows.len(),
            summary.net_delta_notional
        );

        ExposureReport {
            position_count: rows.len(),
            positions: rows,
            summary,
        }
    }

    fn option_exposure(
        &self,
        position: &Position,
        spot_prices: &HashMap<String, f64>,
        today: NaiveDate,
    ) -> Option<PositionExposure> {
        let (Some(strike), Some(expiry), Some(right)) =
            (position.strike, position.expiry, position.right)
        else {
            warn!(
                "skipping {} option position in {} without strike, expiry or right",
                position.symbol, position.account
            );
            return None;
        };

        let dte = (expiry - today).num_days();
        let time_to_expiry = (dte as f64 / DAYS_PER_YEAR).max(self.config.min_time_to_expiry);

        let (spot, iv, multiplier) = if position.sec_type == SecurityType::FutureOption {
            let spot = self
                .config
                .futures_reference
                .get(&position.symbol)
                .copied()
                .unwrap_or(strike);
            let multiplier = position
                .multiplier
                .unwrap_or(self.config.futures_multiplier);
            (spot, self.config.futures_option_iv, multiplier)
        } else {
            let spot = match spot_prices.get(&position.symbol) {
                Some(price) if *price > 0.0 => *price,
                _ => {
                    debug!("no quote for {}, estimating spot from strike", position.symbol);
                    strike * self.config.missing_spot_strike_ratio
                }
            };
            let iv = estimate_iv(spot, strike, time_to_expiry, right);
            let multiplier = position.multiplier.unwrap_or(self.config.option_multiplier);
            (spot, iv, multiplier)
        };

        let params = OptionParams::new(spot, strike, time_to_expiry, self.config.rate, right);
        let delta = BlackScholes::delta(&params, iv);

        Some(PositionExposure {
            account: position.account.clone(),
            symbol: position.symbol.clone(),
            sec_type: position.sec_type,
            strike: Some(strike),
            expiry: Some(expiry),
            right: Some(right),
            qty: position.quantity,
            spot: round_to(spot, 2),
            delta: round_to(delta, 4),
            multiplier,
            raw_notional: round_to(spot * position.quantity * multiplier, 2),
            delta_notional: round_to(delta * spot * position.quantity * multiplier, 2),
        })
    }

    fn future_exposure(&self, position: &Position) -> PositionExposure {
        let multiplier = position
            .multiplier
            .unwrap_or(self.config.futures_multiplier);
        let spot = if multiplier != 0.0 {
            position.avg_cost / multiplier
        } else {
            position.avg_cost
        };
        let notional = round_to(spot * position.quantity * multiplier, 2);

        PositionExposure {
            account: position.account.clone(),
            symbol: position.symbol.clone(),
            sec_type: SecurityType::Future,
            strike: None,
            expiry: None,
            right: None,
            qty: position.quantity,
            spot: round_to(spot, 2),
            delta: 1.0,
            multiplier,
            raw_notional: notional,
            delta_notional: notional,
        }
    }

    fn stock_exposure(position: &Position, spot_prices: &HashMap<String, f64>) -> PositionExposure {
        let spot = spot_prices
            .get(&position.symbol)
            .copied()
            .unwrap_or(position.avg_cost);
        let notional = round_to(spot * position.quantity, 2);

        PositionExposure {
            account: position.account.clone(),
            symbol: position.symbol.clone(),
            sec_type: SecurityType::Stock,
            strike: None,
            expiry: None,
            right: None,
            qty: position.quantity,
            spot: round_to(spot, 2),
            delta: 1.0,
            multiplier: 1.0,
            raw_notional: notional,
            delta_notional: notional,
        }
    }
}

/// Aggregates position rows into portfolio, account and underlying totals.
#[must_use]
pub fn summarize(rows: &[PositionExposure]) -> ExposureSummary {
    let mut total_long = 0.0;
    let mut total_short = 0.0;
    let mut by_account: BTreeMap<String, SideTotals> = BTreeMap::new();
    let mut by_underlying: BTreeMap<String, NetTotals> = BTreeMap::new();

    for row in rows {
        let notional = row.delta_notional;
        if notional > 0.0 {
            total_long += notional;
        } else if notional < 0.0 {
            total_short += notional;
        }

        let account = by_account.entry(row.account.clone()).or_default();
        let underlying = by_underlying.entry(row.symbol.clone()).or_default();
        if notional > 0.0 {
            account.long += notional;
            underlying.long += notional;
        } else {
            account.short += notional;
            underlying.short += notional;
        }
    }

    for totals in by_account.values_mut() {
        totals.long = round_to(totals.long, 2);
        totals.short = round_to(totals.short, 2);
    }
    for totals in by_underlying.values_mut() {
        totals.net = round_to(totals.long + totals.short, 2);
        totals.long = round_to(totals.long, 2);
        totals.short = round_to(totals.short, 2);
    }

    ExposureSummary {
        total_long_delta_notional: round_to(total_long, 2),
        total_short_delta_notional: round_to(total_short, 2),
        net_delta_notional: round_to(total_long + total_short, 2),
        by_account,
        by_underlying,
    }
}
