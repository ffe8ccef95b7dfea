//! Position and strategy analytics built on the pricing engine.
//!
//! Every function here takes market data that has already been fetched
//! (chains, positions, spot prices, calendar dates) and returns serializable
//! reports. Nothing in this module performs I/O.

/// Delta-adjusted notional exposure over broker positions.
pub mod exposure;
/// Greeks for a single option given dates and an optional market price.
pub mod greeks_calculator;
pub mod pmcc;

pub mod collar;
mod error;

pub use collar::{
    CollarAnalysis, CollarConfig, CollarInput, LongCall, PutAnalysis, PutExpiry, Scenario,
    Scenarios, ShortCall, UnprotectedRisk, VolatilityClass, VolatilityProfile, analyze_collar, analyze_put,
    put_strike_ladder, select_put_expiries, unprotected_risk,
};
pub use error::AnalysisError;
pub use exposure::{
    DeltaExposureCalculator, ExposureConfig, ExposureReport, ExposureSummary, NetTotals,
    Position, PositionExposure, SecurityType, SideTotals, summarize,
};
pub use greeks_calculator::{GreeksOutput, GreeksReport, GreeksRequest, calculate_greeks};
pub use pmcc::{
    ChainRow, DeltaMatch, ExpiryChoice, LegSummary, PmccAnalysis, PmccConfig, PmccInput,
    PmccMetrics, ScoreInputs, analyze_pmcc, atm_iv, find_strike_by_delta, rank_candidates, select_expiries,
};
