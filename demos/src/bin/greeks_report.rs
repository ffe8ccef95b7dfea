//! Prints a Greeks report, a small portfolio exposure and a collar check as JSON.
//!
//! Usage: `greeks_report [spot strike dte call|put [market_price]]`

use chrono::{Duration, Local, NaiveDate};
use greeks_rs::analytics::{
    CollarConfig, CollarInput, ExposureReport, GreeksReport, LongCall, Position, ShortCall,
};
use greeks_rs::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

#[derive(Serialize)]
struct DemoOutput {
    as_of: NaiveDate,
    greeks: GreeksReport,
    exposure: ExposureReport,
    collar_put_count: usize,
    unprotected_loss_10: f64,
}

fn request_from_args(args: &[String]) -> Result<GreeksRequest, Box<dyn std::error::Error>> {
    if args.len() < 4 {
        warn!("expected `spot strike dte call|put`, using a sample ATM call");
        return Ok(GreeksRequest::new(100.0, 100.0, OptionType::Call).with_dte(30));
    }

    let spot: f64 = args[0].parse()?;
    let strike: f64 = args[1].parse()?;
    let dte: i64 = args[2].parse()?;
    let option_type: OptionType = args[3].parse()?;

    let mut request = GreeksRequest::new(spot, strike, option_type).with_dte(dte);
    if let Some(price) = args.get(4) {
        request = request.with_market_price(price.parse()?);
    }
    Ok(request)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let today = Local::now().date_naive();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let request = request_from_args(&args)?;
    let greeks = calculate_greeks(&request, today)?;
    info!(
        "{} {} with {} days: iv {}%",
        greeks.option_type, greeks.strike, greeks.days_to_expiry, greeks.iv
    );

    let positions = vec![
        Position::stock("DEMO", "SPY", 100.0, 440.0),
        Position::option(
            "DEMO",
            "SPY",
            OptionType::Put,
            420.0,
            today + Duration::days(45),
            2.0,
        ),
        Position::future("DEMO", "ES", -1.0, 250_000.0, Some(50.0)),
    ];
    let spot_prices = HashMap::from([("SPY".to_string(), 450.0)]);
    let exposure = DeltaExposureCalculator::new(ExposureConfig::default()).calculate(
        &positions,
        &spot_prices,
        today,
    );
    info!(
        "net delta notional {}",
        exposure.summary.net_delta_notional
    );

    let collar = analyze_collar(
        &CollarInput {
            symbol: "SPY".to_string(),
            spot: 450.0,
            long_call: LongCall {
                strike: 400.0,
                expiry: today + Duration::days(400),
                qty: 1,
                avg_cost: 70.0,
            },
            short_calls: vec![ShortCall {
                strike: 470.0,
                expiry: today + Duration::days(14),
                qty: 1,
            }],
            earnings_date: None,
            expirations: (1..=8).map(|week| today + Duration::days(7 * week)).collect(),
            put_chains: BTreeMap::new(),
            long_call_quote: None,
            closes: Vec::new(),
        },
        today,
        &CollarConfig::default(),
    );
    info!(
        "collar: {} put candidates, unprotected loss on -10% {:.2}",
        collar.put_analysis.len(),
        collar.unprotected_loss_10
    );

    let output = DemoOutput {
        as_of: today,
        greeks,
        exposure,
        collar_put_count: collar.put_analysis.len(),
        unprotected_loss_10: collar.unprotected_loss_10,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
