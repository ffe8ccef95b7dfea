use chrono::{Duration, NaiveDate};
use greeks_rs::analytics::{
    ChainRow, CollarConfig, CollarInput, DeltaExposureCalculator, ExpiryChoice, ExposureConfig,
    GreeksRequest, LongCall, PmccConfig, PmccInput, Position, SecurityType, ShortCall,
    analyze_collar, analyze_pmcc, calculate_greeks, rank_candidates, select_expiries,
};
use greeks_rs::pricing::{BlackScholes, OptionParams, OptionType};
use std::collections::{BTreeMap, HashMap};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Call chain quoted around Black-Scholes fair value with a fixed spread.
fn synthetic_chain(spot: f64, strikes: &[f64], days: i64, iv: f64, spread: f64) -> Vec<ChainRow> {
    strikes
        .iter()
        .map(|&strike| {
            let params = OptionParams::call(spot, strike, days as f64 / 365.0, 0.05);
            let fair = BlackScholes::price(&params, iv);
            ChainRow::new(strike, (fair - spread / 2.0).max(0.01), fair + spread / 2.0)
                .with_iv(iv)
                .with_activity(500, 2_000)
        })
        .collect()
}

#[test]
fn test_greeks_calculator_end_to_end() {
    let today = date(2025, 3, 3);
    let params = OptionParams::put(450.0, 440.0, 45.0 / 365.0, 0.05);
    let market_price = BlackScholes::price(&params, 0.27);

    let request = GreeksRequest::new(450.0, 440.0, "put".parse().unwrap())
        .with_expiry(today + Duration::days(45))
        .with_market_price(market_price);
    let report = calculate_greeks(&request, today).unwrap();

    assert_eq!(report.days_to_expiry, 45);
    assert!((report.iv - 27.0).abs() < 0.01);
    let greeks = report.greeks.greeks().unwrap();
    assert!(greeks.delta < 0.0 && greeks.delta > -0.5);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["expiry"], "2025-04-17");
    assert_eq!(json["option_type"], "put");
    assert!(json["greeks"]["gamma"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_portfolio_exposure() {
    let today = date(2025, 1, 2);
    let positions = vec![
        Position::stock("U1", "AAPL", 100.0, 150.0),
        Position::option(
            "U1",
            "AAPL",
            OptionType::Call,
            210.0,
            date(2025, 2, 21),
            -1.0,
        ),
        Position::future("U2", "ES", 1.0, 250_000.0, Some(50.0)),
        Position::stock("U2", "MSFT", -20.0, 400.0),
    ];
    let spot_prices = HashMap::from([("AAPL".to_string(), 200.0)]);

    let calculator = DeltaExposureCalculator::new(ExposureConfig::default());
    let report = calculator.calculate(&positions, &spot_prices, today);

    assert_eq!(report.position_count, 4);
    let order: Vec<SecurityType> = report.positions.iter().map(|r| r.sec_type).collect();
    assert_eq!(
        order,
        vec![
            SecurityType::Option,
            SecurityType::Future,
            SecurityType::Stock,
            SecurityType::Stock
        ]
    );

    let call = &report.positions[0];
    assert!(call.delta > 0.0 && call.delta < 0.5);
    assert!(call.delta_notional < 0.0);

    let future = &report.positions[1];
    assert_eq!(future.spot, 5_000.0);
    assert_eq!(future.delta_notional, 250_000.0);

    let summary = &report.summary;
    assert!(summary.total_short_delta_notional < 0.0);
    assert!(
        (summary.net_delta_notional
            - (summary.total_long_delta_notional + summary.total_short_delta_notional))
            .abs()
            < 0.011
    );
    assert_eq!(summary.by_account.len(), 2);
    assert_eq!(summary.by_underlying["MSFT"].net, -8_000.0);
    let aapl = summary.by_underlying["AAPL"];
    assert_eq!(aapl.long, 20_000.0);
    assert!(aapl.net < 20_000.0);
}

#[test]
fn test_pmcc_scan_and_rank() {
    let today = date(2025, 1, 6);
    let expirations = vec![
        date(2025, 1, 10),
        date(2025, 1, 17),
        date(2025, 2, 21),
        date(2026, 1, 16),
    ];
    let config = PmccConfig::default();
    let (leaps, short) = select_expiries(&expirations, today, &config).unwrap();
    assert_eq!(short.days, 11);
    assert_eq!(leaps.days, 375);

    let strikes: Vec<f64> = (14..=26).map(|i| i as f64 * 5.0).collect();
    let build = |symbol: &str, iv: f64, spread: f64| PmccInput {
        symbol: symbol.to_string(),
        spot: 100.0,
        leaps,
        leaps_chain: synthetic_chain(100.0, &strikes, leaps.days, iv, spread),
        short,
        short_chain: synthetic_chain(100.0, &strikes, short.days, iv, spread),
    };

    let mut results: Vec<_> = [
        build("WIDE", 0.35, 2.0),
        build("TIGHT", 0.35, 0.05),
        build("CALM", 0.12, 0.05),
    ]
    .iter()
    .map(|input| analyze_pmcc(input, &config).unwrap())
    .collect();

    for result in &results {
        assert!(result.short.strike > result.leaps.strike);
        assert!(result.leaps.strike <= 102.0);
        assert!((result.leaps.delta - 0.80).abs() < 0.1);
        assert!(result.metrics.capital_required > 0.0);
    }

    rank_candidates(&mut results);
    assert_eq!(results[0].symbol, "TIGHT");
    assert!(results[0].pmcc_score >= results[1].pmcc_score);
    assert!(results[1].pmcc_score >= results[2].pmcc_score);
}

#[test]
fn test_collar_protects_against_gap_down() {
    let today = date(2025, 4, 1);
    let earnings = date(2025, 4, 24);
    let expirations = vec![
        date(2025, 4, 17),
        date(2025, 4, 25),
        date(2025, 5, 16),
        date(2025, 6, 20),
        date(2025, 7, 18),
    ];

    let input = CollarInput {
        symbol: "NVDA".to_string(),
        spot: 110.0,
        long_call: LongCall {
            strike: 90.0,
            expiry: date(2026, 6, 18),
            qty: 2,
            avg_cost: 30.0,
        },
        short_calls: vec![ShortCall {
            strike: 120.0,
            expiry: date(2025, 4, 17),
            qty: 2,
        }],
        earnings_date: Some(earnings),
        expirations,
        put_chains: BTreeMap::new(),
        long_call_quote: None,
        closes: (0..40).map(|i| 100.0 + (i % 5) as f64).collect(),
    };
    let analysis = analyze_collar(&input, today, &CollarConfig::default());

    assert!(analysis.is_proper_pmcc);
    assert!(analysis.short_above_long);
    assert_eq!(analysis.days_to_earnings, Some(23));

    // 25 Apr, 16 May and 20 Jun fall within 60 days of earnings.
    assert_eq!(analysis.put_analysis.len(), 9);
    let strikes: Vec<f64> = analysis.put_analysis[..3].iter().map(|p| p.strike).collect();
    assert_eq!(strikes, vec![95.0, 100.0, 105.0]);

    for put in &analysis.put_analysis {
        let scenarios = &put.scenarios;
        assert!(scenarios.gap_down_15.put_pnl > scenarios.gap_up_10.put_pnl);
        assert!(scenarios.gap_down_15.put_value >= scenarios.gap_down_10.put_value);
        assert!(put.total_cost > 0.0);
    }

    assert!(analysis.unprotected_loss_15 > analysis.unprotected_loss_10);
    assert!(analysis.unprotected_loss_10 > 0.0);
    assert!(analysis.unprotected_gain_10 > 0.0);
    assert!(analysis.volatility.is_some());
}

#[test]
fn test_configs_load_from_json() {
    let config: PmccConfig = serde_json::from_str(
        &serde_json::to_string(&PmccConfig::default().with_min_leaps_days(365)).unwrap(),
    )
    .unwrap();
    assert_eq!(config.min_leaps_days, 365);

    let choice: ExpiryChoice =
        serde_json::from_str(r#"{"expiry":"2026-01-16","days":300}"#).unwrap();
    assert_eq!(choice.expiry, date(2026, 1, 16));

    let collar = CollarConfig::default().with_rate(0.04);
    let json = serde_json::to_value(&collar).unwrap();
    assert_eq!(json["rate"], 0.04);
    assert_eq!(json["max_put_expiries"], 4);
}
