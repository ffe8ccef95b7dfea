use greeks_rs::pricing::{
    BASE_IV, BlackScholes, MAX_VOLATILITY, MIN_VOLATILITY, OptionParams, OptionType,
    PricingError, SolverConfig, SolverMethod, bisection, estimate_iv, implied_volatility,
    solve_iv,
};

const TOLERANCE: f64 = 1e-6;

const SPOTS: [f64; 3] = [80.0, 100.0, 120.0];
const STRIKES: [f64; 3] = [90.0, 100.0, 110.0];
const TIMES: [f64; 3] = [0.1, 0.5, 2.0];
const RATES: [f64; 2] = [0.0, 0.05];
const VOLS: [f64; 3] = [0.1, 0.3, 0.8];

fn grid() -> impl Iterator<Item = (f64, f64, f64, f64, f64)> {
    SPOTS.into_iter().flat_map(|s| {
        STRIKES.into_iter().flat_map(move |k| {
            TIMES.into_iter().flat_map(move |t| {
                RATES
                    .into_iter()
                    .flat_map(move |r| VOLS.into_iter().map(move |v| (s, k, t, r, v)))
            })
        })
    })
}

#[test]
fn test_put_call_parity() {
    for (s, k, t, r, v) in grid() {
        let call = BlackScholes::price(&OptionParams::call(s, k, t, r), v);
        let put = BlackScholes::price(&OptionParams::put(s, k, t, r), v);
        let forward = s - k * (-r * t).exp();
        assert!(
            (call - put - forward).abs() < TOLERANCE,
            "parity broken for S={s} K={k} T={t} r={r} vol={v}"
        );
    }
}

#[test]
fn test_boundary_consistency() {
    for s in SPOTS {
        for k in STRIKES {
            let call = OptionParams::call(s, k, 0.0, 0.05);
            let put = OptionParams::put(s, k, 0.0, 0.05);
            assert_eq!(BlackScholes::price(&call, 0.2), (s - k).max(0.0));
            assert_eq!(BlackScholes::price(&put, 0.2), (k - s).max(0.0));

            let call = OptionParams::call(s, k, 1.0, 0.05);
            let put = OptionParams::put(s, k, 1.0, 0.05);
            assert_eq!(BlackScholes::price(&call, 0.0), (s - k).max(0.0));
            assert_eq!(BlackScholes::price(&put, 0.0), (k - s).max(0.0));
        }
    }
}

#[test]
fn test_delta_bounds() {
    for (s, k, t, r, v) in grid() {
        let call = BlackScholes::delta(&OptionParams::call(s, k, t, r), v);
        let put = BlackScholes::delta(&OptionParams::put(s, k, t, r), v);
        assert!((0.0..=1.0).contains(&call));
        assert!((-1.0..=0.0).contains(&put));
    }
}

#[test]
fn test_expired_delta_is_a_step() {
    assert_eq!(BlackScholes::delta(&OptionParams::call(105.0, 100.0, 0.0, 0.05), 0.2), 1.0);
    assert_eq!(BlackScholes::delta(&OptionParams::call(95.0, 100.0, 0.0, 0.05), 0.2), 0.0);
    assert_eq!(BlackScholes::delta(&OptionParams::put(95.0, 100.0, 0.0, 0.05), 0.2), -1.0);
    assert_eq!(BlackScholes::delta(&OptionParams::put(105.0, 100.0, 0.0, 0.05), 0.2), 0.0);
}

#[test]
fn test_price_monotonic_in_volatility() {
    let vols: Vec<f64> = (1..=100).map(|i| i as f64 * 0.02).collect();
    for s in SPOTS {
        for k in STRIKES {
            for option_type in [OptionType::Call, OptionType::Put] {
                let params = OptionParams::new(s, k, 0.5, 0.05, option_type);
                let prices: Vec<f64> = vols.iter().map(|v| BlackScholes::price(&params, *v)).collect();
                assert!(
                    prices.windows(2).all(|w| w[1] >= w[0] - 1e-12),
                    "price not monotonic for S={s} K={k} {option_type}"
                );
            }
        }
    }
}

#[test]
fn test_vega_sign_and_shape() {
    for (s, k, t, r, v) in grid() {
        assert!(BlackScholes::vega(&OptionParams::call(s, k, t, r), v) > 0.0);
    }

    let atm = BlackScholes::vega(&OptionParams::call(100.0, 100.0, 0.5, 0.05), 0.3);
    let deep_otm = BlackScholes::vega(&OptionParams::call(100.0, 150.0, 0.5, 0.05), 0.3);
    assert!(atm > deep_otm);

    let short = BlackScholes::vega(&OptionParams::call(100.0, 100.0, 0.25, 0.05), 0.3);
    let long = BlackScholes::vega(&OptionParams::call(100.0, 100.0, 1.0, 0.05), 0.3);
    assert!(long > short);

    assert_eq!(BlackScholes::vega(&OptionParams::call(100.0, 100.0, 0.0, 0.05), 0.3), 0.0);
}

#[test]
fn test_greeks_signs() {
    let call = BlackScholes::greeks(&OptionParams::call(100.0, 100.0, 0.5, 0.05), 0.3).unwrap();
    assert!(call.delta > 0.0);
    assert!(call.gamma > 0.0);
    assert!(call.theta < 0.0);
    assert!(call.vega > 0.0);
    assert!(call.rho > 0.0);

    let put = BlackScholes::greeks(&OptionParams::put(100.0, 100.0, 0.5, 0.05), 0.3).unwrap();
    assert!(put.delta < 0.0);
    assert!(put.gamma > 0.0);
    assert!(put.vega > 0.0);
    assert!(put.rho < 0.0);
    assert_eq!(put.gamma, call.gamma);
    assert_eq!(put.vega, call.vega);
}

#[test]
fn test_greeks_errors() {
    let expired = BlackScholes::greeks(&OptionParams::call(100.0, 100.0, 0.0, 0.05), 0.2);
    assert_eq!(expired.unwrap_err().kind(), "expired");

    let zero_vol = BlackScholes::greeks(&OptionParams::call(100.0, 100.0, 0.5, 0.05), 0.0);
    assert!(matches!(
        zero_vol,
        Err(PricingError::InvalidVolatility { .. })
    ));

    // Expiry is reported ahead of a bad volatility.
    let both = BlackScholes::greeks(&OptionParams::put(100.0, 100.0, -0.1, 0.05), -1.0);
    assert_eq!(both.unwrap_err().kind(), "expired");
}

#[test]
fn test_iv_round_trip() {
    for (option_type, sigma) in [(OptionType::Call, 0.25), (OptionType::Put, 0.35)] {
        let params = OptionParams::new(100.0, 100.0, 0.5, 0.05, option_type);
        let price = BlackScholes::price(&params, sigma);
        let iv = implied_volatility(&params, price).unwrap();
        assert!((iv - sigma).abs() < 0.001, "{option_type}: {iv} vs {sigma}");
    }
}

#[test]
fn test_iv_high_volatility() {
    let params = OptionParams::call(100.0, 100.0, 0.5, 0.05);
    let price = BlackScholes::price(&params, 1.5);
    let iv = implied_volatility(&params, price).unwrap();
    assert!(iv > 1.0);
}

#[test]
fn test_iv_is_clamped() {
    // A price above what MAX_VOLATILITY can produce still yields a bounded sigma.
    let params = OptionParams::call(100.0, 100.0, 0.5, 0.05);
    let solution = solve_iv(&params, 99.0, &SolverConfig::default()).unwrap();
    assert!(solution.iv >= MIN_VOLATILITY && solution.iv <= MAX_VOLATILITY);
    assert!(!solution.converged);
}

#[test]
fn test_bisection_converges() {
    let params = OptionParams::call(100.0, 100.0, 0.5, 0.05);
    let price = BlackScholes::price(&params, 0.30);
    let solution = bisection(&params, price, &SolverConfig::default());
    assert_eq!(solution.method, SolverMethod::Bisection);
    assert!((solution.iv - 0.30).abs() < 0.01);
}

#[test]
fn test_concrete_scenarios() {
    let atm = OptionParams::call(100.0, 100.0, 1.0, 0.05);
    let price = BlackScholes::price(&atm, 0.2);
    assert!(price > 10.0 && price < 15.0);

    let expired = OptionParams::call(100.0, 100.0, 0.0, 0.05);
    assert_eq!(
        BlackScholes::greeks(&expired, 0.2).unwrap_err().to_string(),
        "option has expired"
    );

    let half_year = OptionParams::call(100.0, 100.0, 0.5, 0.05);
    assert!(implied_volatility(&half_year, 0.0).is_none());
    assert!(implied_volatility(&OptionParams::call(100.0, 100.0, 0.0, 0.05), 5.0).is_none());

    assert!(estimate_iv(120.0, 100.0, 0.5, OptionType::Call) < BASE_IV);

    let deep_itm = OptionParams::call(200.0, 100.0, 1.0, 0.05);
    assert!(BlackScholes::delta(&deep_itm, 0.2) > 0.99);
}

#[test]
fn test_estimate_iv_mirrors_puts() {
    assert_eq!(estimate_iv(100.0, 100.0, 0.5, OptionType::Call), BASE_IV);
    assert!(estimate_iv(80.0, 100.0, 0.5, OptionType::Call) > BASE_IV);
    assert!(estimate_iv(80.0, 100.0, 0.5, OptionType::Put) < BASE_IV);
    assert!(estimate_iv(120.0, 100.0, 0.5, OptionType::Put) > BASE_IV);
}
