//! Small numeric helpers shared across modules.

/// Rounds `value` to `decimals` places, half away from zero.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds `value` to the nearest multiple of `step`, ties to even.
#[must_use]
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round_ties_even() * step
}

/// Arithmetic mean, `None` for an empty iterator.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(10.450_584, 4), 10.4506);
        assert_eq!(round_to(0.018_762_4, 6), 0.018762);
        assert_eq!(round_to(-0.017_573, 4), -0.0176);
        assert_eq!(round_to(123.456, 0), 123.0);
    }

    #[test]
    fn test_round_to_step_ties_to_even() {
        assert_eq!(round_to_step(142.5, 5.0), 140.0);
        assert_eq!(round_to_step(137.5, 5.0), 140.0);
        assert_eq!(round_to_step(143.0, 5.0), 145.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        let avg = mean([0.2, 0.4]).unwrap();
        assert!((avg - 0.3).abs() < 1e-12);
    }
}
