// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` values,
// so the output is undefined for the first `period - 1` positions.
// =============================================================================

/// Compute the EMA series for `values`, aligned one-to-one with the input.
///
/// # Edge cases
/// - `period == 0` or `values.len() < period` => all `None`
/// - A non-finite intermediate value stops the series; every later position
///   stays `None` rather than carrying a broken average forward.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = values[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return result;
    }
    result[period - 1] = Some(sma);

    let mut prev_ema = sma;
    for (i, &value) in values.iter().enumerate().skip(period) {
        let ema = value * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result[i] = Some(ema);
        prev_ema = ema;
    }

    result
}

/// EMA over a series that is itself still warming up.
///
/// Leading `None`s are skipped; the EMA runs over the contiguous defined span
/// that follows and its own warm-up starts from there.  A gap inside that span
/// ends the series.
pub fn calculate_ema_of(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    let Some(start) = series.iter().position(Option::is_some) else {
        return result;
    };

    let defined: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();
    for (offset, value) in calculate_ema(&defined, period).into_iter().enumerate() {
        result[start + offset] = value;
    }
    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        let ema = calculate_ema(&[1.0, 2.0, 3.0], 0);
        assert_eq!(ema.len(), 3);
        assert!(ema.iter().all(Option::is_none));
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(calculate_ema(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }

    #[test]
    fn ema_period_equals_length() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert!(ema[..2].iter().all(Option::is_none));
        // Seed is the SMA = (2+4+6)/3 = 4.0
        assert!((ema[2].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10]: SMA seed 3.0 at index 4, multiplier 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);
        assert!(ema[..4].iter().all(Option::is_none));

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[4].unwrap() - expected).abs() < 1e-10);
        for i in 5..10 {
            expected = closes[i] * mult + expected * (1.0 - mult);
            assert!((ema[i].unwrap() - expected).abs() < 1e-10, "index {i}");
        }
    }

    #[test]
    fn ema_stops_on_nan() {
        let ema = calculate_ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 3);
        assert_eq!(ema[2], Some(2.0));
        assert!(ema[3].is_none());
        assert!(ema[4].is_none());
    }

    #[test]
    fn ema_of_skips_leading_warm_up() {
        let series = vec![None, None, Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let ema = calculate_ema_of(&series, 3);
        assert!(ema[..4].iter().all(Option::is_none));
        assert!((ema[4].unwrap() - 4.0).abs() < 1e-10);
        // 8 * 0.5 + 4 * 0.5
        assert!((ema[5].unwrap() - 6.0).abs() < 1e-10);
    }
}
