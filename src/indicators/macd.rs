// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(MACD line, signal)
//
// Both EMAs are SMA-seeded (see `ema`), so the MACD line is defined from index
// `slow - 1` and the signal line from index `slow - 1 + signal - 1`.
// =============================================================================

use super::ema::{calculate_ema, calculate_ema_of};

/// MACD and signal lines aligned with the input closes.
#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

impl MacdSeries {
    /// `macd - signal` where both lines are defined.
    pub fn histogram(&self) -> Vec<Option<f64>> {
        self.macd
            .iter()
            .zip(&self.signal)
            .map(|(m, s)| Some((*m)? - (*s)?))
            .collect()
    }
}

/// Compute the MACD and signal lines for `closes`.
///
/// Returns all-`None` lines when any period is zero or `fast >= slow`.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let empty = vec![None; closes.len()];
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return MacdSeries {
            macd: empty.clone(),
            signal: empty,
        };
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = calculate_ema_of(&macd, signal);

    MacdSeries { macd, signal }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.25).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn warm_up_boundaries() {
        let series = calculate_macd(&wave(60), 12, 26, 9);
        assert!(series.macd[..25].iter().all(Option::is_none));
        assert!(series.macd[25..].iter().all(Option::is_some));
        assert!(series.signal[..33].iter().all(Option::is_none));
        assert!(series.signal[33..].iter().all(Option::is_some));
    }

    #[test]
    fn flat_prices_have_zero_macd() {
        let series = calculate_macd(&[50.0; 40], 12, 26, 9);
        for v in series.macd.iter().flatten().chain(series.signal.iter().flatten()) {
            assert!(v.abs() < 1e-10);
        }
    }

    #[test]
    fn rising_prices_have_positive_macd() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let series = calculate_macd(&closes, 12, 26, 9);
        assert!(series.macd.iter().flatten().all(|v| *v > 0.0));
    }

    #[test]
    fn histogram_undefined_until_signal() {
        let series = calculate_macd(&wave(60), 12, 26, 9);
        let hist = series.histogram();
        assert!(hist[32].is_none());
        let expected = series.macd[40].unwrap() - series.signal[40].unwrap();
        assert!((hist[40].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn inverted_periods_yield_nothing() {
        let series = calculate_macd(&wave(60), 26, 12, 9);
        assert!(series.macd.iter().all(Option::is_none));
        assert!(series.signal.iter().all(Option::is_none));
    }
}
