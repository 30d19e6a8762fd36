// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the population standard deviation of
// the same window.  The z-score locates the close inside the bands:
// z = (close - SMA) / σ.

/// Bollinger Band values for one position of the input series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `None` when σ is zero (flat window).
    pub z_score: Option<f64>,
}

/// Calculate Bollinger Bands at every position of `closes`.
///
/// Position `i` is `Some` once `period` closes ending at `i` are available,
/// i.e. from index `period - 1`.  Returns all `None` when `period` is zero or
/// a window produces a non-finite band.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<Option<BollingerPoint>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    for end in period..=closes.len() {
        let window = &closes[end - period..end];
        let middle = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
        let std_dev = variance.sqrt();

        let upper = middle + num_std * std_dev;
        let lower = middle - num_std * std_dev;
        if !(upper.is_finite() && lower.is_finite()) {
            continue;
        }

        let close = closes[end - 1];
        let z_score = if std_dev == 0.0 {
            None
        } else {
            Some((close - middle) / std_dev).filter(|z| z.is_finite())
        };

        result[end - 1] = Some(BollingerPoint {
            upper,
            middle,
            lower,
            z_score,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let result = calculate_bollinger(&closes, 20, 2.0);
        assert!(result[..19].iter().all(Option::is_none));
        let bb = result[19].unwrap();
        assert!((bb.middle - 10.5).abs() < 1e-10);
        assert!(bb.upper > bb.middle);
        assert!(bb.lower < bb.middle);
        assert!(bb.z_score.unwrap() > 0.0);
    }

    #[test]
    fn bollinger_insufficient_data() {
        let closes = vec![1.0, 2.0, 3.0];
        assert!(calculate_bollinger(&closes, 20, 2.0).iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_flat_has_no_z_score() {
        let closes = vec![100.0; 20];
        let bb = calculate_bollinger(&closes, 20, 2.0)[19].unwrap();
        assert!((bb.upper - bb.lower).abs() < 1e-10);
        assert!(bb.z_score.is_none());
    }

    #[test]
    fn bands_are_symmetric_around_sma() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        for bb in calculate_bollinger(&closes, 20, 2.0).into_iter().flatten() {
            assert!(((bb.upper - bb.middle) - (bb.middle - bb.lower)).abs() < 1e-9);
        }
    }
}
