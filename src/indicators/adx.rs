// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction; +DI and -DI carry
// the direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Alignment: bar `i` is the move from quote `i - 1` to quote `i`, so +DI/-DI
// first appear at index `period` and ADX at index `2 * period - 1`.
// =============================================================================

use crate::types::Quote;

/// ADX, +DI and -DI aligned with the input quotes.
#[derive(Debug, Clone, Default)]
pub struct AdxSeries {
    pub adx: Vec<Option<f64>>,
    pub pdi: Vec<Option<f64>>,
    pub mdi: Vec<Option<f64>>,
}

/// Compute the ADX series from a slice of OHLC quotes.
///
/// Bars whose smoothed true range is zero have undefined +DI/-DI and do not
/// advance the ADX average.
pub fn calculate_adx(quotes: &[Quote], period: usize) -> AdxSeries {
    let n = quotes.len();
    let mut out = AdxSeries {
        adx: vec![None; n],
        pdi: vec![None; n],
        mdi: vec![None; n],
    };
    if period == 0 || n < period + 1 {
        return out;
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr_vals = vec![0.0; n];

    for i in 1..n {
        let high = quotes[i].high;
        let low = quotes[i].low;
        let prev_high = quotes[i - 1].high;
        let prev_low = quotes[i - 1].low;
        let prev_close = quotes[i - 1].close;

        tr_vals[i] = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        let up_move = high - prev_high;
        let down_move = prev_low - low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    // ------------------------------------------------------------------
    // Step 3: Wilder's smoothing, seeded with the sum of bars 1..=period
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[1..=period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[1..=period].iter().sum();

    // ADX seed accumulator and running value.
    let mut dx_seed_sum = 0.0;
    let mut dx_seed_count = 0usize;
    let mut adx: Option<f64> = None;

    for i in period..n {
        if i > period {
            smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
            smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
            smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
        }

        let Some((plus_di, minus_di, dx)) = directional(smooth_plus_dm, smooth_minus_dm, smooth_tr)
        else {
            continue;
        };
        out.pdi[i] = Some(plus_di);
        out.mdi[i] = Some(minus_di);

        // ------------------------------------------------------------------
        // Step 6: ADX = SMA of the first `period` DX values, then Wilder's
        // ------------------------------------------------------------------
        adx = match adx {
            Some(prev) => Some((prev * (period_f - 1.0) + dx) / period_f),
            None => {
                dx_seed_sum += dx;
                dx_seed_count += 1;
                (dx_seed_count == period).then(|| dx_seed_sum / period_f)
            }
        };
        out.adx[i] = adx.filter(|v| v.is_finite());
    }

    out
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute (+DI, -DI, DX) from smoothed +DM, -DM, and TR values.
///
/// Returns `None` if the true range is zero or any value is non-finite.
fn directional(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Option<(f64, f64, f64)> {
    if smooth_tr == 0.0 {
        return None;
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        // No directional movement at all.
        0.0
    } else {
        ((plus_di - minus_di).abs() / di_sum) * 100.0
    };

    (plus_di.is_finite() && minus_di.is_finite() && dx.is_finite()).then_some((plus_di, minus_di, dx))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(day: usize, open: f64, high: f64, low: f64, close: f64) -> Quote {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(day as u64);
        Quote::new(date, open, high, low, close, 1.0)
    }

    fn uptrend(n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                quote(i, base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn adx_period_zero() {
        let series = calculate_adx(&uptrend(50), 0);
        assert!(series.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_insufficient_data() {
        let series = calculate_adx(&uptrend(10), 14);
        assert!(series.adx.iter().all(Option::is_none));
        assert!(series.pdi.iter().all(Option::is_none));
    }

    #[test]
    fn warm_up_boundaries() {
        let series = calculate_adx(&uptrend(60), 14);
        assert!(series.pdi[..14].iter().all(Option::is_none));
        assert!(series.pdi[14..].iter().all(Option::is_some));
        assert!(series.adx[..27].iter().all(Option::is_none));
        assert!(series.adx[27..].iter().all(Option::is_some));
    }

    #[test]
    fn adx_minimum_quotes_exact() {
        // Exactly 2*period quotes give one ADX value, at the last index.
        let period = 5;
        let quotes = uptrend(2 * period);
        let series = calculate_adx(&quotes, period);
        assert!(series.adx[2 * period - 1].is_some());
        assert_eq!(series.adx.iter().flatten().count(), 1);

        let series = calculate_adx(&quotes[..2 * period - 1], period);
        assert!(series.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_strong_uptrend() {
        let series = calculate_adx(&uptrend(60), 14);
        let value = series.adx[59].unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
        assert!(series.pdi[59].unwrap() > series.mdi[59].unwrap());
    }

    #[test]
    fn adx_flat_market() {
        let quotes: Vec<Quote> = (0..60).map(|i| quote(i, 100.0, 101.0, 99.0, 100.0)).collect();
        let series = calculate_adx(&quotes, 14);
        let value = series.adx[59].unwrap();
        assert!(value < 1.0, "expected ADX near 0 for flat market, got {value}");
    }

    #[test]
    fn zero_range_bars_leave_di_undefined() {
        let quotes: Vec<Quote> = (0..40).map(|i| quote(i, 10.0, 10.0, 10.0, 10.0)).collect();
        let series = calculate_adx(&quotes, 14);
        assert!(series.pdi.iter().all(Option::is_none));
        assert!(series.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_result_range() {
        let quotes: Vec<Quote> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                quote(i, base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        for value in calculate_adx(&quotes, 14).adx.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "ADX {value} out of [0,100] range");
        }
    }
}
