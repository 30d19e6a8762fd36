// =============================================================================
// MACD / Signal table
// =============================================================================
//
// Beyond the two lines themselves the table tracks the area between them:
//
//   Macd Area Sum    = rolling sum of |macd - signal| over `macd_area_window`
//   Macd Area Change = area sum minus the area sum `macd_area_change_lag` rows
//                      earlier.  Positive: lines diverging, trend
//                      strengthening.  Negative: lines compressing, possible
//                      reversal.
//   Macd Difference  = 1 when macd > signal, else 0
// =============================================================================

use crate::config::FeatureConfig;
use crate::indicators::macd::calculate_macd;
use crate::indicators::rolling::{diff, rolling_sum};
use crate::table::IndicatorTable;
use crate::types::Quote;

pub const MACD_VALUE: &str = "Macd Value";
pub const SIGNAL_VALUE: &str = "Signal Value";
pub const MACD_AREA_SUM: &str = "Macd Area Sum";
pub const MACD_AREA_CHANGE: &str = "Macd Area Change";
pub const MACD_DIFFERENCE: &str = "Macd Difference";

pub const COLUMNS: [&str; 5] = [
    MACD_VALUE,
    SIGNAL_VALUE,
    MACD_AREA_SUM,
    MACD_AREA_CHANGE,
    MACD_DIFFERENCE,
];

pub fn macd_signal(quotes: &[Quote], config: &FeatureConfig) -> IndicatorTable {
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let series = calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);

    let abs_gap: Vec<Option<f64>> = series.histogram().iter().map(|h| h.map(f64::abs)).collect();
    let area_sum = rolling_sum(&abs_gap, config.macd_area_window);
    let area_change = diff(&area_sum, config.macd_area_change_lag);

    let mut table = IndicatorTable::new("macd", &COLUMNS);
    for (i, quote) in quotes.iter().enumerate() {
        let macd = series.macd[i];
        let signal = series.signal[i];
        let above = match (macd, signal) {
            (Some(m), Some(s)) => Some(if m > s { 1.0 } else { 0.0 }),
            _ => None,
        };
        table.push(quote.date, vec![macd, signal, area_sum[i], area_change[i], above]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testutil::{quotes_from_closes, wave_closes};

    #[test]
    fn warm_up_ends_at_area_change() {
        let quotes = quotes_from_closes(&wave_closes(80));
        let config = FeatureConfig::default();
        let table = macd_signal(&quotes, &config);
        assert_eq!(table.warm_up(), config.macd_warm_up());
        assert!(table.value(25, MACD_VALUE).is_some());
        assert!(table.value(32, SIGNAL_VALUE).is_none());
        assert!(table.value(33, SIGNAL_VALUE).is_some());
        assert!(table.value(41, MACD_AREA_SUM).is_none());
        assert!(table.value(42, MACD_AREA_SUM).is_some());
        assert!(table.value(46, MACD_AREA_CHANGE).is_none());
        assert!(table.value(47, MACD_AREA_CHANGE).is_some());
    }

    #[test]
    fn area_sum_is_sum_of_absolute_gaps() {
        let quotes = quotes_from_closes(&wave_closes(80));
        let table = macd_signal(&quotes, &FeatureConfig::default());
        let expected: f64 = (51..=60)
            .map(|i| (table.value(i, MACD_VALUE).unwrap() - table.value(i, SIGNAL_VALUE).unwrap()).abs())
            .sum();
        assert!((table.value(60, MACD_AREA_SUM).unwrap() - expected).abs() < 1e-9);

        let change = table.value(60, MACD_AREA_SUM).unwrap() - table.value(55, MACD_AREA_SUM).unwrap();
        assert!((table.value(60, MACD_AREA_CHANGE).unwrap() - change).abs() < 1e-9);
    }

    #[test]
    fn difference_flag_tracks_line_order() {
        let quotes = quotes_from_closes(&wave_closes(80));
        let table = macd_signal(&quotes, &FeatureConfig::default());
        for i in 33..80 {
            let m = table.value(i, MACD_VALUE).unwrap();
            let s = table.value(i, SIGNAL_VALUE).unwrap();
            let flag = table.value(i, MACD_DIFFERENCE).unwrap();
            assert_eq!(flag, if m > s { 1.0 } else { 0.0 });
        }
        assert!(table.value(30, MACD_DIFFERENCE).is_none());
    }
}
