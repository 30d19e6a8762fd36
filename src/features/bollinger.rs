// =============================================================================
// Bollinger Bands table — SMA ± k·σ with the close's z-score
// =============================================================================

use crate::config::FeatureConfig;
use crate::indicators::bollinger::calculate_bollinger;
use crate::table::IndicatorTable;
use crate::types::Quote;

pub const SMA: &str = "SMA";
pub const LOWER_BAND: &str = "Lower Band";
pub const UPPER_BAND: &str = "Upper Band";
pub const Z_SCORE: &str = "Z-Score";

pub const COLUMNS: [&str; 4] = [SMA, LOWER_BAND, UPPER_BAND, Z_SCORE];

/// Undefined before index `bollinger_window - 1`.
pub fn bollinger_bands(quotes: &[Quote], config: &FeatureConfig) -> IndicatorTable {
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let points = calculate_bollinger(&closes, config.bollinger_window, config.bollinger_std_mult);

    let mut table = IndicatorTable::new("bollinger", &COLUMNS);
    for (quote, point) in quotes.iter().zip(points) {
        let values = match point {
            Some(bb) => vec![Some(bb.middle), Some(bb.lower), Some(bb.upper), bb.z_score],
            None => vec![None; COLUMNS.len()],
        };
        table.push(quote.date, values);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testutil::{linear_closes, quotes_from_closes, wave_closes};

    #[test]
    fn nothing_defined_before_window_fills() {
        let quotes = quotes_from_closes(&wave_closes(40));
        let table = bollinger_bands(&quotes, &FeatureConfig::default());
        assert_eq!(table.len(), 40);
        for row in &table.rows[..19] {
            assert!(row.values.iter().all(Option::is_none));
        }
        assert_eq!(table.warm_up(), 19);
    }

    #[test]
    fn sma_at_day_59_of_linear_series() {
        let quotes = quotes_from_closes(&linear_closes(60));
        let table = bollinger_bands(&quotes, &FeatureConfig::default());
        // mean of 140..=159
        assert!((table.value(59, SMA).unwrap() - 149.5).abs() < 1e-10);
        assert!(table.value(59, Z_SCORE).unwrap() > 0.0);
    }

    #[test]
    fn band_multiplier_is_configurable() {
        let quotes = quotes_from_closes(&wave_closes(30));
        let narrow = bollinger_bands(&quotes, &FeatureConfig::default());
        let wide = bollinger_bands(
            &quotes,
            &FeatureConfig {
                bollinger_std_mult: 3.0,
                ..FeatureConfig::default()
            },
        );
        let width = |t: &IndicatorTable| t.value(29, UPPER_BAND).unwrap() - t.value(29, LOWER_BAND).unwrap();
        assert!((width(&wide) / width(&narrow) - 1.5).abs() < 1e-10);
    }
}
