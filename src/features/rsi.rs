// =============================================================================
// RSI table — RSI with its rolling mean, deviation and z-score
// =============================================================================

use crate::config::FeatureConfig;
use crate::indicators::rolling::{rolling_mean, rolling_std, z_score};
use crate::indicators::rsi::calculate_rsi;
use crate::table::IndicatorTable;
use crate::types::Quote;

pub const RSI: &str = "RSI";
pub const RSI_MEAN: &str = "RSI Mean";
pub const RSI_STD: &str = "RSI Std";
pub const RSI_Z_SCORE: &str = "RSI Z-Score";

pub const COLUMNS: [&str; 4] = [RSI, RSI_MEAN, RSI_STD, RSI_Z_SCORE];

/// The z-score is `None` wherever the rolling deviation is zero or still
/// warming up, so a flat RSI stretch never turns into ±∞ or 0.
pub fn rsi_features(quotes: &[Quote], config: &FeatureConfig) -> IndicatorTable {
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let rsi = calculate_rsi(&closes, config.rsi_period);
    let mean = rolling_mean(&rsi, config.rsi_zscore_window);
    let std = rolling_std(&rsi, config.rsi_zscore_window);

    let mut table = IndicatorTable::new("rsi", &COLUMNS);
    for (i, quote) in quotes.iter().enumerate() {
        let z = z_score(rsi[i], mean[i], std[i]);
        table.push(quote.date, vec![rsi[i], mean[i], std[i], z]);
    }
    table
}
