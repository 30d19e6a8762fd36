// =============================================================================
// Trend Strength table — signed ADX with +DI / -DI
// =============================================================================
//
// ADX itself is direction-free.  The table folds direction into its sign:
// negated when -DI dominates (PDI < MDI, bearish strength), positive otherwise.

use crate::config::FeatureConfig;
use crate::indicators::adx::calculate_adx;
use crate::table::IndicatorTable;
use crate::types::Quote;

pub const ADX: &str = "ADX";
pub const PDI: &str = "PDI";
pub const MDI: &str = "MDI";

pub const COLUMNS: [&str; 3] = [ADX, PDI, MDI];

pub fn trend_strength(quotes: &[Quote], config: &FeatureConfig) -> IndicatorTable {
    let series = calculate_adx(quotes, config.adx_period);

    let mut table = IndicatorTable::new("trend_strength", &COLUMNS);
    for (i, quote) in quotes.iter().enumerate() {
        let (pdi, mdi) = (series.pdi[i], series.mdi[i]);
        let adx = series.adx[i].map(|adx| signed_adx(adx, pdi, mdi));
        table.push(quote.date, vec![adx, pdi, mdi]);
    }
    table
}

fn signed_adx(adx: f64, pdi: Option<f64>, mdi: Option<f64>) -> f64 {
    match (pdi, mdi) {
        (Some(p), Some(m)) if p < m => -adx,
        _ => adx,
    }
}
