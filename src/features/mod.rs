// =============================================================================
// Indicator Calculators
// =============================================================================
//
// Each calculator maps the quote sequence to an `IndicatorTable` keyed by
// date, one row per quote.  Calculators are independent of each other; the
// pipeline joins their tables on date afterwards.

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod trend_strength;

pub use bollinger::bollinger_bands;
pub use macd::macd_signal;
pub use rsi::rsi_features;
pub use trend_strength::trend_strength;
