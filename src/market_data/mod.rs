// =============================================================================
// Market Data — daily price history sources and loaders
// =============================================================================

pub mod quotes;
pub mod vix;
pub mod yahoo;

use std::future::Future;

use anyhow::Result;

use crate::types::PriceBar;

pub use quotes::{load_quotes, LoadedQuotes};
pub use vix::{load_vix, VixRow, VixTable};
pub use yahoo::YahooClient;

/// Anything that can return daily OHLCV bars for a ticker.
///
/// `range` uses the chart-API vocabulary: `"max"`, `"3mo"`, `"1y"`, ...
pub trait PriceSource {
    fn daily_history(&self, ticker: &str, range: &str) -> impl Future<Output = Result<Vec<PriceBar>>> + Send;
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::collections::HashMap;

    use anyhow::Result;

    use super::PriceSource;
    use crate::types::PriceBar;

    /// In-memory source keyed by ticker; unknown tickers fail like a 404.
    #[derive(Default)]
    pub struct StaticSource {
        pub series: HashMap<String, Vec<PriceBar>>,
    }

    impl StaticSource {
        pub fn with(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
            self.series.insert(ticker.to_string(), bars);
            self
        }
    }

    impl PriceSource for StaticSource {
        async fn daily_history(&self, ticker: &str, _range: &str) -> Result<Vec<PriceBar>> {
            self.series
                .get(ticker)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("chart API returned 404 Not Found for {ticker}"))
        }
    }
}
