// =============================================================================
// Quote Loader — daily history for one ticker, typed failures
// =============================================================================

use tracing::{error, info, instrument};

use super::PriceSource;
use crate::error::{PipelineError, Result};
use crate::types::{PriceTable, Quote};

/// Loader output: indicator input records plus the raw table they came from.
#[derive(Debug, Clone)]
pub struct LoadedQuotes {
    pub quotes: Vec<Quote>,
    pub raw: PriceTable,
}

impl LoadedQuotes {
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Fetch the full available daily history of `ticker` for `range`.
///
/// Source failures and empty histories are logged and returned as
/// [`PipelineError::DataUnavailable`].
#[instrument(skip(source))]
pub async fn load_quotes<S: PriceSource>(source: &S, ticker: &str, range: &str) -> Result<LoadedQuotes> {
    let bars = match source.daily_history(ticker, range).await {
        Ok(bars) => bars,
        Err(e) => {
            error!(ticker, range, error = %format!("{e:#}"), "failed to load daily quotes");
            return Err(PipelineError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!("{e:#}"),
            });
        }
    };

    let raw = PriceTable::new(ticker, bars);
    if raw.is_empty() {
        error!(ticker, range, "price source returned no daily quotes");
        return Err(PipelineError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: "empty price history".to_string(),
        });
    }

    let quotes = raw.quotes();
    info!(
        ticker,
        range,
        rows = quotes.len(),
        first = %raw.bars[0].date,
        last = %raw.bars[raw.len() - 1].date,
        "daily quotes loaded"
    );

    Ok(LoadedQuotes { quotes, raw })
}
