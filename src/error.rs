// =============================================================================
// Pipeline errors
// =============================================================================
//
// Network and parsing plumbing stays on `anyhow`; anything a caller may want
// to branch on (retry the fetch, wait for more history, abort) surfaces here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The price source failed or returned nothing for the ticker.
    #[error("no price data available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// Too few quotes to get past every warm-up window and the label horizon.
    #[error("insufficient history: need at least {required} daily quotes, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Enough history, but a statistic never became defined (e.g. a flat
    /// RSI window has zero deviation so its z-score is undefined).
    #[error("undefined statistic in column '{column}' left no complete feature rows")]
    UndefinedStatistic { column: String },

    #[error("invalid feature config: {0}")]
    InvalidConfig(String),

    #[error("split fraction must lie strictly between 0 and 1, got {0}")]
    InvalidSplit(f64),

    #[error("classifier failed: {0}")]
    Classifier(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
