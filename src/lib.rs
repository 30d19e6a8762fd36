// =============================================================================
// trend-features — technical-indicator feature tables for trend classification
// =============================================================================
//
//   market_data ─> features (bollinger, macd, rsi, trend_strength)
//               ─> pipeline (join, label, drop_undefined)
//               ─> labels (train/test split) | predict (classifier adapter)
// =============================================================================

pub mod config;
pub mod error;
pub mod features;
pub mod indicators;
pub mod labels;
pub mod market_data;
pub mod pipeline;
pub mod predict;
pub mod table;
pub mod types;

pub use config::FeatureConfig;
pub use error::PipelineError;
pub use market_data::{load_quotes, load_vix, PriceSource, YahooClient};
pub use pipeline::{compute_features, FeaturePipeline, PipelineRun};
pub use predict::{predict_next, Classifier, LinearClassifier, Prediction};
pub use table::{FeatureTable, FeatureVector};
