// =============================================================================
// Prediction Adapter — newest feature row through a classifier
// =============================================================================
//
// A short recent window is pulled through the indicator stages and the join.
// No label is attached: the row scored is the newest quote with every
// indicator defined, and the classifier says whether the close is expected
// higher `prediction_lookahead_period` trading days after it.
// =============================================================================

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::FeatureConfig;
use crate::error::{PipelineError, Result};
use crate::market_data::{load_quotes, PriceSource};
use crate::pipeline::FeaturePipeline;
use crate::table::FeatureVector;

/// A trained binary model: 1 = close expected higher after the look-ahead.
pub trait Classifier {
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> anyhow::Result<u8>;
}

// =============================================================================
// LinearClassifier
// =============================================================================

fn default_threshold() -> f64 {
    0.5
}

/// Logistic model over the feature vector, loaded from JSON exported by the
/// training side:
///
/// ```json
/// { "weights": [0.1, ...], "bias": -0.3, "threshold": 0.5 }
/// ```
///
/// `columns`, when present, must match the feature columns in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LinearClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            columns: None,
            weights,
            bias,
            threshold: default_threshold(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model {}", path.display()))?;
        let model: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse model {}", path.display()))?;
        Ok(model)
    }

    /// Probability of an up move.
    pub fn probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        if features.values.len() != self.weights.len() {
            anyhow::bail!(
                "model expects {} features, got {}",
                self.weights.len(),
                features.values.len()
            );
        }
        if let Some(columns) = &self.columns {
            if columns != &features.columns {
                anyhow::bail!("model columns do not match feature columns {:?}", features.columns);
            }
        }

        let score: f64 = self.bias
            + self
                .weights
                .iter()
                .zip(&features.values)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-score).exp()))
    }
}

impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, features: &FeatureVector) -> anyhow::Result<u8> {
        Ok(u8::from(self.probability(features)? >= self.threshold))
    }
}

// =============================================================================
// Adapter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub ticker: String,
    /// Date of the scored feature row.
    pub date: NaiveDate,
    /// Trading days ahead the label refers to.
    pub lookahead: usize,
    pub label: u8,
    pub classifier: String,
    pub features: FeatureVector,
}

/// Fetch recent history for `ticker`, build its indicator features and
/// classify the newest complete row.
#[instrument(skip(source, classifier, config), fields(classifier = classifier.name()))]
pub async fn predict_next<S, C>(
    source: &S,
    ticker: &str,
    classifier: &C,
    config: &FeatureConfig,
) -> Result<Prediction>
where
    S: PriceSource,
    C: Classifier + ?Sized,
{
    config
        .validate()
        .map_err(|e| PipelineError::InvalidConfig(format!("{e:#}")))?;

    let lookahead = config.prediction_lookahead_period;
    if lookahead != config.label_lookahead_period {
        warn!(
            prediction = lookahead,
            training = config.label_lookahead_period,
            "prediction look-ahead differs from the training label look-ahead"
        );
    }

    let loaded = load_quotes(source, ticker, &config.prediction_range).await?;
    let run = FeaturePipeline::new(config).run_unlabelled(&loaded.quotes);

    let Some(features) = run.latest else {
        let required = config.min_feature_history();
        if loaded.len() < required {
            return Err(PipelineError::InsufficientHistory {
                required,
                actual: loaded.len(),
            });
        }
        let column = run
            .joined
            .never_defined_feature()
            .unwrap_or_else(|| "no row with every column defined".to_string());
        return Err(PipelineError::UndefinedStatistic { column });
    };

    let label = classifier
        .predict(&features)
        .map_err(|e| PipelineError::Classifier(format!("{e:#}")))?;
    if label > 1 {
        return Err(PipelineError::Classifier(format!(
            "{} returned non-binary label {label}",
            classifier.name()
        )));
    }

    info!(ticker, date = %features.date, lookahead, label, "prediction made");

    Ok(Prediction {
        ticker: ticker.to_string(),
        date: features.date,
        lookahead,
        label,
        classifier: classifier.name().to_string(),
        features,
    })
}
