// =============================================================================
// Feature Configuration — every indicator window and label horizon in one place
// =============================================================================
//
// All fields carry `#[serde(default = ...)]` so a partial JSON file (or `{}`)
// loads with the standard parameters filled in.  Saving uses an atomic
// tmp + rename so an interrupted write never leaves a truncated file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_std_mult() -> f64 {
    2.0
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_macd_area_window() -> usize {
    10
}

fn default_macd_area_change_lag() -> usize {
    5
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_zscore_window() -> usize {
    20
}

fn default_adx_period() -> usize {
    14
}

fn default_lookahead() -> usize {
    5
}

fn default_split_fraction() -> f64 {
    0.8
}

fn default_history_range() -> String {
    "max".to_string()
}

fn default_prediction_range() -> String {
    "3mo".to_string()
}

// =============================================================================
// FeatureConfig
// =============================================================================

/// Parameters for every stage of the feature pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    // --- Bollinger Bands ----------------------------------------------------

    /// SMA / σ window for the bands.
    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Band distance from the SMA in standard deviations.
    #[serde(default = "default_bollinger_std_mult")]
    pub bollinger_std_mult: f64,

    // --- MACD ---------------------------------------------------------------

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Rolling window for the |macd - signal| area sum.
    #[serde(default = "default_macd_area_window")]
    pub macd_area_window: usize,

    /// Row distance used when differencing the area sum.
    #[serde(default = "default_macd_area_change_lag")]
    pub macd_area_change_lag: usize,

    // --- RSI ----------------------------------------------------------------

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Rolling window for the RSI mean / std / z-score.
    #[serde(default = "default_rsi_zscore_window")]
    pub rsi_zscore_window: usize,

    // --- ADX ----------------------------------------------------------------

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    // --- Labels & split -----------------------------------------------------

    /// Look-ahead used when labelling the training table.
    #[serde(default = "default_lookahead")]
    pub label_lookahead_period: usize,

    /// Look-ahead used by the prediction adapter.  Kept separate from the
    /// training horizon on purpose; a mismatch is logged, not corrected.
    #[serde(default = "default_lookahead")]
    pub prediction_lookahead_period: usize,

    /// Fraction of rows (oldest first) that go to the training set.
    #[serde(default = "default_split_fraction")]
    pub split_fraction: f64,

    // --- Data ranges --------------------------------------------------------

    /// Price-source range for the full training history.
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Price-source range for the prediction window.
    #[serde(default = "default_prediction_range")]
    pub prediction_range: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            bollinger_window: default_bollinger_window(),
            bollinger_std_mult: default_bollinger_std_mult(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            macd_area_window: default_macd_area_window(),
            macd_area_change_lag: default_macd_area_change_lag(),
            rsi_period: default_rsi_period(),
            rsi_zscore_window: default_rsi_zscore_window(),
            adx_period: default_adx_period(),
            label_lookahead_period: default_lookahead(),
            prediction_lookahead_period: default_lookahead(),
            split_fraction: default_split_fraction(),
            history_range: default_history_range(),
            prediction_range: default_prediction_range(),
        }
    }
}

impl FeatureConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feature config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse feature config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid feature config in {}", path.display()))?;

        info!(
            path = %path.display(),
            label_lookahead = config.label_lookahead_period,
            history_range = %config.history_range,
            "feature config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration using an atomic write (tmp, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise feature config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "feature config saved (atomic)");
        Ok(())
    }

    /// Reject parameter combinations the calculators cannot honour.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("bollinger_window", self.bollinger_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("macd_area_window", self.macd_area_window),
            ("rsi_period", self.rsi_period),
            ("adx_period", self.adx_period),
            ("label_lookahead_period", self.label_lookahead_period),
            ("prediction_lookahead_period", self.prediction_lookahead_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                anyhow::bail!("{name} must be positive");
            }
        }
        if self.macd_fast >= self.macd_slow {
            anyhow::bail!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        // Sample standard deviation needs two points.
        if self.rsi_zscore_window < 2 {
            anyhow::bail!("rsi_zscore_window must be at least 2");
        }
        if !(self.bollinger_std_mult.is_finite() && self.bollinger_std_mult > 0.0) {
            anyhow::bail!("bollinger_std_mult must be a positive number");
        }
        if !(self.split_fraction > 0.0 && self.split_fraction < 1.0) {
            anyhow::bail!("split_fraction must lie strictly between 0 and 1");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Warm-up bookkeeping
    // -------------------------------------------------------------------------

    /// Index of the first Bollinger row with every field defined.
    pub fn bollinger_warm_up(&self) -> usize {
        self.bollinger_window.saturating_sub(1)
    }

    /// Index of the first MACD row with every field defined (the area change).
    pub fn macd_warm_up(&self) -> usize {
        self.macd_slow.saturating_sub(1)
            + self.macd_signal.saturating_sub(1)
            + self.macd_area_window.saturating_sub(1)
            + self.macd_area_change_lag
    }

    /// Index of the first RSI row with a z-score.
    pub fn rsi_warm_up(&self) -> usize {
        (self.rsi_period + self.rsi_zscore_window).saturating_sub(1)
    }

    /// Index of the first ADX row.
    pub fn adx_warm_up(&self) -> usize {
        (2 * self.adx_period).saturating_sub(1)
    }

    /// Fewest daily quotes that yield one row with every feature defined.
    pub fn min_feature_history(&self) -> usize {
        let warm_up = self
            .bollinger_warm_up()
            .max(self.macd_warm_up())
            .max(self.rsi_warm_up())
            .max(self.adx_warm_up());
        warm_up + 1
    }

    /// Fewest daily quotes that can yield one complete, labelled feature row
    /// for the given look-ahead.
    pub fn min_history(&self, lookahead: usize) -> usize {
        self.min_feature_history() + lookahead
    }
}
