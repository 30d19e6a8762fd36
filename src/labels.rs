// =============================================================================
// Close Trend labels and the chronological train/test split
// =============================================================================
//
// Label:  close_trend(t) = 1 if close(t + period) > close(t) else 0, on the raw
//         price table's own row order.  The last `period` rows have no
//         look-ahead and stay undefined.
//
// Split:  rows [0, floor(fraction * n)) train, the rest test.  Never shuffled:
//         a random split would leak future prices into training.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::{FeatureRow, FeatureTable, CLOSE};
use crate::types::PriceTable;

/// Forward-looking binary trend label for every raw row, keyed by date.
pub fn close_trend(raw: &PriceTable, period: usize) -> Vec<(NaiveDate, Option<u8>)> {
    let bars = &raw.bars;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let label = match bars.get(i + period) {
                Some(future) if period > 0 => Some(u8::from(future.close > bar.close)),
                _ => None,
            };
            (bar.date, label)
        })
        .collect()
}

/// Feature matrix with its date index; the label column is never included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainTestSplit {
    pub x_train: FeatureMatrix,
    pub y_train: Vec<u8>,
    pub x_test: FeatureMatrix,
    pub y_test: Vec<u8>,
}

/// Partition `table` chronologically at `floor(fraction * rows)`.
///
/// `X` keeps every indicator column plus the raw `Close`; `y` is the label.
pub fn train_test_split(table: &FeatureTable, fraction: f64) -> Result<TrainTestSplit> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(PipelineError::InvalidSplit(fraction));
    }

    let split_index = (table.len() as f64 * fraction).floor() as usize;
    let (train, test) = table.rows.split_at(split_index);

    let mut columns = table.feature_columns.clone();
    columns.push(CLOSE.to_string());

    let matrix = |rows: &[FeatureRow]| FeatureMatrix {
        columns: columns.clone(),
        dates: rows.iter().map(|r| r.date).collect(),
        rows: rows
            .iter()
            .map(|r| {
                let mut values = r.features.clone();
                values.push(r.close);
                values
            })
            .collect(),
    };

    let split = TrainTestSplit {
        x_train: matrix(train),
        y_train: train.iter().map(|r| r.close_trend).collect(),
        x_test: matrix(test),
        y_test: test.iter().map(|r| r.close_trend).collect(),
    };

    debug!(
        rows = table.len(),
        train = split.y_train.len(),
        test = split.y_test.len(),
        fraction,
        "feature table split"
    );
    Ok(split)
}
