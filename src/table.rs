// =============================================================================
// Date-keyed tables flowing between pipeline stages
// =============================================================================
//
//   IndicatorTable — one indicator family, one row per quote, `None` during
//                    warm-up.
//   JoinedTable    — indicator columns intersected on date, label and raw
//                    close attached, still possibly undefined.
//   FeatureTable   — fully defined rows only; the model input/label pairs.

use chrono::NaiveDate;
use serde::Serialize;

pub const CLOSE_TREND: &str = "Close Trend";
pub const CLOSE: &str = "Close";
pub const DATE: &str = "Date";

// =============================================================================
// IndicatorTable
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorTable {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn new(name: &'static str, columns: &[&'static str]) -> Self {
        Self {
            name,
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, date: NaiveDate, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.columns.len(), "row width for {}", self.name);
        self.rows.push(IndicatorRow { date, values });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of leading rows with at least one undefined field.
    pub fn warm_up(&self) -> usize {
        self.rows
            .iter()
            .position(|r| r.values.iter().all(Option::is_some))
            .unwrap_or(self.rows.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Every value of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.values[idx]
    }
}

// =============================================================================
// JoinedTable
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
    pub close_trend: Option<u8>,
    pub close: Option<f64>,
}

impl JoinedRow {
    pub fn is_complete(&self) -> bool {
        self.close_trend.is_some() && self.close.is_some() && self.values.iter().all(Option::is_some)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column (in column order, label and close last) that holds an
    /// undefined value in every row.  Used to explain an empty feature table.
    pub fn never_defined_column(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }
        if let Some(name) = self.never_defined_feature() {
            return Some(name);
        }
        if self.rows.iter().all(|r| r.close_trend.is_none()) {
            return Some(CLOSE_TREND.to_string());
        }
        if self.rows.iter().all(|r| r.close.is_none()) {
            return Some(CLOSE.to_string());
        }
        None
    }

    /// Like [`never_defined_column`](Self::never_defined_column), but over
    /// the indicator columns only.
    pub fn never_defined_feature(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .enumerate()
            .find(|(idx, _)| self.rows.iter().all(|r| r.values[*idx].is_none()))
            .map(|(_, name)| name.clone())
    }

    /// Newest row whose indicator values are all defined, label ignored.
    pub fn latest_complete_features(&self) -> Option<FeatureVector> {
        self.rows.iter().rev().find_map(|r| {
            Some(FeatureVector {
                date: r.date,
                columns: self.columns.clone(),
                values: r.values.iter().copied().collect::<Option<Vec<f64>>>()?,
            })
        })
    }
}

// =============================================================================
// FeatureTable
// =============================================================================

/// One complete model input/label pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub features: Vec<f64>,
    #[serde(rename = "Close Trend")]
    pub close_trend: u8,
    #[serde(rename = "Close")]
    pub close: f64,
}

/// Feature values for a single row with their column names, label removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub date: NaiveDate,
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.values.get(idx).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    /// Indicator columns in join order (excludes label and close).
    pub feature_columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full column list: indicator columns, then `Close Trend`, then `Close`.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = self.feature_columns.clone();
        cols.push(CLOSE_TREND.to_string());
        cols.push(CLOSE.to_string());
        cols
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let r = self.rows.get(row)?;
        match name {
            CLOSE => Some(r.close),
            CLOSE_TREND => Some(f64::from(r.close_trend)),
            _ => {
                let idx = self.feature_columns.iter().position(|c| c == name)?;
                r.features.get(idx).copied()
            }
        }
    }

    /// The indicator features of `row` only: Date, Close and label stripped.
    pub fn feature_vector(&self, row: &FeatureRow) -> FeatureVector {
        FeatureVector {
            date: row.date,
            columns: self.feature_columns.clone(),
            values: row.features.clone(),
        }
    }
}
