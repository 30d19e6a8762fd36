// =============================================================================
// VIX loader — volatility index history as a standalone table
// =============================================================================
//
// Not joined into the feature table.  Callers that want it as an extra
// feature join it themselves on `date`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use super::{load_quotes, PriceSource};
use crate::error::Result;
use crate::types::PriceBar;

pub const VIX_TICKER: &str = "^VIX";
pub const VIX_RANGE: &str = "max";

pub const COLUMNS: [&str; 5] = ["Date", "Vix Open", "Vix High", "Vix Low", "Vix Close"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VixRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Vix Open")]
    pub open: f64,
    #[serde(rename = "Vix High")]
    pub high: f64,
    #[serde(rename = "Vix Low")]
    pub low: f64,
    #[serde(rename = "Vix Close")]
    pub close: f64,
}

impl VixRow {
    /// The row's date at 00:00 with no timezone.
    pub fn midnight(&self) -> NaiveDateTime {
        self.date.and_time(chrono::NaiveTime::MIN)
    }
}

impl From<&PriceBar> for VixRow {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VixTable {
    pub rows: Vec<VixRow>,
}

impl VixTable {
    pub fn columns(&self) -> [&'static str; 5] {
        COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn on(&self, date: NaiveDate) -> Option<&VixRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])
    }
}

/// Full daily `^VIX` history.  Volume is dropped.
pub async fn load_vix<S: PriceSource>(source: &S) -> Result<VixTable> {
    let loaded = load_quotes(source, VIX_TICKER, VIX_RANGE).await?;
    let table = VixTable {
        rows: loaded.raw.bars.iter().map(VixRow::from).collect(),
    };
    info!(rows = table.len(), "VIX history loaded");
    Ok(table)
}
