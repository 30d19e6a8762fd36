// =============================================================================
// Feature Pipeline — named stages from quotes to a complete feature table
// =============================================================================
//
//   bollinger ┐
//   macd      ├─> join (inner, on date) ─> label ─> drop_undefined
//   rsi       │
//   trend     ┘
//
// Every stage appends a `StageReport` to the run's trace so the rows lost to
// each warm-up window and to the label horizon can be read off per stage
// instead of only from the final row count.
//
// Scoring stops after the join (`run_unlabelled`): the newest quotes have no
// label yet and must not be dropped for it.
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::FeatureConfig;
use crate::features::{bollinger_bands, macd_signal, rsi_features, trend_strength};
use crate::labels::close_trend;
use crate::table::{FeatureRow, FeatureTable, FeatureVector, IndicatorTable, JoinedRow, JoinedTable};
use crate::types::{PriceTable, Quote};

type Calculator = fn(&[Quote], &FeatureConfig) -> IndicatorTable;

/// Indicator stages in join order; this order is also the feature column order.
const INDICATOR_STAGES: [(&str, Calculator); 4] = [
    ("bollinger", bollinger_bands),
    ("macd", macd_signal),
    ("rsi", rsi_features),
    ("trend_strength", trend_strength),
];

/// Row accounting for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Leading output rows with at least one undefined field.
    pub warm_up: usize,
    /// Output rows anywhere with at least one undefined field.
    pub incomplete: usize,
}

/// Everything a pipeline run produced, intermediate tables included.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub indicators: Vec<IndicatorTable>,
    pub joined: JoinedTable,
    pub features: FeatureTable,
    pub trace: Vec<StageReport>,
}

impl PipelineRun {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.trace.iter().find(|r| r.stage == name)
    }
}

pub struct FeaturePipeline<'a> {
    config: &'a FeatureConfig,
}

impl<'a> FeaturePipeline<'a> {
    pub fn new(config: &'a FeatureConfig) -> Self {
        Self { config }
    }

    /// Run every stage.  `raw` supplies the label and the `Close` column;
    /// `lookahead` is the label horizon in rows.
    pub fn run(&self, quotes: &[Quote], raw: &PriceTable, lookahead: usize) -> PipelineRun {
        let mut trace = Vec::with_capacity(INDICATOR_STAGES.len() + 3);

        let indicators = self.indicator_tables(quotes, &mut trace);
        let mut joined = join_on_date(&indicators);
        trace.push(joined_report(
            "join",
            indicators.iter().map(IndicatorTable::len).max().unwrap_or(0),
            &joined,
        ));

        let rows_in = joined.len();
        attach_labels(&mut joined, raw, lookahead);
        trace.push(joined_report("label", rows_in, &joined));

        let features = drop_undefined(&joined);
        trace.push(StageReport {
            stage: "drop_undefined",
            rows_in: joined.len(),
            rows_out: features.len(),
            warm_up: 0,
            incomplete: 0,
        });

        log_trace(&trace);
        info!(
            ticker = %raw.ticker,
            quotes = quotes.len(),
            rows = features.len(),
            lookahead,
            "feature table assembled"
        );

        PipelineRun {
            indicators,
            joined,
            features,
            trace,
        }
    }

    /// Indicator stages and the join only, for scoring.  No label is
    /// attached, so the newest quotes are not lost to the label horizon.
    pub fn run_unlabelled(&self, quotes: &[Quote]) -> UnlabelledRun {
        let mut trace = Vec::with_capacity(INDICATOR_STAGES.len() + 1);

        let indicators = self.indicator_tables(quotes, &mut trace);
        let joined = join_on_date(&indicators);
        trace.push(joined_report(
            "join",
            indicators.iter().map(IndicatorTable::len).max().unwrap_or(0),
            &joined,
        ));
        log_trace(&trace);

        let latest = joined.latest_complete_features();
        UnlabelledRun {
            joined,
            latest,
            trace,
        }
    }

    fn indicator_tables(&self, quotes: &[Quote], trace: &mut Vec<StageReport>) -> Vec<IndicatorTable> {
        INDICATOR_STAGES
            .iter()
            .map(|&(stage, calculate)| {
                let table = calculate(quotes, self.config);
                trace.push(StageReport {
                    stage,
                    rows_in: quotes.len(),
                    rows_out: table.len(),
                    warm_up: table.warm_up(),
                    incomplete: table
                        .rows
                        .iter()
                        .filter(|r| r.values.iter().any(Option::is_none))
                        .count(),
                });
                table
            })
            .collect()
    }
}

/// Output of [`FeaturePipeline::run_unlabelled`].
#[derive(Debug, Clone)]
pub struct UnlabelledRun {
    pub joined: JoinedTable,
    /// Newest row with every indicator defined.
    pub latest: Option<FeatureVector>,
    pub trace: Vec<StageReport>,
}

fn log_trace(trace: &[StageReport]) {
    for report in trace {
        debug!(
            stage = report.stage,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            warm_up = report.warm_up,
            incomplete = report.incomplete,
            "pipeline stage"
        );
    }
}

/// Convenience wrapper returning only the final feature table.
pub fn compute_features(
    quotes: &[Quote],
    raw: &PriceTable,
    config: &FeatureConfig,
    lookahead: usize,
) -> FeatureTable {
    FeaturePipeline::new(config).run(quotes, raw, lookahead).features
}

// =============================================================================
// Stages
// =============================================================================

/// Inner join on date: only dates present in every table survive, and the
/// joined values are the tables' columns concatenated in order.
pub fn join_on_date(tables: &[IndicatorTable]) -> JoinedTable {
    let Some((first, rest)) = tables.split_first() else {
        return JoinedTable::default();
    };

    let mut merged: BTreeMap<_, Vec<Option<f64>>> = first
        .rows
        .iter()
        .map(|r| (r.date, r.values.clone()))
        .collect();

    for table in rest {
        let by_date: HashMap<_, _> = table.rows.iter().map(|r| (r.date, &r.values)).collect();
        merged.retain(|date, _| by_date.contains_key(date));
        for (date, values) in merged.iter_mut() {
            values.extend(by_date[date].iter().copied());
        }
    }

    JoinedTable {
        columns: tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.to_string()))
            .collect(),
        rows: merged
            .into_iter()
            .map(|(date, values)| JoinedRow {
                date,
                values,
                close_trend: None,
                close: None,
            })
            .collect(),
    }
}

/// Attach `Close Trend` and raw `Close` by date from the raw price table.
pub fn attach_labels(joined: &mut JoinedTable, raw: &PriceTable, lookahead: usize) {
    let labels: HashMap<_, _> = close_trend(raw, lookahead).into_iter().collect();
    for row in &mut joined.rows {
        row.close_trend = labels.get(&row.date).copied().flatten();
        row.close = raw.close_on(row.date);
    }
}

/// Keep only rows where every feature, the label and the close are defined.
pub fn drop_undefined(joined: &JoinedTable) -> FeatureTable {
    let rows = joined
        .rows
        .iter()
        .filter_map(|r| {
            let features = r.values.iter().copied().collect::<Option<Vec<f64>>>()?;
            Some(FeatureRow {
                date: r.date,
                features,
                close_trend: r.close_trend?,
                close: r.close?,
            })
        })
        .collect();

    FeatureTable {
        feature_columns: joined.columns.clone(),
        rows,
    }
}

fn joined_report(stage: &'static str, rows_in: usize, joined: &JoinedTable) -> StageReport {
    StageReport {
        stage,
        rows_in,
        rows_out: joined.len(),
        warm_up: joined
            .rows
            .iter()
            .position(|r| r.values.iter().all(Option::is_some))
            .unwrap_or(joined.len()),
        incomplete: joined.rows.iter().filter(|r| !r.is_complete()).count(),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testutil::{date, linear_closes, quotes_from_closes, table_from_closes, wave_closes};
    use crate::features::{bollinger, macd, trend_strength as ts};
    use crate::table::{CLOSE, CLOSE_TREND};

    fn run(closes: &[f64], lookahead: usize) -> PipelineRun {
        let quotes = quotes_from_closes(closes);
        let raw = table_from_closes(closes);
        FeaturePipeline::new(&FeatureConfig::default()).run(&quotes, &raw, lookahead)
    }

    #[test]
    fn every_row_is_complete_and_bounded_by_smallest_table() {
        let run = run(&wave_closes(200), 5);
        let smallest = run.indicators.iter().map(IndicatorTable::len).min().unwrap();
        assert!(run.features.len() <= smallest);
        assert!(!run.features.is_empty());
        for row in &run.features.rows {
            assert_eq!(row.features.len(), run.features.feature_columns.len());
            assert!(row.features.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn rows_span_longest_warm_up_to_label_horizon() {
        let config = FeatureConfig::default();
        let run = run(&wave_closes(200), 5);
        // MACD area change has the longest warm-up (47); the last 5 rows have
        // no label.
        assert_eq!(run.features.rows.first().unwrap().date, date(config.macd_warm_up()));
        assert_eq!(run.features.rows.last().unwrap().date, date(200 - 1 - 5));
        assert_eq!(run.features.len(), 200 - 47 - 5);
    }

    #[test]
    fn trace_records_each_stage() {
        let run = run(&wave_closes(120), 5);
        let names: Vec<_> = run.trace.iter().map(|r| r.stage).collect();
        assert_eq!(
            names,
            vec!["bollinger", "macd", "rsi", "trend_strength", "join", "label", "drop_undefined"]
        );
        assert_eq!(run.stage("bollinger").unwrap().warm_up, 19);
        assert_eq!(run.stage("rsi").unwrap().warm_up, 33);
        assert_eq!(run.stage("trend_strength").unwrap().warm_up, 27);
        assert_eq!(run.stage("macd").unwrap().warm_up, 47);
        assert_eq!(run.stage("join").unwrap().warm_up, 47);
        assert_eq!(run.stage("drop_undefined").unwrap().rows_out, 120 - 47 - 5);
    }

    #[test]
    fn feature_columns_in_join_order() {
        let run = run(&wave_closes(80), 5);
        let cols = run.features.columns();
        assert_eq!(cols.first().map(String::as_str), Some(bollinger::SMA));
        assert_eq!(cols[4], macd::MACD_VALUE);
        assert_eq!(cols[cols.len() - 3], ts::MDI);
        assert_eq!(cols[cols.len() - 2], CLOSE_TREND);
        assert_eq!(cols[cols.len() - 1], CLOSE);
        assert_eq!(run.features.feature_columns.len(), 16);
    }

    #[test]
    fn labels_and_close_come_from_raw_table() {
        let closes = wave_closes(120);
        let run = run(&closes, 5);
        for row in &run.features.rows {
            let i = (row.date - date(0)).num_days() as usize;
            assert_eq!(row.close, closes[i]);
            assert_eq!(row.close_trend, u8::from(closes[i + 5] > closes[i]));
        }
    }

    #[test]
    fn join_intersects_dates() {
        let mut a = IndicatorTable::new("a", &["A"]);
        let mut b = IndicatorTable::new("b", &["B"]);
        for i in 0..5 {
            a.push(date(i), vec![Some(i as f64)]);
        }
        for i in 2..8 {
            b.push(date(i), vec![Some(10.0 * i as f64)]);
        }
        let joined = join_on_date(&[a, b]);
        assert_eq!(joined.columns, vec!["A", "B"]);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.rows[0].date, date(2));
        assert_eq!(joined.rows[0].values, vec![Some(2.0), Some(20.0)]);
    }

    #[test]
    fn linear_rise_scenario() {
        // 60 days rising one unit per day from 100 to 159.
        let closes = linear_closes(60);
        let run = run(&closes, 5);

        let bb = &run.indicators[0];
        assert!((bb.value(59, bollinger::SMA).unwrap() - 149.5).abs() < 1e-10);

        let rsi = &run.indicators[2];
        assert!((rsi.value(59, crate::features::rsi::RSI).unwrap() - 100.0).abs() < 1e-10);

        // Every defined label is 1 (price always rises).
        assert!(run
            .joined
            .rows
            .iter()
            .filter_map(|r| r.close_trend)
            .all(|l| l == 1));

        // The RSI never moves, so its z-score is undefined and no row is
        // complete.
        assert!(run.features.is_empty());
        assert_eq!(
            run.joined.never_defined_column().as_deref(),
            Some(crate::features::rsi::RSI_Z_SCORE)
        );
    }

    #[test]
    fn unlabelled_run_reaches_newest_quote() {
        let closes = wave_closes(90);
        let quotes = quotes_from_closes(&closes);
        let run = FeaturePipeline::new(&FeatureConfig::default()).run_unlabelled(&quotes);

        let latest = run.latest.unwrap();
        assert_eq!(latest.date, date(89));
        assert_eq!(latest.values.len(), 16);
        assert_eq!(run.trace.last().unwrap().stage, "join");
        assert!(run.joined.rows.iter().all(|r| r.close_trend.is_none()));
    }

    #[test]
    fn unlabelled_run_of_short_history_has_no_row() {
        let quotes = quotes_from_closes(&wave_closes(40));
        let run = FeaturePipeline::new(&FeatureConfig::default()).run_unlabelled(&quotes);
        assert!(run.latest.is_none());
        assert_eq!(run.joined.never_defined_feature().as_deref(), Some(macd::MACD_AREA_SUM));
    }
}
