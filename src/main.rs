// =============================================================================
// trend-features — Command Line Entry Point
// =============================================================================
//
// Every subcommand writes its result as JSON on stdout; logs go to stderr.
// =============================================================================

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trend_features::labels::train_test_split;
use trend_features::market_data::yahoo::DEFAULT_BASE_URL;
use trend_features::pipeline::StageReport;
use trend_features::{
    load_quotes, load_vix, predict_next, FeatureConfig, FeaturePipeline, FeatureTable,
    LinearClassifier, YahooClient,
};

const DEFAULT_CONFIG_PATH: &str = "feature_config.json";

#[derive(Debug, Parser)]
#[command(name = "trend-features", version, about = "Technical-indicator feature tables for daily trend classification")]
struct Cli {
    /// Feature config file (JSON). Falls back to $TREND_FEATURES_CONFIG,
    /// then ./feature_config.json, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the labelled feature table for a ticker.
    Features {
        ticker: String,
        /// History range, e.g. max, 5y, 1y.
        #[arg(long)]
        range: Option<String>,
        /// Label look-ahead in trading days.
        #[arg(long, value_parser = parse_lookahead)]
        lookahead: Option<usize>,
        /// Include the per-stage row trace.
        #[arg(long)]
        trace: bool,
    },
    /// Build the feature table and split it chronologically.
    Split {
        ticker: String,
        #[arg(long)]
        range: Option<String>,
        #[arg(long, value_parser = parse_lookahead)]
        lookahead: Option<usize>,
        /// Share of rows used for training, strictly between 0 and 1.
        #[arg(long)]
        fraction: Option<f64>,
    },
    /// Load the full ^VIX history.
    Vix,
    /// Classify the newest complete feature row of a ticker.
    Predict {
        ticker: String,
        /// Linear model exported as JSON.
        #[arg(long)]
        model: PathBuf,
    },
    /// Write the default feature config.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct FeaturesOutput<'a> {
    ticker: &'a str,
    lookahead: usize,
    columns: Vec<String>,
    table: &'a FeatureTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [StageReport]>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var("TREND_FEATURES_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if let Command::InitConfig { force } = cli.command {
        if config_path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            );
        }
        FeatureConfig::default().save(&config_path)?;
        return Ok(());
    }

    // ── 2. Config & price source ─────────────────────────────────────────
    let config = if config_path.exists() {
        FeatureConfig::load(&config_path).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Failed to load config, using defaults");
            FeatureConfig::default()
        })
    } else {
        info!(path = %config_path.display(), "No config file, using defaults");
        FeatureConfig::default()
    };

    let base_url =
        std::env::var("TREND_FEATURES_YAHOO_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let source = YahooClient::with_base_url(base_url)?;

    // ── 3. Dispatch ──────────────────────────────────────────────────────
    match cli.command {
        Command::Features {
            ticker,
            range,
            lookahead,
            trace,
        } => {
            let range = range.unwrap_or_else(|| config.history_range.clone());
            let lookahead = lookahead.unwrap_or(config.label_lookahead_period);

            let loaded = load_quotes(&source, &ticker, &range).await?;
            let run = FeaturePipeline::new(&config).run(&loaded.quotes, &loaded.raw, lookahead);
            if run.features.is_empty() {
                warn!(
                    ticker = %ticker,
                    quotes = loaded.len(),
                    required = config.min_history(lookahead),
                    "feature table is empty"
                );
            }

            print_json(&FeaturesOutput {
                ticker: &ticker,
                lookahead,
                columns: run.features.columns(),
                table: &run.features,
                trace: trace.then_some(run.trace.as_slice()),
            })?;
        }

        Command::Split {
            ticker,
            range,
            lookahead,
            fraction,
        } => {
            let range = range.unwrap_or_else(|| config.history_range.clone());
            let lookahead = lookahead.unwrap_or(config.label_lookahead_period);
            let fraction = fraction.unwrap_or(config.split_fraction);

            let loaded = load_quotes(&source, &ticker, &range).await?;
            let features = FeaturePipeline::new(&config)
                .run(&loaded.quotes, &loaded.raw, lookahead)
                .features;
            let split = train_test_split(&features, fraction)?;

            info!(
                ticker = %ticker,
                train = split.y_train.len(),
                test = split.y_test.len(),
                "Chronological split ready"
            );
            print_json(&split)?;
        }

        Command::Vix => {
            let table = load_vix(&source).await?;
            print_json(&table.rows)?;
        }

        Command::Predict { ticker, model } => {
            let classifier = LinearClassifier::load(&model)?;
            let prediction = predict_next(&source, &ticker, &classifier, &config).await?;
            print_json(&prediction)?;
        }

        // Written before the config was loaded.
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

/// Look-ahead in trading days; zero would leave every label undefined.
fn parse_lookahead(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("look-ahead must be at least 1 trading day".to_string()),
        Ok(days) => Ok(days),
        Err(e) => Err(format!("invalid look-ahead '{value}': {e}")),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to write JSON to stdout")?;
    writeln!(out).context("failed to write to stdout")?;
    Ok(())
}
