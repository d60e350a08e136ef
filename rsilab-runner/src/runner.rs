//! Backtest runner — wires together loading, the engine, and provenance.
//!
//! Two entry points:
//! - `run_backtest()`: resolves the config, loads prices, then runs. Used by the CLI.
//! - `run_backtest_on_data()`: takes pre-loaded prices and a resolved engine config. No I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rsilab_core::engine::{SignalStats, SimulationSeries};
use rsilab_core::{ConfigError, Engine, EngineConfig, MetricsSnapshot};

use crate::config::{BacktestConfig, ConfigFileError};
use crate::data_loader::{load_prices, DataSource, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    ConfigFile(#[from] ConfigFileError),
    #[error("strategy error: {0}")]
    Strategy(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("no price source for '{0}': set [backtest].data or use synthetic prices")]
    NoDataSource(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub source: DataSource,
    pub dataset_hash: String,
    pub config_hash: String,
    pub has_synthetic: bool,
    pub dropped_rows: usize,
    pub config: EngineConfig,
    /// Net of costs.
    pub metrics: MetricsSnapshot,
    pub gross_metrics: MetricsSnapshot,
    pub benchmark_metrics: MetricsSnapshot,
    pub outperforms_benchmark: bool,
    pub stats: SignalStats,
    pub series: SimulationSeries,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a backtest described by `config`.
///
/// `source` overrides the file's `data` entry; with neither, the run fails.
pub fn run_backtest(
    config: &BacktestConfig,
    source: Option<DataSource>,
) -> Result<BacktestResult, RunError> {
    let engine_config = config.engine_config()?;
    let symbol = &config.backtest.symbol;
    let source = source
        .or_else(|| config.data_source())
        .ok_or_else(|| RunError::NoDataSource(symbol.clone()))?;
    let loaded = load_prices(symbol, &source, &config.load_options())?;
    run_backtest_on_data(&engine_config, &loaded)
}

/// Run a backtest with pre-loaded prices. No I/O.
pub fn run_backtest_on_data(
    engine_config: &EngineConfig,
    loaded: &LoadedData,
) -> Result<BacktestResult, RunError> {
    let engine = Engine::new(engine_config.clone())?;
    let series = &loaded.series;

    if series.len() <= engine.warmup_bars() {
        tracing::warn!(
            symbol = series.symbol(),
            bars = series.len(),
            warmup = engine.warmup_bars(),
            "series is not longer than the warm-up; no signal can fire"
        );
    }

    let output = engine.run(series);
    let outperforms_benchmark = output.outperforms_benchmark();

    tracing::info!(
        symbol = series.symbol(),
        total_return = output.metrics.total_return,
        sharpe = output.metrics.sharpe_ratio,
        max_drawdown = output.metrics.max_drawdown,
        trades = output.stats.trade_count,
        outperforms_benchmark,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: series.symbol().to_string(),
        start_date: series.first_date(),
        end_date: series.last_date(),
        bar_count: series.len(),
        warmup_bars: engine.warmup_bars(),
        source: loaded.source.clone(),
        dataset_hash: loaded.dataset_hash.clone(),
        config_hash: engine_config.fingerprint(),
        has_synthetic: loaded.has_synthetic,
        dropped_rows: loaded.dropped_rows,
        config: engine_config.clone(),
        metrics: output.metrics,
        gross_metrics: output.gross_metrics,
        benchmark_metrics: output.benchmark_metrics,
        outperforms_benchmark,
        stats: output.stats,
        series: output.series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::dataset_hash;
    use rsilab_core::{PriceSeries, StrategyPreset};

    fn loaded(closes: &[f64]) -> LoadedData {
        let series =
            PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes)
                .unwrap();
        LoadedData {
            dataset_hash: dataset_hash(&series),
            series,
            source: DataSource::Synthetic,
            dropped_rows: 0,
            has_synthetic: true,
        }
    }

    #[test]
    fn result_carries_provenance() {
        let data = loaded(&[10.0, 11.0, 10.5, 9.0, 9.5, 10.0]);
        let config = EngineConfig {
            period: 2,
            ..Default::default()
        };
        let result = run_backtest_on_data(&config, &data).unwrap();
        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.symbol, "TEST");
        assert_eq!(result.bar_count, 6);
        assert_eq!(result.warmup_bars, 2);
        assert_eq!(result.dataset_hash, data.dataset_hash);
        assert_eq!(result.config_hash, config.fingerprint());
        assert!(result.has_synthetic);
        assert_eq!(result.series.len(), 6);
        assert_eq!(result.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(result.end_date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    }

    #[test]
    fn invalid_engine_config_fails_before_running() {
        let data = loaded(&[10.0, 11.0]);
        let config = EngineConfig {
            cost_rate: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            run_backtest_on_data(&config, &data),
            Err(RunError::Strategy(ConfigError::InvalidCostRate(_)))
        ));
    }

    #[test]
    fn short_series_still_runs() {
        let data = loaded(&[10.0, 11.0, 12.0]);
        let result =
            run_backtest_on_data(&StrategyPreset::TrendFiltered.to_config(), &data).unwrap();
        assert_eq!(result.stats.trade_count, 0);
        assert_eq!(result.metrics.total_return, 0.0);
    }

    #[test]
    fn no_source_is_an_error() {
        let config = BacktestConfig::from_preset(StrategyPreset::Classic, "SPY");
        assert!(matches!(
            run_backtest(&config, None),
            Err(RunError::NoDataSource(ref s)) if s == "SPY"
        ));
    }

    #[test]
    fn synthetic_run_respects_config_window() {
        let mut config = BacktestConfig::from_preset(StrategyPreset::ClassicNet, "SPY");
        config.backtest.start_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        config.backtest.end_date = NaiveDate::from_ymd_opt(2023, 6, 30);
        let result = run_backtest(&config, Some(DataSource::Synthetic)).unwrap();
        assert!(result.has_synthetic);
        assert!(result.start_date >= NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!(result.end_date <= NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
    }
}
