//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-timestamp series for external analysis and plotting tools
//! - **Markdown**: human-readable single-run report
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rsilab_core::engine::SimulationSeries;
use rsilab_core::MetricsSnapshot;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

pub const SERIES_COLUMNS: [&str; 13] = [
    "date",
    "close",
    "oscillator",
    "trend_reference",
    "signal",
    "position",
    "market_return",
    "strategy_return",
    "trade",
    "net_return",
    "cumulative_market",
    "cumulative_strategy",
    "cumulative_net",
];

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export every per-timestamp series as CSV. Undefined values are empty cells.
pub fn export_series_csv(series: &SimulationSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SERIES_COLUMNS)?;

    for i in 0..series.len() {
        let trend = series
            .trend_reference
            .as_ref()
            .and_then(|t| t.get(i).copied().flatten());
        wtr.write_record([
            series.dates[i].to_string(),
            series.closes[i].to_string(),
            opt_cell(series.oscillator[i]),
            opt_cell(trend),
            series.signals[i].value().to_string(),
            series.positions[i]
                .map(|p| p.value().to_string())
                .unwrap_or_default(),
            opt_cell(series.market_returns[i]),
            opt_cell(series.strategy_returns[i]),
            series.trades[i].to_string(),
            opt_cell(series.net_returns[i]),
            series.cumulative_market[i].to_string(),
            series.cumulative_strategy[i].to_string(),
            series.cumulative_net[i].to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `series.csv`: per-timestamp series
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        result.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let series_csv = export_series_csv(&result.series)?;
    std::fs::write(run_dir.join("series.csv"), &series_csv)?;

    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Console summary ────────────────────────────────────────────────

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

/// Percentage-formatted summary lines for the net-of-cost metrics.
///
/// Sharpe is a plain ratio.
pub fn format_summary(metrics: &MetricsSnapshot) -> Vec<String> {
    vec![
        format!("Total Return:          {}", pct(metrics.total_return)),
        format!("Annualized Return:     {}", pct(metrics.annualized_return)),
        format!("Annualized Volatility: {}", pct(metrics.annualized_volatility)),
        format!("Sharpe Ratio:          {:.2}", metrics.sharpe_ratio),
        format!("Max Drawdown:          {}", pct(metrics.max_drawdown)),
    ]
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_date, result.end_date
    ));
    md.push_str(&format!(
        "| Bars | {} ({} warmup) |\n",
        result.bar_count, result.warmup_bars
    ));
    if result.dropped_rows > 0 {
        md.push_str(&format!("| Dropped Rows | {} |\n", result.dropped_rows));
    }
    md.push_str(&format!("| Source | {} |\n", result.source));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Config Hash | {} |\n", result.config_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    // Strategy
    let c = &result.config;
    md.push_str("## Strategy\n\n");
    md.push_str("| Parameter | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| RSI Period | {} |\n", c.period));
    md.push_str(&format!(
        "| Oversold / Overbought | {} / {} |\n",
        c.oversold, c.overbought
    ));
    if c.enable_trend_filter {
        md.push_str(&format!("| Trend Filter | SMA {} |\n", c.trend_window));
    } else {
        md.push_str("| Trend Filter | off |\n");
    }
    md.push_str(&format!("| Cost Rate | {} |\n", c.cost_rate));
    md.push_str(&format!("| Signal Mode | {:?} |\n", c.signal_mode));
    md.push('\n');

    // Performance
    let (n, g, b) = (
        &result.metrics,
        &result.gross_metrics,
        &result.benchmark_metrics,
    );
    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Net | Gross | Buy & Hold |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    md.push_str(&format!(
        "| Total Return | {} | {} | {} |\n",
        pct(n.total_return),
        pct(g.total_return),
        pct(b.total_return)
    ));
    md.push_str(&format!(
        "| Annualized Return | {} | {} | {} |\n",
        pct(n.annualized_return),
        pct(g.annualized_return),
        pct(b.annualized_return)
    ));
    md.push_str(&format!(
        "| Annualized Volatility | {} | {} | {} |\n",
        pct(n.annualized_volatility),
        pct(g.annualized_volatility),
        pct(b.annualized_volatility)
    ));
    md.push_str(&format!(
        "| Sharpe | {:.3} | {:.3} | {:.3} |\n",
        n.sharpe_ratio, g.sharpe_ratio, b.sharpe_ratio
    ));
    md.push_str(&format!(
        "| Max Drawdown | {} | {} | {} |\n",
        pct(n.max_drawdown),
        pct(g.max_drawdown),
        pct(b.max_drawdown)
    ));
    md.push('\n');
    md.push_str(&format!(
        "Outperforms buy & hold: **{}**\n\n",
        if result.outperforms_benchmark { "yes" } else { "no" }
    ));

    // Signal activity
    let s = &result.stats;
    md.push_str("## Signal Activity\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Long Days | {} |\n", s.long_days));
    md.push_str(&format!("| Short Days | {} |\n", s.short_days));
    md.push_str(&format!("| Flat Days | {} |\n", s.flat_days));
    md.push_str(&format!("| Trades | {} |\n", s.trade_count));
    md.push_str(&format!("| Turnover | {} |\n", s.turnover));
    md.push_str(&format!("| Total Cost | {} |\n", pct(s.total_cost)));
    md.push_str(&format!("| Exposure | {:.1}% |\n", s.exposure * 100.0));
    md.push('\n');

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{dataset_hash, DataSource, LoadedData};
    use crate::runner::run_backtest_on_data;
    use chrono::NaiveDate;
    use rsilab_core::{EngineConfig, PriceSeries};

    fn sample_result() -> BacktestResult {
        let series = PriceSeries::from_closes(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &[100.0, 98.0, 97.0, 99.0, 102.0, 104.0, 101.0, 99.0],
        )
        .unwrap();
        let loaded = LoadedData {
            dataset_hash: dataset_hash(&series),
            series,
            source: DataSource::Csv(PathBuf::from("spy.csv")),
            dropped_rows: 1,
            has_synthetic: false,
        };
        let config = EngineConfig {
            period: 2,
            enable_trend_filter: true,
            trend_window: 3,
            ..Default::default()
        };
        run_backtest_on_data(&config, &loaded).unwrap()
    }

    // ─── JSON ───────────────────────────────────────────────────────

    #[test]
    fn json_roundtrip() {
        let result = sample_result();
        let json = export_json(&result).unwrap();
        let loaded = import_json(&json).unwrap();
        assert_eq!(loaded.symbol, result.symbol);
        assert_eq!(loaded.config, result.config);
        assert_eq!(loaded.series.signals, result.series.signals);
        assert_eq!(loaded.series.positions, result.series.positions);
        assert_eq!(loaded.series.trades, result.series.trades);
        assert!((loaded.metrics.total_return - result.metrics.total_return).abs() < 1e-12);
    }

    #[test]
    fn json_rejects_unknown_version() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&result).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn json_signals_are_integers() {
        let json = export_json(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let signals = value["series"]["signals"].as_array().unwrap();
        assert!(signals.iter().all(|s| s.is_i64()));
        assert!(value["series"]["positions"][0].is_null());
    }

    // ─── CSV ────────────────────────────────────────────────────────

    #[test]
    fn csv_has_all_columns_and_rows() {
        let result = sample_result();
        let csv = export_series_csv(&result.series).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), SERIES_COLUMNS.join(","));
        assert_eq!(lines.count(), result.bar_count);
    }

    #[test]
    fn csv_undefined_values_are_empty() {
        let csv = export_series_csv(&sample_result().series).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let first = rdr.records().next().unwrap().unwrap();
        assert_eq!(&first[0], "2024-01-01");
        assert_eq!(&first[2], "", "oscillator undefined at index 0");
        assert_eq!(&first[3], "", "trend reference undefined at index 0");
        assert_eq!(&first[4], "0");
        assert_eq!(&first[5], "", "no position at index 0");
        assert_eq!(&first[6], "");
        assert_eq!(&first[8], "0");
        assert_eq!(&first[12], "1");
    }

    // ─── Summary / report ───────────────────────────────────────────

    #[test]
    fn summary_formats_percentages() {
        let metrics = MetricsSnapshot {
            total_return: 0.1234,
            annualized_return: 0.05,
            annualized_volatility: 0.2,
            sharpe_ratio: 0.25,
            max_drawdown: 0.1,
        };
        let lines = format_summary(&metrics);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("12.34%"));
        assert!(lines[2].ends_with("20.00%"));
        assert!(lines[3].ends_with("0.25"));
        assert!(lines[4].ends_with("10.00%"));
    }

    #[test]
    fn markdown_report_has_sections() {
        let md = generate_report(&sample_result());
        assert!(md.contains("# Backtest Report"));
        assert!(md.contains("## Metadata"));
        assert!(md.contains("## Strategy"));
        assert!(md.contains("## Performance"));
        assert!(md.contains("## Signal Activity"));
        assert!(md.contains("| Trend Filter | SMA 3 |"));
        assert!(md.contains("| Dropped Rows | 1 |"));
        assert!(!md.contains("SYNTHETIC"));
    }

    #[test]
    fn markdown_report_tags_synthetic() {
        let mut result = sample_result();
        result.has_synthetic = true;
        assert!(generate_report(&result).contains("**SYNTHETIC**"));
    }

    // ─── Save/load artifacts ────────────────────────────────────────

    #[test]
    fn save_load_artifacts_roundtrip() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();

        assert!(run_dir.join("manifest.json").exists());
        assert!(run_dir.join("series.csv").exists());
        assert!(run_dir.join("report.md").exists());

        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.symbol, result.symbol);
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert!((loaded.metrics.sharpe_ratio - result.metrics.sharpe_ratio).abs() < 1e-10);
    }
}
