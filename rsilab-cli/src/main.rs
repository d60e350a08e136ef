//! rsilab CLI — run RSI strategy backtests.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file or named preset
//! - `presets`: list the named presets and their parameters

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rsilab_core::StrategyPreset;
use rsilab_runner::{
    format_summary, run_backtest, save_artifacts, BacktestConfig, BacktestResult, DataSource,
};

#[derive(Parser)]
#[command(name = "rsilab", about = "RSI momentum strategy backtester")]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or named preset.
    Run(RunArgs),
    /// List named presets.
    Presets,
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named preset: classic, classic_net, trend_filtered.
    #[arg(long)]
    preset: Option<String>,

    /// CSV price file. Overrides `data` in the config file.
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Use a synthetic random walk instead of real prices.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Symbol. Defaults to SPY with --preset.
    #[arg(long)]
    symbol: Option<String>,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<String>,

    /// Cost per unit of trade, as a fraction of notional.
    #[arg(long)]
    cost_rate: Option<f64>,

    /// Output directory for artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Print the summary only; write no files.
    #[arg(long, default_value_t = false)]
    no_artifacts: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Presets => {
            print_presets();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid {flag} date '{value}', expected YYYY-MM-DD"))
}

/// Merge the config source and command-line overrides into one config.
fn build_config(args: &RunArgs) -> Result<BacktestConfig> {
    let mut config = match (&args.config, &args.preset) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (None, None) => bail!("one of --config or --preset is required"),
        (Some(path), None) => BacktestConfig::from_file(path)?,
        (None, Some(name)) => {
            let preset = StrategyPreset::from_name(name)?;
            BacktestConfig::from_preset(preset, args.symbol.as_deref().unwrap_or("SPY"))
        }
    };

    if let Some(symbol) = &args.symbol {
        config.backtest.symbol = symbol.clone();
    }
    if let Some(start) = &args.start {
        config.backtest.start_date = Some(parse_date("--start", start)?);
    }
    if let Some(end) = &args.end {
        config.backtest.end_date = Some(parse_date("--end", end)?);
    }
    if let Some(cost_rate) = args.cost_rate {
        config.strategy.cost_rate = Some(cost_rate);
    }
    // Overrides can invalidate a config that parsed cleanly.
    let engine_config = config.engine_config()?;
    tracing::debug!(
        symbol = %config.backtest.symbol,
        period = engine_config.period,
        cost_rate = engine_config.cost_rate,
        config_hash = %engine_config.fingerprint(),
        "resolved configuration"
    );
    Ok(config)
}

fn data_source(args: &RunArgs) -> Option<DataSource> {
    if args.synthetic {
        Some(DataSource::Synthetic)
    } else {
        args.data.clone().map(DataSource::Csv)
    }
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let result = run_backtest(&config, data_source(&args))?;

    print_summary(&result);

    if !args.no_artifacts {
        let run_dir = save_artifacts(&result, &args.output_dir)?;
        tracing::info!(dir = %run_dir.display(), "artifacts written");
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:                {}", result.symbol);
    println!(
        "Period:                {} to {}",
        result.start_date, result.end_date
    );
    println!(
        "Bars:                  {} ({} warmup)",
        result.bar_count, result.warmup_bars
    );
    println!("Trades:                {}", result.stats.trade_count);
    println!();
    println!("--- Performance (net of costs) ---");
    for line in format_summary(&result.metrics) {
        println!("{line}");
    }
    println!();
    println!(
        "Buy & Hold Return:     {:.2}%",
        result.benchmark_metrics.total_return * 100.0
    );
    println!(
        "Outperforms:           {}",
        if result.outperforms_benchmark { "yes" } else { "no" }
    );
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_presets() {
    println!(
        "{:<16} {:>6} {:>9} {:>11} {:>8} {:>8}",
        "preset", "period", "oversold", "overbought", "trend", "cost"
    );
    for preset in StrategyPreset::ALL {
        let c = preset.to_config();
        let trend = if c.enable_trend_filter {
            format!("sma{}", c.trend_window)
        } else {
            "off".to_string()
        };
        println!(
            "{:<16} {:>6} {:>9} {:>11} {:>8} {:>8}",
            preset.name(),
            c.period,
            c.oversold,
            c.overbought,
            trend,
            c.cost_rate
        );
    }
}
