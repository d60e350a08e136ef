//! rsilab runner: everything around the engine that touches the outside world.
//!
//! This crate builds on `rsilab-core` to provide:
//! - TOML backtest configuration with named presets
//! - CSV price loading with cleaning, or a synthetic random walk
//! - Dataset and config hashes for provenance
//! - Single-backtest runner producing a versioned `BacktestResult`
//! - JSON / CSV / Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{BacktestConfig, BacktestSection, ConfigFileError, StrategySection};
pub use data_loader::{load_prices, DataSource, LoadError, LoadOptions, LoadedData};
pub use export::{
    export_json, export_series_csv, format_summary, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{run_backtest, run_backtest_on_data, BacktestResult, RunError, SCHEMA_VERSION};
