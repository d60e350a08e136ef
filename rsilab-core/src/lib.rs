//! rsilab core — momentum-oscillator strategy evaluation over daily closes.
//!
//! This crate contains the whole computation and nothing else:
//! - Domain types (bars, validated price series, signals)
//! - Rolling-mean RSI and the SMA trend reference
//! - Threshold signal generation with optional trend gating
//! - Lagged return simulation and the per-trade cost model
//! - Performance metrics
//! - `Engine`, which composes the stages for one configuration
//!
//! There is no I/O here. Loading prices and rendering results belong to
//! `rsilab-runner` and `rsilab-cli`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod signals;
pub mod simulation;

pub use domain::{Bar, PriceSeries, RawBar, SeriesError, Signal};
pub use engine::{ConfigError, Engine, EngineConfig, EngineOutput, StrategyPreset};
pub use metrics::MetricsSnapshot;
