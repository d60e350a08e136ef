//! Composes the pure pipeline stages over one price series.
//!
//! oscillator → (trend reference) → signals → lagged positions →
//! gross returns → trade indicator → net returns → cumulative curves → metrics.
//! Every stage returns a new vector; the input series is never touched.

pub mod config;
pub mod pipeline;

pub use config::{ConfigError, EngineConfig, StrategyPreset};
pub use pipeline::{Engine, EngineOutput, SignalStats, SimulationSeries};
