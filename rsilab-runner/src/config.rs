//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! data = "data/spy.csv"
//! start_date = "2015-01-01"
//! end_date = "2024-12-31"
//!
//! [strategy]
//! preset = "trend_filtered"
//! cost_rate = 0.0005
//! ```
//!
//! Every `[strategy]` key is optional. Keys override the preset when one is
//! named, and the engine defaults otherwise.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rsilab_core::signals::SignalMode;
use rsilab_core::{ConfigError, EngineConfig, StrategyPreset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_loader::{DataSource, LoadOptions};

/// Errors from reading or resolving a config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid strategy: {0}")]
    Strategy(#[from] ConfigError),
}

/// Complete backtest configuration as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategySection,
}

/// What to run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    pub symbol: String,
    /// CSV price file. Relative paths resolve against the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Strategy parameters. Unset fields fall back to the preset, then to
/// [`EngineConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oversold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overbought: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_trend_filter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_mode: Option<SignalMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_days_per_year: Option<f64>,
}

impl StrategySection {
    /// Resolve preset and overrides into a validated engine config.
    pub fn resolve(&self) -> Result<EngineConfig, ConfigError> {
        let base = match &self.preset {
            Some(name) => StrategyPreset::from_name(name)?.to_config(),
            None => EngineConfig::default(),
        };
        let config = EngineConfig {
            period: self.period.unwrap_or(base.period),
            oversold: self.oversold.unwrap_or(base.oversold),
            overbought: self.overbought.unwrap_or(base.overbought),
            enable_trend_filter: self.enable_trend_filter.unwrap_or(base.enable_trend_filter),
            trend_window: self.trend_window.unwrap_or(base.trend_window),
            cost_rate: self.cost_rate.unwrap_or(base.cost_rate),
            signal_mode: self.signal_mode.unwrap_or(base.signal_mode),
            trading_days_per_year: self
                .trading_days_per_year
                .unwrap_or(base.trading_days_per_year),
        };
        config.validate()?;
        Ok(config)
    }
}

impl BacktestConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string. The strategy section is resolved eagerly so
    /// a bad preset name or parameter fails here, not mid-run.
    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(content)?;
        config.strategy.resolve()?;
        Ok(config)
    }

    /// A config that runs a named preset with no overrides.
    pub fn from_preset(preset: StrategyPreset, symbol: impl Into<String>) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                data: None,
                start_date: None,
                end_date: None,
            },
            strategy: StrategySection {
                preset: Some(preset.name().to_string()),
                ..Default::default()
            },
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.strategy.resolve()
    }

    /// CSV source named in the file, if any.
    pub fn data_source(&self) -> Option<DataSource> {
        self.backtest.data.clone().map(DataSource::Csv)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            start: self.backtest.start_date,
            end: self.backtest.end_date,
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
