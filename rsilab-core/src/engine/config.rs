//! Engine configuration, validation and named presets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::TRADING_DAYS_PER_YEAR;
use crate::signals::{SignalMode, Thresholds};

/// Invalid engine parameters, raised before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("oscillator period must be >= 1, got {0}")]
    InvalidPeriod(usize),

    #[error("trend window must be >= 1, got {0}")]
    InvalidTrendWindow(usize),

    #[error("{name} threshold must be a finite value in [0, 100], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("oversold threshold {oversold} is above overbought threshold {overbought}")]
    InvertedThresholds { oversold: f64, overbought: f64 },

    #[error("cost rate must be finite and >= 0, got {0}")]
    InvalidCostRate(f64),

    #[error("trading days per year must be finite and > 0, got {0}")]
    InvalidTradingDays(f64),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

/// All parameters of one strategy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub enable_trend_filter: bool,
    pub trend_window: usize,
    pub cost_rate: f64,
    pub signal_mode: SignalMode,
    pub trading_days_per_year: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            enable_trend_filter: false,
            trend_window: 200,
            cost_rate: 0.001,
            signal_mode: SignalMode::Momentary,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period < 1 {
            return Err(ConfigError::InvalidPeriod(self.period));
        }
        if self.trend_window < 1 {
            return Err(ConfigError::InvalidTrendWindow(self.trend_window));
        }
        for (name, value) in [("oversold", self.oversold), ("overbought", self.overbought)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.oversold > self.overbought {
            return Err(ConfigError::InvertedThresholds {
                oversold: self.oversold,
                overbought: self.overbought,
            });
        }
        if !self.cost_rate.is_finite() || self.cost_rate < 0.0 {
            return Err(ConfigError::InvalidCostRate(self.cost_rate));
        }
        if !self.trading_days_per_year.is_finite() || self.trading_days_per_year <= 0.0 {
            return Err(ConfigError::InvalidTradingDays(self.trading_days_per_year));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.oversold, self.overbought)
    }

    /// BLAKE3 hash of the canonical JSON form.
    ///
    /// Two configs with identical parameters share a fingerprint.
    pub fn fingerprint(&self) -> String {
        // Serializing a struct of plain numbers, bools and a unit enum cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Named parameter sets covering the usual ways this strategy is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreset {
    /// 30/70 thresholds, no trend filter, no costs.
    Classic,
    /// 30/70 thresholds, no trend filter, 0.1% per trade.
    ClassicNet,
    /// 45/75 thresholds gated by the 200-day SMA, 0.1% per trade.
    TrendFiltered,
}

impl StrategyPreset {
    pub const ALL: [StrategyPreset; 3] = [
        StrategyPreset::Classic,
        StrategyPreset::ClassicNet,
        StrategyPreset::TrendFiltered,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyPreset::Classic => "classic",
            StrategyPreset::ClassicNet => "classic_net",
            StrategyPreset::TrendFiltered => "trend_filtered",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    pub fn to_config(self) -> EngineConfig {
        let base = EngineConfig::default();
        match self {
            StrategyPreset::Classic => EngineConfig {
                cost_rate: 0.0,
                ..base
            },
            StrategyPreset::ClassicNet => base,
            StrategyPreset::TrendFiltered => EngineConfig {
                oversold: 45.0,
                overbought: 75.0,
                enable_trend_filter: true,
                trend_window: 200,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn all_presets_are_valid() {
        for preset in StrategyPreset::ALL {
            assert!(preset.to_config().validate().is_ok(), "{}", preset.name());
        }
    }

    #[test]
    fn preset_names_roundtrip() {
        for preset in StrategyPreset::ALL {
            assert_eq!(StrategyPreset::from_name(preset.name()).unwrap(), preset);
        }
        assert_eq!(
            StrategyPreset::from_name("donchian"),
            Err(ConfigError::UnknownPreset("donchian".into()))
        );
    }

    #[test]
    fn trend_filtered_preset_values() {
        let c = StrategyPreset::TrendFiltered.to_config();
        assert_eq!(c.oversold, 45.0);
        assert_eq!(c.overbought, 75.0);
        assert!(c.enable_trend_filter);
        assert_eq!(c.trend_window, 200);
        assert_eq!(c.cost_rate, 0.001);
    }

    #[test]
    fn rejects_zero_period() {
        let c = EngineConfig {
            period: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::InvalidPeriod(0)));
    }

    #[test]
    fn rejects_zero_trend_window() {
        let c = EngineConfig {
            trend_window: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::InvalidTrendWindow(0)));
    }

    #[test]
    fn rejects_bad_thresholds() {
        let c = EngineConfig {
            oversold: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "oversold", .. })
        ));

        let c = EngineConfig {
            overbought: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "overbought", .. })
        ));

        let c = EngineConfig {
            oversold: 80.0,
            overbought: 20.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvertedThresholds { .. })));
    }

    #[test]
    fn rejects_bad_cost_rate() {
        let c = EngineConfig {
            cost_rate: -0.001,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidCostRate(_))));
    }

    #[test]
    fn rejects_bad_trading_days() {
        let c = EngineConfig {
            trading_days_per_year: 0.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidTradingDays(_))));
    }

    #[test]
    fn fingerprint_is_deterministic_and_param_sensitive() {
        let a = EngineConfig::default();
        let b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = EngineConfig {
            period: 7,
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn partial_toml_like_json_fills_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"period": 10}"#).unwrap();
        assert_eq!(c.period, 10);
        assert_eq!(c.oversold, 30.0);
        assert!(serde_json::from_str::<EngineConfig>(r#"{"perod": 10}"#).is_err());
    }
}
