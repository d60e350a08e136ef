//! Signal generation — maps oscillator readings to a discrete decision per day.
//!
//! Decisions use only values at or before the timestamp they are made for.
//! They never see returns, positions or costs.

pub mod trend_filter;

pub use trend_filter::TrendFilter;

use serde::{Deserialize, Serialize};

use crate::domain::Signal;

/// How a decision carries over between days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    /// Recomputed every day from the current condition; a day that meets
    /// neither condition is flat regardless of the day before.
    #[default]
    Momentary,
    /// A long or short decision persists until the opposite one fires.
    Hold,
}

/// Oscillator entry thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Thresholds {
    pub fn new(oversold: f64, overbought: f64) -> Self {
        Self {
            oversold,
            overbought,
        }
    }
}

/// Threshold rule on the oscillator, optionally gated by a trend filter.
#[derive(Debug, Clone)]
pub struct RsiThresholdSignal {
    thresholds: Thresholds,
    mode: SignalMode,
}

impl RsiThresholdSignal {
    pub fn new(thresholds: Thresholds, mode: SignalMode) -> Self {
        Self { thresholds, mode }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    /// Decision from a single day's readings, ignoring any earlier day.
    ///
    /// `trend` is `None` when the filter is disabled and `Some(reference)`
    /// when enabled, where the reference itself may be undefined.
    pub fn decide(&self, close: f64, oscillator: Option<f64>, trend: Option<Option<f64>>) -> Signal {
        let Some(osc) = oscillator else {
            return Signal::Flat;
        };

        let raw = if osc < self.thresholds.oversold {
            Signal::Long
        } else if osc > self.thresholds.overbought {
            Signal::Short
        } else {
            Signal::Flat
        };

        match trend {
            Some(reference) if !TrendFilter::permits(raw, close, reference) => Signal::Flat,
            _ => raw,
        }
    }

    /// Signal series aligned to `closes`.
    ///
    /// `trend` must be the same length as `closes` when present.
    pub fn generate(
        &self,
        closes: &[f64],
        oscillator: &[Option<f64>],
        trend: Option<&[Option<f64>]>,
    ) -> Vec<Signal> {
        debug_assert_eq!(closes.len(), oscillator.len());
        let mut signals = Vec::with_capacity(closes.len());
        let mut held = Signal::Flat;

        for (i, (&close, &osc)) in closes.iter().zip(oscillator).enumerate() {
            let reference = trend.map(|t| t[i]);
            let decision = self.decide(close, osc, reference);
            let signal = match self.mode {
                SignalMode::Momentary => decision,
                SignalMode::Hold => {
                    if !decision.is_flat() {
                        held = decision;
                    }
                    held
                }
            };
            signals.push(signal);
        }

        signals
    }
}
