//! Trend filter — gates oscillator decisions by the prevailing trend.
//!
//! Longs pass only when the close is strictly above the long-window SMA,
//! shorts only when it is strictly below. An undefined reference blocks
//! every non-flat decision.

use crate::domain::Signal;
use crate::indicators::{Indicator, Sma};

#[derive(Debug, Clone)]
pub struct TrendFilter {
    sma: Sma,
}

impl TrendFilter {
    pub fn new(window: usize) -> Self {
        Self {
            sma: Sma::new(window),
        }
    }

    pub fn window(&self) -> usize {
        self.sma.period()
    }

    pub fn lookback(&self) -> usize {
        self.sma.lookback()
    }

    /// Trend reference series aligned to `closes`.
    pub fn reference(&self, closes: &[f64]) -> Vec<Option<f64>> {
        self.sma.compute(closes)
    }

    /// Whether `decision` is consistent with the trend at this timestamp.
    pub fn permits(decision: Signal, close: f64, reference: Option<f64>) -> bool {
        match (decision, reference) {
            (Signal::Flat, _) => true,
            (_, None) => false,
            (Signal::Long, Some(r)) => close > r,
            (Signal::Short, Some(r)) => close < r,
        }
    }
}
