//! Simple Moving Average (SMA).
//!
//! Mean of closes over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];
        if n < self.period {
            return result;
        }

        let p = self.period as f64;
        for (i, window) in closes.windows(self.period).enumerate() {
            result[i + self.period - 1] = Some(window.iter().sum::<f64>() / p);
        }
        result
    }
}
