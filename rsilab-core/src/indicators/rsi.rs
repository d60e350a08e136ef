//! Relative Strength Index (RSI), rolling-mean variant.
//!
//! Average gain and average loss are plain means over the trailing `period`
//! close-to-close changes, not Wilder-smoothed.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period. The first close has no prior change, so the first
//! window of `period` real changes closes at index `period`.
//! Edge cases: avg_loss == 0 → 100; avg_gain == avg_loss == 0 → undefined.

use std::collections::VecDeque;

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    /// `period` must be >= 1; `EngineConfig::validate` enforces this upstream.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trailing sum over the last `period` values of one side (gains or losses).
///
/// Tracks how many values in the window are nonzero. When none are, the sum
/// is reset to exactly 0.0 so a one-sided window saturates cleanly instead of
/// carrying running-sum residue.
#[derive(Debug)]
struct TrailingSum {
    window: VecDeque<f64>,
    sum: f64,
    nonzero: usize,
}

impl TrailingSum {
    fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            nonzero: 0,
        }
    }

    fn push(&mut self, value: f64, period: usize) {
        self.window.push_back(value);
        self.sum += value;
        if value != 0.0 {
            self.nonzero += 1;
        }
        if self.window.len() > period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
                if old != 0.0 {
                    self.nonzero -= 1;
                }
            }
        }
        if self.nonzero == 0 {
            self.sum = 0.0;
        }
    }

    fn is_full(&self, period: usize) -> bool {
        self.window.len() == period
    }

    fn mean(&self, period: usize) -> f64 {
        (self.sum / period as f64).max(0.0)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n <= self.period {
            return result;
        }

        let mut gains = TrailingSum::new(self.period);
        let mut losses = TrailingSum::new(self.period);
        for (i, pair) in closes.windows(2).enumerate() {
            let change = pair[1] - pair[0];
            gains.push(if change > 0.0 { change } else { 0.0 }, self.period);
            losses.push(if change < 0.0 { -change } else { 0.0 }, self.period);

            if gains.is_full(self.period) {
                result[i + 1] = oscillator(gains.mean(self.period), losses.mean(self.period));
            }
        }

        result
    }
}

/// Map average gain and loss onto [0, 100].
pub fn oscillator(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        None
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}
