//! Per-trade friction charged against strategy return.
//!
//! A trade is any change in signal between consecutive days. Its size is the
//! absolute change: 1 to open or close, 2 to reverse. The cost is charged on
//! the day the signal changes, one day before the new position earns return.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;

/// Flat fractional cost per unit of signal change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Fraction of notional per unit traded (0.001 = 10 bps).
    pub cost_rate: f64,
}

impl CostModel {
    pub fn new(cost_rate: f64) -> Self {
        Self { cost_rate }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0)
    }

    /// Absolute signal change per timestamp. Index 0 has no prior signal and is 0.
    pub fn trade_indicator(signals: &[Signal]) -> Vec<u8> {
        let mut trades = Vec::with_capacity(signals.len());
        if signals.is_empty() {
            return trades;
        }
        trades.push(0);
        trades.extend(signals.windows(2).map(|w| w[1].change_from(w[0])));
        trades
    }

    /// Cost of a trade of the given size.
    pub fn trade_cost(&self, size: u8) -> f64 {
        f64::from(size) * self.cost_rate
    }

    /// Gross return minus trade cost. Undefined gross stays undefined.
    pub fn net_returns(&self, gross: &[Option<f64>], trades: &[u8]) -> Vec<Option<f64>> {
        debug_assert_eq!(gross.len(), trades.len());
        gross
            .iter()
            .zip(trades)
            .map(|(g, &t)| g.map(|g| if t == 0 { g } else { g - self.trade_cost(t) }))
            .collect()
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(0.001)
    }
}
