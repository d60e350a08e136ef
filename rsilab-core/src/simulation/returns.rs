//! Daily returns and compounding.
//!
//! The position on day t is the signal from day t-1. A decision made on
//! day t's close therefore never earns day t's return. Index 0 has no prior
//! close and no prior signal, so its returns are undefined.

use crate::domain::Signal;

/// Simple daily percentage change of close. Index 0 is undefined.
pub fn market_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return returns;
    }
    returns.push(None);
    returns.extend(closes.windows(2).map(|w| Some((w[1] - w[0]) / w[0])));
    returns
}

/// Shift signals forward by one timestamp. Index 0 has no position.
pub fn lag_signals(signals: &[Signal]) -> Vec<Option<Signal>> {
    let mut positions = Vec::with_capacity(signals.len());
    if signals.is_empty() {
        return positions;
    }
    positions.push(None);
    positions.extend(signals[..signals.len() - 1].iter().copied().map(Some));
    positions
}

/// Market return times position, defined where both are defined.
///
/// A flat position earns exactly 0.0, never -0.0, so exports print `0`.
pub fn strategy_returns(market: &[Option<f64>], positions: &[Option<Signal>]) -> Vec<Option<f64>> {
    debug_assert_eq!(market.len(), positions.len());
    market
        .iter()
        .zip(positions)
        .map(|(r, p)| match (r, p) {
            (Some(_), Some(p)) if p.is_flat() => Some(0.0),
            (Some(r), Some(p)) => Some(r * p.as_f64()),
            _ => None,
        })
        .collect()
}

/// Running product of (1 + r) from a basis of 1.0.
///
/// Undefined returns contribute a factor of 1, so index 0 is always 1.0
/// when its return is undefined.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<f64> {
    let mut level = 1.0;
    returns
        .iter()
        .map(|r| {
            if let Some(r) = r {
                level *= 1.0 + r;
            }
            level
        })
        .collect()
}
