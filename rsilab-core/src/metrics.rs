//! Performance metrics: pure functions over a completed return series.
//!
//! Only defined returns take part. No risk-free rate is subtracted.

use serde::{Deserialize, Serialize};

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics for one return series and its cumulative curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Largest drop from a running peak, in cumulative-return units (not a percentage).
    pub max_drawdown: f64,
}

impl MetricsSnapshot {
    /// Compute with the default 252-day year.
    pub fn compute(returns: &[Option<f64>], cumulative: &[f64]) -> Self {
        Self::compute_with_year(returns, cumulative, TRADING_DAYS_PER_YEAR)
    }

    pub fn compute_with_year(
        returns: &[Option<f64>],
        cumulative: &[f64],
        trading_days_per_year: f64,
    ) -> Self {
        let defined: Vec<f64> = returns.iter().flatten().copied().collect();
        let annualized_return = annualized_return(&defined, trading_days_per_year);
        let annualized_volatility = annualized_volatility(&defined, trading_days_per_year);
        Self {
            total_return: total_return(cumulative),
            annualized_return,
            annualized_volatility,
            sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility),
            max_drawdown: max_drawdown(cumulative),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Final cumulative value minus 1. Empty curve → 0.
pub fn total_return(cumulative: &[f64]) -> f64 {
    cumulative.last().map_or(0.0, |last| last - 1.0)
}

/// Mean daily return times the days per year.
pub fn annualized_return(returns: &[f64], trading_days_per_year: f64) -> f64 {
    mean_f64(returns) * trading_days_per_year
}

/// Sample standard deviation of daily returns times sqrt(days per year).
pub fn annualized_volatility(returns: &[f64], trading_days_per_year: f64) -> f64 {
    std_dev(returns) * trading_days_per_year.sqrt()
}

/// Annualized return over annualized volatility; exactly 0 when volatility is 0.
pub fn sharpe_ratio(annualized_return: f64, annualized_volatility: f64) -> f64 {
    if annualized_volatility == 0.0 {
        return 0.0;
    }
    annualized_return / annualized_volatility
}

/// Maximum of (running peak − current) over the cumulative curve.
///
/// Absolute, in the same units as the curve. 0 for a non-decreasing curve.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &level in cumulative {
        if level > peak {
            peak = level;
        }
        let dd = peak - level;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
