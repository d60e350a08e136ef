//! Indicator implementations.
//!
//! Indicators are pure functions: closes in, one value per timestamp out.
//! Values that need more history than is available are `None`, never zero.

pub mod rsi;
pub mod sma;

pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at index t may depend on a close at t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "sma_200").
    fn name(&self) -> &str;

    /// Number of leading timestamps that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a vector of the same length as `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
