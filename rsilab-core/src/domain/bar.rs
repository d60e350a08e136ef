//! Bar — one trading day of market data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily bar for a single symbol.
///
/// Only `close` feeds the engine. Open/high/low/volume are carried through
/// from the provider when present so exports stay lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Bar {
    /// A close-only bar.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Bar as delivered by a provider, before cleaning.
///
/// A missing close (`None` or NaN) marks the row as void; void rows are
/// removed by [`PriceSeries::from_raw`](super::PriceSeries::from_raw).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// Returns true if the close is missing.
    pub fn is_void(&self) -> bool {
        self.close.map_or(true, f64::is_nan)
    }

    /// Convert into a [`Bar`], or `None` for a void row.
    pub fn into_bar(self) -> Option<Bar> {
        if self.is_void() {
            return None;
        }
        let close = self.close?;
        Some(Bar {
            date: self.date,
            close,
            open: self.open.filter(|v| !v.is_nan()),
            high: self.high.filter(|v| !v.is_nan()),
            low: self.low.filter(|v| !v.is_nan()),
            volume: self.volume,
        })
    }
}
