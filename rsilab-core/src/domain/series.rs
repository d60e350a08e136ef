//! Validated, immutable daily price series.
//!
//! Construction is the only place the engine can fail: a series that exists
//! has strictly increasing dates and finite, positive closes. Everything
//! downstream is infallible.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::{Bar, RawBar};

/// Malformed input rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("duplicate timestamp {date} at row {index}")]
    DuplicateTimestamp { index: usize, date: NaiveDate },

    #[error("timestamps out of order at row {index}: {date} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("non-finite close {value} on {date}")]
    NonFiniteClose { date: NaiveDate, value: f64 },

    #[error("non-positive close {value} on {date}")]
    NonPositiveClose { date: NaiveDate, value: f64 },

    #[error("no bars for '{symbol}' between {start:?} and {end:?}")]
    EmptyWindow {
        symbol: String,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// Time-ordered daily closes for one symbol.
///
/// Deserialization goes through [`PriceSeries::new`], so a decoded series
/// upholds the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSeries")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

/// Wire shape of a series before validation.
#[derive(Deserialize)]
struct UncheckedSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl TryFrom<UncheckedSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: UncheckedSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.symbol, raw.bars)
    }
}

impl PriceSeries {
    /// Validate and wrap a bar list. Bars are never re-sorted.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }

        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(SeriesError::NonFiniteClose {
                    date: bar.date,
                    value: bar.close,
                });
            }
            if bar.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    date: bar.date,
                    value: bar.close,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date == previous {
                    return Err(SeriesError::DuplicateTimestamp {
                        index,
                        date: bar.date,
                    });
                }
                if bar.date < previous {
                    return Err(SeriesError::NonMonotonic {
                        index,
                        previous,
                        date: bar.date,
                    });
                }
            }
        }

        Ok(Self { symbol, bars })
    }

    /// Drop void rows (missing close), then validate what remains.
    pub fn from_raw(symbol: impl Into<String>, raw: Vec<RawBar>) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = raw.into_iter().filter_map(RawBar::into_bar).collect();
        Self::new(symbol, bars)
    }

    /// Close-only series on consecutive calendar days starting at `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, SeriesError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::from_close(start + chrono::Duration::days(i as i64), close))
            .collect();
        Self::new(symbol, bars)
    }

    /// Inclusive date window. The result must still contain at least one bar.
    pub fn window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
            .cloned()
            .collect();
        if bars.is_empty() {
            return Err(SeriesError::EmptyWindow {
                symbol: self.symbol.clone(),
                start,
                end,
            });
        }
        Ok(Self {
            symbol: self.symbol.clone(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }
}
