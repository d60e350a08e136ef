//! Discrete per-day trading decision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading decision for one timestamp: short (-1), flat (0) or long (+1).
///
/// Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signal value must be -1, 0 or 1, got {0}")]
pub struct InvalidSignal(pub i8);

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    pub fn is_flat(self) -> bool {
        self == Signal::Flat
    }

    /// Magnitude of the change from `previous` to `self`: 0, 1 or 2.
    pub fn change_from(self, previous: Signal) -> u8 {
        (self.value() - previous.value()).unsigned_abs()
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = InvalidSignal;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(InvalidSignal(other)),
        }
    }
}
