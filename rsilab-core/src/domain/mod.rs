//! Domain types for rsilab

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::{Bar, RawBar};
pub use series::{PriceSeries, SeriesError};
pub use signal::{InvalidSignal, Signal};

/// Symbol type alias
pub type Symbol = String;
