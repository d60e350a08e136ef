//! Price loading for the runner.
//!
//! Two sources:
//! 1. A CSV file with a header row (`date`, `close`, optional OHLCV columns)
//! 2. A synthetic random walk (`--synthetic`), tagged in every result
//!
//! Loading cleans void rows (missing close), validates ordering through
//! [`PriceSeries`], then applies the optional date window. Rows are never
//! re-sorted.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use rsilab_core::{PriceSeries, RawBar, SeriesError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}

/// Where prices come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Csv(path) => write!(f, "csv:{}", path.display()),
            DataSource::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Inclusive date window applied after validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Default synthetic span when the caller gives no window.
pub const SYNTHETIC_DEFAULT_START: (i32, u32, u32) = (2020, 1, 1);
pub const SYNTHETIC_DEFAULT_END: (i32, u32, u32) = (2024, 12, 31);

/// Result of loading prices, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: PriceSeries,
    pub source: DataSource,
    /// BLAKE3 over symbol, dates and closes.
    pub dataset_hash: String,
    /// Rows removed for a missing close.
    pub dropped_rows: usize,
    pub has_synthetic: bool,
}

/// Load prices for `symbol` from `source`.
pub fn load_prices(
    symbol: &str,
    source: &DataSource,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let (series, dropped_rows) = match source {
        DataSource::Csv(path) => {
            let raw = read_csv_file(path)?;
            let total = raw.len();
            let series = PriceSeries::from_raw(symbol, raw)?;
            let dropped = total - series.len();
            if dropped > 0 {
                tracing::warn!(symbol, dropped, "removed rows with a missing close");
            }
            (series.window(opts.start, opts.end)?, dropped)
        }
        DataSource::Synthetic => {
            tracing::warn!(symbol, "using synthetic prices; results will be tagged as synthetic");
            (synthetic_series(symbol, opts)?, 0)
        }
    };

    let dataset_hash = dataset_hash(&series);
    tracing::info!(
        symbol,
        source = %source,
        bars = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        "loaded prices"
    );

    Ok(LoadedData {
        series,
        source: source.clone(),
        dataset_hash,
        dropped_rows,
        has_synthetic: matches!(source, DataSource::Synthetic),
    })
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Read a CSV price file into raw (uncleaned) bars.
pub fn read_csv_file(path: &Path) -> Result<Vec<RawBar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        Ok(Self {
            date: find(&["date", "timestamp"]).ok_or(LoadError::MissingColumn("date"))?,
            close: find(&["close"]).ok_or(LoadError::MissingColumn("close"))?,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            volume: find(&["volume"]),
        })
    }
}

/// Parse CSV price data from any reader.
///
/// Rows keep file order. A missing close becomes `None` so the cleaning step
/// can drop the row; an unparseable one is an error.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawBar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;
        let cell = |idx: Option<usize>| idx.and_then(|c| record.get(c)).unwrap_or("");

        let date_text = cell(Some(columns.date));
        let date = parse_date(date_text).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: date_text.to_string(),
        })?;

        let volume = parse_number(cell(columns.volume), row, "volume")?
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64);

        bars.push(RawBar {
            date,
            open: parse_number(cell(columns.open), row, "open")?,
            high: parse_number(cell(columns.high), row, "high")?,
            low: parse_number(cell(columns.low), row, "low")?,
            close: parse_number(cell(Some(columns.close)), row, "close")?,
            volume,
        });
    }
    Ok(bars)
}

/// `YYYY-MM-DD`, or a datetime whose first ten characters are one.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn is_missing(text: &str) -> bool {
    text.is_empty()
        || ["nan", "null", "na", "n/a"]
            .iter()
            .any(|m| text.eq_ignore_ascii_case(m))
}

fn parse_number(text: &str, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
    if is_missing(text) {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::InvalidNumber {
            row,
            column,
            value: text.to_string(),
        })
}

// ─── Provenance ─────────────────────────────────────────────────────

/// Deterministic BLAKE3 hash over symbol, dates and closes.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Synthetic weekday random walk starting at 100.0.
///
/// Deterministic per symbol: the RNG seed is the BLAKE3 hash of the name.
pub fn synthetic_series(symbol: &str, opts: &LoadOptions) -> Result<PriceSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let (sy, sm, sd) = SYNTHETIC_DEFAULT_START;
    let (ey, em, ed) = SYNTHETIC_DEFAULT_END;
    let start = opts
        .start
        .or_else(|| NaiveDate::from_ymd_opt(sy, sm, sd))
        .unwrap_or_default();
    let end = opts
        .end
        .or_else(|| NaiveDate::from_ymd_opt(ey, em, ed))
        .unwrap_or_default();

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut raw = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;
    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            raw.push(RawBar {
                date: current,
                open: Some(open),
                high: Some(open.max(close) * (1.0 + rng.gen_range(0.0..0.01))),
                low: Some(open.min(close) * (1.0 - rng.gen_range(0.0..0.01))),
                close: Some(close),
                volume: Some(rng.gen_range(500_000..5_000_000u64)),
            });
            price = close;
        }
        current += chrono::Duration::days(1);
    }

    PriceSeries::from_raw(symbol, raw)
}
