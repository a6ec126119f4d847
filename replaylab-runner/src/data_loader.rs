//! Bar loading for the runner.
//!
//! Resolves a [`DataConfig`] into an in-memory bar source:
//! 1. Long-form CSV (`datetime,symbol,open,high,low,close`)
//! 2. Parquet (`timestamp` epoch-ms, `symbol`, `open`, `high`, `low`, `close`)
//! 3. Synthetic random walk, seeded per symbol
//!
//! Synthetic data is a developer-only mode. Results produced on synthetic data
//! are tagged so they are never mistaken for real market data.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::{Column, DataFrame, ParquetReader, ParquetWriter, PolarsError, SerReader};
use replaylab_core::{Bar, BarSource, InMemoryBarSource, InstrumentId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("parquet error in '{path}': {reason}")]
    Parquet { path: PathBuf, reason: String },

    #[error("'{path}' is missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}: unparseable timestamp '{value}'")]
    Timestamp { row: usize, value: String },
}

/// Result of loading bars, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub source: InMemoryBarSource,
    /// BLAKE3 over every loaded bar, for fingerprinting.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Load bars described by `config`.
pub fn load_bars(config: &DataConfig) -> Result<LoadedData, LoadError> {
    let (bars, has_synthetic) = match config {
        DataConfig::Csv { path } => (read_csv(path)?, false),
        DataConfig::Parquet { path } => (read_parquet(path)?, false),
        DataConfig::Synthetic {
            symbols,
            start,
            end,
        } => {
            let mut bars = Vec::new();
            for symbol in symbols {
                warn!(%symbol, "generating synthetic data; results will be tagged as synthetic");
                bars.extend(generate_synthetic_bars(symbol, *start, *end));
            }
            (bars, true)
        }
    };

    let bars = drop_void_bars(bars);
    let dataset_hash = compute_dataset_hash(&bars);
    let source = InMemoryBarSource::new(bars);
    info!(
        bars = source.history().len(),
        instruments = source.instruments().len(),
        synthetic = has_synthetic,
        "bars loaded"
    );

    Ok(LoadedData {
        source,
        dataset_hash,
        has_synthetic,
    })
}

fn drop_void_bars(bars: Vec<Bar>) -> Vec<Bar> {
    let before = bars.len();
    let kept: Vec<Bar> = bars.into_iter().filter(|b| !b.is_void()).collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        warn!(dropped, "dropped bars with missing prices");
    }
    let inconsistent = kept.iter().filter(|b| !b.is_sane()).count();
    if inconsistent > 0 {
        warn!(inconsistent, "kept bars with inconsistent OHLC ranges");
    }
    kept
}

// ── CSV ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    datetime: String,
    symbol: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Read a long-form CSV of bars.
pub fn read_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

    let mut bars = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(csv_err)?;
        let timestamp = parse_timestamp(&row.datetime).ok_or_else(|| LoadError::Timestamp {
            row: i + 1,
            value: row.datetime.clone(),
        })?;
        bars.push(Bar {
            timestamp,
            instrument: InstrumentId::new(row.symbol),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }
    Ok(bars)
}

/// Write bars as long-form CSV (the format `read_csv` accepts).
pub fn write_csv(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for bar in bars {
        writer
            .serialize(CsvRow {
                datetime: bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                symbol: bar.instrument.to_string(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and `YYYY-MM-DDTHH:MM:SS`.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ── Parquet ──────────────────────────────────────────────────────────

const PARQUET_COLUMNS: [&str; 6] = ["timestamp", "symbol", "open", "high", "low", "close"];

/// Read bars from a Parquet file.
pub fn read_parquet(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let parquet_err = |e: PolarsError| LoadError::Parquet {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let file = fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file).finish().map_err(parquet_err)?;

    for column in PARQUET_COLUMNS {
        if df.column(column).is_err() {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let ts_ca = df.column("timestamp").map_err(parquet_err)?.i64().map_err(parquet_err)?;
    let sym_ca = df.column("symbol").map_err(parquet_err)?.str().map_err(parquet_err)?;
    let open_ca = df.column("open").map_err(parquet_err)?.f64().map_err(parquet_err)?;
    let high_ca = df.column("high").map_err(parquet_err)?.f64().map_err(parquet_err)?;
    let low_ca = df.column("low").map_err(parquet_err)?.f64().map_err(parquet_err)?;
    let close_ca = df.column("close").map_err(parquet_err)?.f64().map_err(parquet_err)?;

    let n = df.height();
    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let millis = ts_ca.get(i).ok_or_else(|| LoadError::Timestamp {
            row: i + 1,
            value: "null".into(),
        })?;
        let timestamp = DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| LoadError::Timestamp {
                row: i + 1,
                value: millis.to_string(),
            })?;
        let symbol = sym_ca.get(i).ok_or_else(|| LoadError::Parquet {
            path: path.to_path_buf(),
            reason: format!("null symbol at row {}", i + 1),
        })?;
        bars.push(Bar {
            timestamp,
            instrument: InstrumentId::from(symbol),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
        });
    }
    Ok(bars)
}

/// Write bars to a Parquet file in the layout `read_parquet` expects.
pub fn write_parquet(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    let parquet_err = |e: PolarsError| LoadError::Parquet {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let timestamps: Vec<i64> = bars
        .iter()
        .map(|b| b.timestamp.and_utc().timestamp_millis())
        .collect();
    let symbols: Vec<String> = bars.iter().map(|b| b.instrument.to_string()).collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let mut df = DataFrame::new(vec![
        Column::new("timestamp".into(), timestamps),
        Column::new("symbol".into(), symbols),
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
    ])
    .map_err(parquet_err)?;

    let file = fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file).finish(&mut df).map_err(parquet_err)?;
    Ok(())
}

// ── Synthetic ────────────────────────────────────────────────────────

/// Generate synthetic bars for testing/development.
///
/// A random walk from 100.0, seeded from the symbol name, weekdays only.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

        if let Some(timestamp) = current.and_hms_opt(0, 0, 0) {
            bars.push(Bar {
                timestamp,
                instrument: InstrumentId::from(symbol),
                open,
                high,
                low,
                close,
            });
        }

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// Deterministic BLAKE3 hash over bars in load order.
fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.instrument.as_str().as_bytes());
        hasher.update(&bar.timestamp.and_utc().timestamp_millis().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
