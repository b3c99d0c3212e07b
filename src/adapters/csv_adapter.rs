//! CSV file data adapter.
//!
//! Price history lives in `<base>/<TICKER>.csv`, one file per ticker, with a
//! header row. Tracked positions are stored as `ticker,quantity` rows.

use crate::domain::decision::PositionBook;
use crate::domain::error::RevtraderError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "datetime", "date", "price"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl DataPort for CsvAdapter {
    fn fetch_closes(&self, ticker: &str) -> Result<Vec<PriceBar>, RevtraderError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RevtraderError::NoData {
                    ticker: ticker.to_string(),
                });
            }
            Err(e) => {
                return Err(RevtraderError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| RevtraderError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        let ts_col = TIMESTAMP_COLUMNS
            .iter()
            .find_map(|name| find_column(&headers, name))
            .unwrap_or(0);
        let close_col = find_column(&headers, "close").ok_or_else(|| RevtraderError::Data {
            reason: format!("missing close column in {}", path.display()),
        })?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let Ok(record) = result else {
                dropped += 1;
                continue;
            };

            let timestamp = record.get(ts_col).and_then(parse_timestamp);
            let close = record
                .get(close_col)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|c| c.is_finite() && *c > 0.0);

            match (timestamp, close) {
                (Some(timestamp), Some(close)) => bars.push(PriceBar { timestamp, close }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(ticker = %ticker, dropped, "dropped unparseable rows");
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

/// Loads a position book. A missing file is an empty book.
pub fn load_positions(path: &Path) -> Result<PositionBook, RevtraderError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PositionBook::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut book = PositionBook::new();

    for result in rdr.records() {
        let record = result.map_err(|e| RevtraderError::Data {
            reason: format!("position file parse error: {}", e),
        })?;

        let ticker = record.get(0).map(str::trim).unwrap_or_default();
        if ticker.is_empty() {
            return Err(RevtraderError::Data {
                reason: format!("missing ticker in {}", path.display()),
            });
        }
        let quantity: i64 = record
            .get(1)
            .ok_or_else(|| RevtraderError::Data {
                reason: format!("missing quantity for {}", ticker),
            })?
            .trim()
            .parse()
            .map_err(|e| RevtraderError::Data {
                reason: format!("invalid quantity for {}: {}", ticker, e),
            })?;

        book.set(&ticker.to_uppercase(), quantity);
    }

    Ok(book)
}

pub fn save_positions(path: &Path, book: &PositionBook) -> Result<(), RevtraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| RevtraderError::Data {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    let write_err = |e: csv::Error| RevtraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    };

    wtr.write_record(["ticker", "quantity"]).map_err(write_err)?;
    for (ticker, quantity) in book.open_positions() {
        let quantity = quantity.to_string();
        wtr.write_record([ticker, quantity.as_str()])
            .map_err(write_err)?;
    }
    wtr.flush()?;
    Ok(())
}
