//! Ticker universe: parsing ticker lists and loading each ticker's series.
//!
//! Loading is per-ticker fault tolerant. A ticker whose data cannot be
//! fetched or fails validation is recorded in `skipped` and the rest of the
//! universe proceeds.

use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

use crate::domain::error::{RevtraderError, SeriesError};
use crate::domain::price::PriceSeries;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    Fetch(String),
    Malformed(String),
    InsufficientBars { bars: usize, minimum: usize },
}

impl From<SeriesError> for SkipReason {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::Empty => SkipReason::NoData,
            SeriesError::Malformed { reason } => SkipReason::Malformed(reason),
            SeriesError::InsufficientData { bars, minimum } => {
                SkipReason::InsufficientBars { bars, minimum }
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::Fetch(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::Malformed(reason) => write!(f, "malformed: {}", reason),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
        }
    }
}

pub struct UniverseLoad {
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedTicker>,
}

/// Fetches and validates a single ticker.
pub fn load_series(data_port: &dyn DataPort, ticker: &str) -> Result<PriceSeries, RevtraderError> {
    let bars = data_port.fetch_closes(ticker)?;
    PriceSeries::new(ticker, bars).map_err(|e| RevtraderError::series(ticker, e))
}

pub fn load_universe(data_port: &dyn DataPort, tickers: &[String]) -> UniverseLoad {
    let mut series = Vec::with_capacity(tickers.len());
    let mut skipped = Vec::new();

    for ticker in tickers {
        match load_series(data_port, ticker) {
            Ok(s) => {
                info!(ticker = %ticker, bars = s.len(), "loaded");
                series.push(s);
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "skipping ticker");
                let reason = match e {
                    RevtraderError::Series { source, .. } => SkipReason::from(source),
                    RevtraderError::NoData { .. } => SkipReason::NoData,
                    other => SkipReason::Fetch(other.to_string()),
                };
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason,
                });
            }
        }
    }

    if !skipped.is_empty() {
        info!(
            "using {} of {} tickers",
            series.len(),
            series.len() + skipped.len()
        );
    }

    UniverseLoad { series, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct StubPort {
        data: HashMap<String, Vec<PriceBar>>,
    }

    impl DataPort for StubPort {
        fn fetch_closes(&self, ticker: &str) -> Result<Vec<PriceBar>, RevtraderError> {
            self.data
                .get(ticker)
                .cloned()
                .ok_or_else(|| RevtraderError::NoData {
                    ticker: ticker.to_string(),
                })
        }
    }

    fn bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                close,
            })
            .collect()
    }

    #[test]
    fn parse_tickers_basic() {
        let result = parse_tickers("AAPL,MSFT,GOOGL").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn parse_tickers_trims_and_uppercases() {
        let result = parse_tickers("  aapl , msft ,nvda").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn parse_tickers_empty_token() {
        assert!(matches!(
            parse_tickers("AAPL,,MSFT"),
            Err(UniverseError::EmptyToken)
        ));
    }

    #[test]
    fn parse_tickers_duplicate() {
        let result = parse_tickers("AAPL,MSFT,aapl");
        assert!(matches!(result, Err(UniverseError::DuplicateTicker(s)) if s == "AAPL"));
    }

    #[test]
    fn load_universe_skips_bad_tickers() {
        let mut data = HashMap::new();
        data.insert("GOOD".to_string(), bars(&[10.0, 11.0, 12.0]));
        data.insert("EMPTY".to_string(), vec![]);
        data.insert("BAD".to_string(), bars(&[10.0, -1.0]));
        let port = StubPort { data };

        let tickers: Vec<String> = ["GOOD", "EMPTY", "BAD", "MISSING"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let load = load_universe(&port, &tickers);

        assert_eq!(load.series.len(), 1);
        assert_eq!(load.series[0].ticker(), "GOOD");
        assert_eq!(load.skipped.len(), 3);
        assert_eq!(load.skipped[0].reason, SkipReason::NoData);
        assert!(matches!(load.skipped[1].reason, SkipReason::Malformed(_)));
        assert_eq!(load.skipped[2].reason, SkipReason::NoData);
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::InsufficientBars {
            bars: 5,
            minimum: 21,
        };
        assert_eq!(reason.to_string(), "only 5 bars, minimum 21 required");
    }
}
