#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use revtrader::domain::decision::OrderIntent;
use revtrader::domain::error::RevtraderError;
pub use revtrader::domain::price::{PriceBar, PriceSeries};
use revtrader::ports::broker_port::BrokerPort;
use revtrader::ports::data_port::DataPort;
use std::collections::{HashMap, HashSet};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
        self.with_bars(ticker, make_bars(closes))
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(&self, ticker: &str) -> Result<Vec<PriceBar>, RevtraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(RevtraderError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| RevtraderError::NoData {
                ticker: ticker.to_string(),
            })
    }
}

pub struct MockBroker {
    pub equity: f64,
    pub rejected: HashSet<String>,
    pub submitted: Vec<OrderIntent>,
}

impl MockBroker {
    pub fn new(equity: f64) -> Self {
        Self {
            equity,
            rejected: HashSet::new(),
            submitted: Vec::new(),
        }
    }

    pub fn rejecting(mut self, ticker: &str) -> Self {
        self.rejected.insert(ticker.to_string());
        self
    }
}

impl BrokerPort for MockBroker {
    fn account_equity(&self) -> Result<f64, RevtraderError> {
        Ok(self.equity)
    }

    fn submit_order(&mut self, order: &OrderIntent) -> Result<(), RevtraderError> {
        if self.rejected.contains(&order.ticker) {
            return Err(RevtraderError::Broker {
                ticker: order.ticker.clone(),
                reason: "order rejected".into(),
            });
        }
        self.submitted.push(order.clone());
        Ok(())
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(offset as i64)
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    make_bars_from(0, closes)
}

/// Daily bars starting `start` days after 2024-01-01.
pub fn make_bars_from(start: usize, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: day(start + i),
            close,
        })
        .collect()
}

pub fn make_series(ticker: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(ticker, make_bars(closes)).unwrap()
}

pub fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
