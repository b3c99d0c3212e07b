//! Live trading decision for a ticker's latest bar.
//!
//! Turns the latest signal into explicit order intents against the tracked
//! position. An opposing position is always closed in full before a new one
//! of the other sign is opened. A same-direction signal adds to the existing
//! position. Hold never produces orders.
//!
//! Tracked positions live in a [`PositionBook`] owned by the caller: it is
//! passed in, and fills reported back by the execution side produce the next
//! book. The core holds no position state of its own.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

use super::analysis::TickerAnalysis;
use super::price::PriceSeries;
use super::signal::Signal;
use super::sizing::{SizingParams, position_fraction, share_quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderPurpose {
    CloseLong,
    CloseShort,
    OpenLong,
    OpenShort,
}

impl fmt::Display for OrderPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPurpose::CloseLong => write!(f, "CLOSE LONG"),
            OrderPurpose::CloseShort => write!(f, "CLOSE SHORT"),
            OrderPurpose::OpenLong => write!(f, "LONG"),
            OrderPurpose::OpenShort => write!(f, "SHORT"),
        }
    }
}

/// A market order the execution side should place. `quantity` is always
/// positive; direction is carried by `side`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub ticker: String,
    pub side: Side,
    pub quantity: i64,
    pub purpose: OrderPurpose,
}

impl OrderIntent {
    /// Change in signed position if this order fills.
    pub fn signed_quantity(&self) -> i64 {
        match self.side {
            Side::Buy => self.quantity,
            Side::Sell => -self.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeDecision {
    pub ticker: String,
    pub timestamp: Option<NaiveDateTime>,
    pub close: Option<f64>,
    pub ratio: Option<f64>,
    pub signal: Signal,
    pub fraction: f64,
    pub orders: Vec<OrderIntent>,
    pub share_delta: i64,
    pub current_position: i64,
    pub target_position: i64,
}

impl TradeDecision {
    /// No trade this cycle; the tracked position is carried unchanged.
    pub fn hold(ticker: &str, current_position: i64) -> Self {
        TradeDecision {
            ticker: ticker.to_string(),
            timestamp: None,
            close: None,
            ratio: None,
            signal: Signal::Hold,
            fraction: 0.0,
            orders: Vec::new(),
            share_delta: 0,
            current_position,
            target_position: current_position,
        }
    }

    pub fn is_trade(&self) -> bool {
        !self.orders.is_empty()
    }
}

/// Sizes and reconciles the latest signal of `analysis` against the tracked
/// position, with `equity` as the capital base.
pub fn decide(
    analysis: &TickerAnalysis,
    series: &PriceSeries,
    current_position: i64,
    equity: f64,
    sizing: &SizingParams,
) -> TradeDecision {
    let latest = series.last();
    let signal = analysis.latest_signal();
    let Some(ratio) = analysis.latest_ratio() else {
        return TradeDecision::hold(&analysis.ticker, current_position);
    };

    let fraction = position_fraction(signal, ratio, &analysis.thresholds, sizing);
    let quantity = share_quantity(equity, fraction, latest.close);
    let orders = reconcile(&analysis.ticker, signal, current_position, quantity);
    let share_delta: i64 = orders.iter().map(OrderIntent::signed_quantity).sum();

    TradeDecision {
        ticker: analysis.ticker.clone(),
        timestamp: Some(latest.timestamp),
        close: Some(latest.close),
        ratio: Some(ratio),
        signal,
        fraction,
        orders,
        share_delta,
        current_position,
        target_position: current_position + share_delta,
    }
}

/// Orders, in submission order, that move `current` toward `signal` with an
/// opening size of `quantity` shares (0 = close only).
pub fn reconcile(ticker: &str, signal: Signal, current: i64, quantity: i64) -> Vec<OrderIntent> {
    let mut orders = Vec::new();
    let order = |side, quantity, purpose| OrderIntent {
        ticker: ticker.to_string(),
        side,
        quantity,
        purpose,
    };

    match signal {
        Signal::Long => {
            if current < 0 {
                orders.push(order(Side::Buy, -current, OrderPurpose::CloseShort));
            }
            if quantity >= 1 {
                orders.push(order(Side::Buy, quantity, OrderPurpose::OpenLong));
            }
        }
        Signal::Short => {
            if current > 0 {
                orders.push(order(Side::Sell, current, OrderPurpose::CloseLong));
            }
            if quantity >= 1 {
                orders.push(order(Side::Sell, quantity, OrderPurpose::OpenShort));
            }
        }
        Signal::Hold => {}
    }

    orders
}

/// Signed share count per ticker, as last confirmed by the execution side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionBook {
    positions: BTreeMap<String, i64>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ticker: &str) -> i64 {
        self.positions.get(ticker).copied().unwrap_or(0)
    }

    pub fn set(&mut self, ticker: &str, quantity: i64) {
        if quantity == 0 {
            self.positions.remove(ticker);
        } else {
            self.positions.insert(ticker.to_string(), quantity);
        }
    }

    /// Records a realised fill of `signed_quantity` shares.
    pub fn apply_fill(&mut self, ticker: &str, signed_quantity: i64) {
        let next = self.get(ticker) + signed_quantity;
        self.set(ticker, next);
    }

    /// Non-flat positions in ticker order.
    pub fn open_positions(&self) -> impl Iterator<Item = (&str, i64)> {
        self.positions.iter().map(|(t, &q)| (t.as_str(), q))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<(String, i64)> for PositionBook {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        let mut book = PositionBook::new();
        for (ticker, quantity) in iter {
            book.set(&ticker, quantity);
        }
        book
    }
}
