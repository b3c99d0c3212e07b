//! One live decision cycle across a ticker universe.
//!
//! For each ticker: fetch, validate, analyse, read account equity, decide,
//! then submit the decision's orders one at a time. Every order the broker
//! accepts is applied to the position book immediately. The first rejected
//! order stops the remaining orders for that ticker only; the cycle carries
//! on with the next ticker.

use tracing::{debug, info, warn};

use super::analysis::analyze;
use super::decision::{PositionBook, TradeDecision, decide};
use super::error::RevtraderError;
use super::strategy::StrategyConfig;
use super::universe::load_series;
use crate::ports::broker_port::BrokerPort;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct CycleAction {
    pub decision: TradeDecision,
    /// Signed shares actually filled this cycle.
    pub filled: i64,
}

#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<CycleAction, RevtraderError>,
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<TickerOutcome>,
}

impl CycleReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &CycleAction> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &RevtraderError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.ticker.as_str(), e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Builds the decision for one ticker. Too little history is a Hold, not
/// an error.
pub fn decide_ticker(
    data_port: &dyn DataPort,
    broker: &dyn BrokerPort,
    ticker: &str,
    strategy: &StrategyConfig,
    current_position: i64,
) -> Result<TradeDecision, RevtraderError> {
    let series = load_series(data_port, ticker)?;

    let analysis = match analyze(&series, strategy).map_err(|e| RevtraderError::series(ticker, e)) {
        Ok(a) => a,
        Err(e) if e.is_insufficient_data() => {
            debug!(ticker = %ticker, reason = %e, "no decision this cycle");
            return Ok(TradeDecision::hold(ticker, current_position));
        }
        Err(e) => return Err(e),
    };

    let equity = broker.account_equity()?;
    Ok(decide(
        &analysis,
        &series,
        current_position,
        equity,
        &strategy.sizing,
    ))
}

fn execute(
    broker: &mut dyn BrokerPort,
    decision: &TradeDecision,
    book: &mut PositionBook,
) -> Result<i64, RevtraderError> {
    let mut filled = 0;
    for order in &decision.orders {
        broker.submit_order(order)?;
        book.apply_fill(&order.ticker, order.signed_quantity());
        filled += order.signed_quantity();
        info!(
            ticker = %order.ticker,
            side = %order.side,
            quantity = order.quantity,
            purpose = %order.purpose,
            position = book.get(&order.ticker),
            "order filled"
        );
    }
    Ok(filled)
}

/// Runs one cycle. The incoming book is consumed and the updated book is
/// returned alongside the per-ticker report.
pub fn run_cycle(
    data_port: &dyn DataPort,
    broker: &mut dyn BrokerPort,
    tickers: &[String],
    strategy: &StrategyConfig,
    mut book: PositionBook,
) -> (CycleReport, PositionBook) {
    let mut report = CycleReport::default();

    for ticker in tickers {
        let current = book.get(ticker);
        let result = match decide_ticker(data_port, &*broker, ticker, strategy, current) {
            Ok(decision) => execute(&mut *broker, &decision, &mut book)
                .map(|filled| CycleAction { decision, filled }),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(ticker = %ticker, error = %e, "ticker failed this cycle");
        }

        report.outcomes.push(TickerOutcome {
            ticker: ticker.clone(),
            result,
        });
    }

    (report, book)
}
