//! Multi-ticker aggregation of independent backtests.
//!
//! Each ticker is analysed and simulated on its own, seeded from the same
//! initial capital. Portfolio-level capitals are built from summed per-ticker
//! P&L plus a single initial capital, not from N initial capitals.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use super::analysis::analyze;
use super::backtest::{BacktestConfig, BacktestResult, run_backtest};
use super::error::SeriesError;
use super::price::PriceSeries;
use super::strategy::StrategyConfig;
use super::universe::{SkipReason, SkippedTicker};

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    pub initial_capital: f64,
    pub final_strategy_capital: f64,
    pub final_buy_and_hold_capital: f64,
    pub num_outperformed: usize,
    pub num_profitable: usize,
    pub num_tickers: usize,
}

impl PortfolioResult {
    pub fn strategy_return_pct(&self) -> f64 {
        pct_change(self.initial_capital, self.final_strategy_capital)
    }

    pub fn buy_and_hold_return_pct(&self) -> f64 {
        pct_change(self.initial_capital, self.final_buy_and_hold_capital)
    }

    pub fn outperformed_rate(&self) -> f64 {
        rate(self.num_outperformed, self.num_tickers)
    }

    pub fn profitable_rate(&self) -> f64 {
        rate(self.num_profitable, self.num_tickers)
    }
}

fn pct_change(initial: f64, final_value: f64) -> f64 {
    if initial > 0.0 {
        (final_value - initial) / initial * 100.0
    } else {
        0.0
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatePoint {
    pub timestamp: NaiveDateTime,
    pub strategy: f64,
    pub buy_and_hold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub runs: Vec<BacktestResult>,
    pub skipped: Vec<SkippedTicker>,
    pub summary: PortfolioResult,
    pub aggregate_curve: Vec<AggregatePoint>,
}

pub fn summarize(runs: &[BacktestResult], initial_capital: f64) -> PortfolioResult {
    let mut profit_loss = 0.0;
    let mut buy_and_hold_total = 0.0;
    let mut num_outperformed = 0;
    let mut num_profitable = 0;

    for run in runs {
        profit_loss += run.pnl();
        buy_and_hold_total += run.buy_and_hold_pnl();
        if run.is_profitable() {
            num_profitable += 1;
        }
        if run.outperformed() {
            num_outperformed += 1;
        }
    }

    PortfolioResult {
        initial_capital,
        final_strategy_capital: initial_capital + profit_loss,
        final_buy_and_hold_capital: initial_capital + buy_and_hold_total,
        num_outperformed,
        num_profitable,
        num_tickers: runs.len(),
    }
}

/// Timestamps present in every run's curve, ascending.
pub fn common_timeline(runs: &[BacktestResult]) -> Vec<NaiveDateTime> {
    let mut iter = runs.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut common: BTreeSet<NaiveDateTime> =
        first.equity_curve.iter().map(|p| p.timestamp).collect();
    for run in iter {
        let stamps: BTreeSet<NaiveDateTime> =
            run.equity_curve.iter().map(|p| p.timestamp).collect();
        common = common.intersection(&stamps).copied().collect();
    }
    common.into_iter().collect()
}

/// Pointwise mean of strategy equity and buy-and-hold across runs on the
/// common timeline. Strategy equity is taken as simulated; each buy-and-hold
/// leg is re-based to `initial_capital` at the first common timestamp.
pub fn aggregate_curve(runs: &[BacktestResult], initial_capital: f64) -> Vec<AggregatePoint> {
    let timeline = common_timeline(runs);
    if timeline.is_empty() {
        return Vec::new();
    }

    let mut strategy_sum = vec![0.0; timeline.len()];
    let mut baseline_sum = vec![0.0; timeline.len()];

    for run in runs {
        let by_time: HashMap<NaiveDateTime, (f64, f64)> = run
            .equity_curve
            .iter()
            .map(|p| (p.timestamp, (p.equity, p.close)))
            .collect();

        let Some(&(_, base_close)) = by_time.get(&timeline[0]) else {
            continue;
        };
        for (i, ts) in timeline.iter().enumerate() {
            if let Some(&(equity, close)) = by_time.get(ts) {
                strategy_sum[i] += equity;
                baseline_sum[i] += initial_capital * close / base_close;
            }
        }
    }

    let n = runs.len() as f64;
    timeline
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| AggregatePoint {
            timestamp,
            strategy: strategy_sum[i] / n,
            buy_and_hold: baseline_sum[i] / n,
        })
        .collect()
}

fn backtest_one(
    series: &PriceSeries,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, SeriesError> {
    let analysis = analyze(series, strategy)?;
    run_backtest(series, &analysis.signals, config)
}

/// Backtests every series in parallel and aggregates the survivors.
/// Series that cannot be analysed are reported in `skipped`.
pub fn run_portfolio(
    universe: &[PriceSeries],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> PortfolioReport {
    let outcomes: Vec<(String, Result<BacktestResult, SeriesError>)> = universe
        .par_iter()
        .map(|series| {
            (
                series.ticker().to_string(),
                backtest_one(series, strategy, config),
            )
        })
        .collect();

    let mut runs = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();

    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                debug!(
                    ticker = %ticker,
                    final_capital = result.final_capital,
                    buy_and_hold = result.buy_and_hold_final,
                    "backtest complete"
                );
                runs.push(result);
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "skipping ticker");
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::from(e),
                });
            }
        }
    }

    let summary = summarize(&runs, config.initial_capital);
    let aggregate_curve = aggregate_curve(&runs, config.initial_capital);

    PortfolioReport {
        runs,
        skipped,
        summary,
        aggregate_curve,
    }
}
