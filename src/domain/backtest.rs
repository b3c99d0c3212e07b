//! Bar-by-bar equity replay of a signal series (single ticker).
//!
//! State is `(capital, stance)`, starting at `(initial_capital, Flat)`. At
//! each bar i >= 1 the stance held since bar i-1 earns the close-to-close
//! return, then the signal at bar i sets the stance for the next step:
//! Long and Short switch it, Hold keeps whatever was held before. The
//! strategy never drops back to flat by itself.

use chrono::NaiveDateTime;

use super::error::SeriesError;
use super::price::PriceSeries;
use super::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Long,
    Short,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub equity: f64,
    pub buy_and_hold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ticker: String,
    pub initial_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub final_capital: f64,
    pub buy_and_hold_final: f64,
}

impl BacktestResult {
    pub fn pnl(&self) -> f64 {
        self.final_capital - self.initial_capital
    }

    pub fn buy_and_hold_pnl(&self) -> f64 {
        self.buy_and_hold_final - self.initial_capital
    }

    pub fn is_profitable(&self) -> bool {
        self.final_capital > self.initial_capital
    }

    pub fn outperformed(&self) -> bool {
        self.final_capital > self.buy_and_hold_final
    }

    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}

/// Equity after each bar; `curve[0] == initial_capital` and
/// `curve.len() == closes.len()`. Missing trailing signals count as Hold.
pub fn simulate(closes: &[f64], signals: &[Signal], initial_capital: f64) -> Vec<f64> {
    let mut curve = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return curve;
    }

    let mut capital = initial_capital;
    let mut stance = Stance::Flat;
    curve.push(capital);

    for i in 1..closes.len() {
        let (prev, now) = (closes[i - 1], closes[i]);
        match stance {
            Stance::Long => capital *= now / prev,
            Stance::Short => capital *= prev / now,
            Stance::Flat => {}
        }

        match signals.get(i).copied().unwrap_or(Signal::Hold) {
            Signal::Long => stance = Stance::Long,
            Signal::Short => stance = Stance::Short,
            Signal::Hold => {}
        }

        curve.push(capital);
    }

    curve
}

/// `initial * close[i] / close[0]`.
pub fn buy_and_hold_curve(closes: &[f64], initial_capital: f64) -> Vec<f64> {
    match closes.first() {
        Some(&base) => closes.iter().map(|c| initial_capital * c / base).collect(),
        None => Vec::new(),
    }
}

pub fn run_backtest(
    series: &PriceSeries,
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, SeriesError> {
    if signals.len() != series.len() {
        return Err(SeriesError::Malformed {
            reason: format!(
                "{} signals for {} bars",
                signals.len(),
                series.len()
            ),
        });
    }

    let closes = series.closes();
    let equity = simulate(&closes, signals, config.initial_capital);
    let baseline = buy_and_hold_curve(&closes, config.initial_capital);

    let equity_curve: Vec<EquityPoint> = series
        .bars()
        .iter()
        .zip(equity.iter().zip(&baseline))
        .map(|(bar, (&equity, &buy_and_hold))| EquityPoint {
            timestamp: bar.timestamp,
            close: bar.close,
            equity,
            buy_and_hold,
        })
        .collect();

    let last = equity_curve.last().ok_or(SeriesError::Empty)?;

    Ok(BacktestResult {
        ticker: series.ticker().to_string(),
        initial_capital: config.initial_capital,
        final_capital: last.equity,
        buy_and_hold_final: last.buy_and_hold,
        equity_curve,
    })
}
