//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, load_positions, save_positions};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_broker::PaperBroker;
use crate::domain::backtest::BacktestConfig;
use crate::domain::config_validation::{parse_percentiles, validate_config};
use crate::domain::decision::{OrderPurpose, PositionBook, TradeDecision};
use crate::domain::error::RevtraderError;
use crate::domain::execution::{CycleReport, run_cycle};
use crate::domain::metrics::TickerMetrics;
use crate::domain::portfolio::{PortfolioReport, run_portfolio};
use crate::domain::sizing::SizingParams;
use crate::domain::strategy::{DEFAULT_SMA_WINDOW, StrategyConfig};
use crate::domain::universe::{load_universe, parse_tickers};
use crate::ports::broker_port::BrokerPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_PATH: &str = "data";
const DEFAULT_LIVE_EQUITY: f64 = 100_000.0;

#[derive(Parser, Debug)]
#[command(name = "revtrader", about = "SMA mean-reversion signals and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured tickers and aggregate the results
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Backtest these tickers instead of the configured list
        #[arg(long)]
        ticker: Option<String>,
        /// Directory for equity curve CSVs
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run one live decision cycle against the paper broker
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        /// Position book file, read before and written after the cycle
        #[arg(short, long)]
        positions: Option<PathBuf>,
        /// Account equity used for sizing
        #[arg(long)]
        equity: Option<f64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            output,
        } => run_backtest(&config, ticker.as_deref(), output.as_ref()),
        Command::Signals {
            config,
            positions,
            equity,
        } => run_signals(&config, positions.as_ref(), equity),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = RevtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_validated(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    Ok(adapter)
}

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, RevtraderError> {
    let window = config.get_int("strategy", "sma_window", DEFAULT_SMA_WINDOW as i64);
    if window < 1 {
        return Err(RevtraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "sma_window".into(),
            reason: "sma_window must be a positive integer".into(),
        });
    }

    let defaults = SizingParams::default();
    Ok(StrategyConfig {
        sma_window: window as usize,
        percentiles: parse_percentiles(config)?,
        sizing: SizingParams {
            scale: config.get_double("strategy", "size_scale", defaults.scale),
            max_fraction: config.get_double("strategy", "max_fraction", defaults.max_fraction),
            epsilon: defaults.epsilon,
        },
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", defaults.initial_capital),
    }
}

/// Tickers from `--ticker` if given, else `[backtest] tickers`.
pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, RevtraderError> {
    let raw = match ticker_override {
        Some(t) => t.to_string(),
        None => config
            .get_string("backtest", "tickers")
            .ok_or_else(|| RevtraderError::ConfigMissing {
                section: "backtest".into(),
                key: "tickers".into(),
            })?,
    };

    parse_tickers(&raw).map_err(|e| RevtraderError::ConfigInvalid {
        section: "backtest".into(),
        key: "tickers".into(),
        reason: e.to_string(),
    })
}

pub fn data_path(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string("data", "path")
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
    )
}

fn run_backtest(
    config_path: &Path,
    ticker_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = build_strategy_config(&adapter).and_then(|strategy| {
        let tickers = resolve_tickers(ticker_override, &adapter)?;
        Ok((strategy, tickers))
    });
    let (strategy, tickers) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = build_backtest_config(&adapter);

    let output_dir = output_override.cloned().or_else(|| {
        adapter
            .get_string("report", "output_dir")
            .map(PathBuf::from)
    });

    let data_port = CsvAdapter::new(data_path(&adapter));
    run_backtest_pipeline(
        &data_port,
        &strategy,
        &bt_config,
        &tickers,
        output_dir.as_deref(),
    )
}

/// Load, simulate, aggregate, print and optionally write curves.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    bt_config: &BacktestConfig,
    tickers: &[String],
    output_dir: Option<&Path>,
) -> ExitCode {
    info!(
        "Backtesting {} tickers, window {}, percentiles {}",
        tickers.len(),
        strategy.sma_window,
        strategy.percentiles
    );

    let load = load_universe(data_port, tickers);
    let mut report = run_portfolio(&load.series, strategy, bt_config);
    let mut skipped = load.skipped;
    skipped.append(&mut report.skipped);
    report.skipped = skipped;

    if report.runs.is_empty() {
        eprintln!("error: no tickers with enough data to backtest");
        return ExitCode::from(5);
    }

    print!("{}", format_summary(&report));

    if let Some(dir) = output_dir {
        let reporter = CsvReportAdapter::new(dir.to_path_buf());
        if let Err(e) = reporter.write_all(&report) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nEquity curves written to: {}", dir.display());
    }

    ExitCode::SUCCESS
}

pub fn format_summary(report: &PortfolioReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "============== BACKTEST RESULTS ==============");
    let _ = writeln!(out, "Starting Capital: {:.2}", summary.initial_capital);
    let _ = writeln!(out, "Final Capital: {:.2}", summary.final_strategy_capital);
    let _ = writeln!(
        out,
        "The Strategy Returned: {:.2}%",
        summary.strategy_return_pct()
    );
    let _ = writeln!(out, "------------------------");
    let _ = writeln!(
        out,
        "The Strategy Outperformed Buy and Hold: {:.2}% of the time",
        summary.outperformed_rate()
    );
    let _ = writeln!(
        out,
        "The Strategy was Profitable: {:.2}% of the time",
        summary.profitable_rate()
    );
    let _ = writeln!(
        out,
        "In this time Buy and Hold: {:.2}%",
        summary.buy_and_hold_return_pct()
    );
    let _ = writeln!(out, "===============================================");

    let _ = writeln!(out, "\n=== Per-Ticker Summary ===");
    for run in &report.runs {
        let m = TickerMetrics::compute(run);
        let _ = writeln!(
            out,
            "  {}:  {:+.2}% vs buy and hold {:+.2}%, max drawdown -{:.1}%{}",
            run.ticker,
            m.strategy.total_return * 100.0,
            m.buy_and_hold.total_return * 100.0,
            m.strategy.max_drawdown * 100.0,
            if run.outperformed() { ", outperformed" } else { "" },
        );
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "\n=== Skipped ===");
        for s in &report.skipped {
            let _ = writeln!(out, "  {}: {}", s.ticker, s.reason);
        }
    }

    out
}

fn run_signals(
    config_path: &Path,
    positions_override: Option<&PathBuf>,
    equity_override: Option<f64>,
) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = build_strategy_config(&adapter).and_then(|strategy| {
        let tickers = resolve_tickers(None, &adapter)?;
        Ok((strategy, tickers))
    });
    let (strategy, tickers) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let equity = equity_override
        .unwrap_or_else(|| adapter.get_double("live", "equity", DEFAULT_LIVE_EQUITY));
    if !(equity.is_finite() && equity > 0.0) {
        let err = RevtraderError::ConfigInvalid {
            section: "live".into(),
            key: "equity".into(),
            reason: "equity must be positive".into(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    let positions_path = positions_override.cloned().or_else(|| {
        adapter
            .get_string("live", "positions_file")
            .map(PathBuf::from)
    });

    let book = match positions_path.as_deref().map(load_positions) {
        Some(Ok(book)) => book,
        Some(Err(e)) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
        None => PositionBook::new(),
    };

    let data_port = CsvAdapter::new(data_path(&adapter));
    let mut broker = PaperBroker::new(equity);
    let (report, book) = run_signals_pipeline(&data_port, &mut broker, &tickers, &strategy, book);

    print!("{}", format_cycle(&report, &book));

    if let Some(path) = positions_path {
        if let Err(e) = save_positions(&path, &book) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        info!("Positions written to {}", path.display());
    }

    cycle_exit_code(&report)
}

pub fn run_signals_pipeline(
    data_port: &dyn DataPort,
    broker: &mut dyn BrokerPort,
    tickers: &[String],
    strategy: &StrategyConfig,
    book: PositionBook,
) -> (CycleReport, PositionBook) {
    info!("Running decision cycle over {} tickers", tickers.len());
    let (report, book) = run_cycle(data_port, broker, tickers, strategy, book);
    if report.failure_count() > 0 {
        warn!(
            "{} of {} tickers failed this cycle",
            report.failure_count(),
            report.outcomes.len()
        );
    }
    (report, book)
}

/// Success unless every ticker failed.
pub fn cycle_exit_code(report: &CycleReport) -> ExitCode {
    if !report.outcomes.is_empty() && report.failure_count() == report.outcomes.len() {
        if let Some((_, e)) = report.failed().next() {
            return e.into();
        }
    }
    ExitCode::SUCCESS
}

/// One line per order, running the position forward as each order fills.
pub fn format_decision(decision: &TradeDecision) -> Vec<String> {
    let mut position = decision.current_position;
    let mut lines = Vec::with_capacity(decision.orders.len());

    for order in &decision.orders {
        position += order.signed_quantity();
        let line = match order.purpose {
            OrderPurpose::CloseLong | OrderPurpose::CloseShort => format!(
                "=== {}: {} UNITS OF {} ===",
                order.purpose, order.quantity, order.ticker
            ),
            OrderPurpose::OpenLong | OrderPurpose::OpenShort => format!(
                "=== {} {} @ {:.2} | SIZE: {} | TOTAL: {} ===",
                order.purpose,
                order.ticker,
                decision.close.unwrap_or_default(),
                order.quantity,
                position
            ),
        };
        lines.push(line);
    }

    lines
}

pub fn format_cycle(report: &CycleReport, book: &PositionBook) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(action) => {
                for line in format_decision(&action.decision) {
                    let _ = writeln!(out, "{}", line);
                }
            }
            Err(e) => {
                let _ = writeln!(out, "ERROR WITH ORDER ON {}: {}", outcome.ticker, e);
            }
        }
    }

    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(out, "-------- Current Open Positions --------");
    for (ticker, quantity) in book.open_positions() {
        if quantity > 0 {
            let _ = writeln!(out, "{}: Long | {} shares", ticker, quantity);
        } else {
            let _ = writeln!(out, "{}: Short | {} shares", ticker, quantity.abs());
        }
    }
    let _ = writeln!(out, "----------------------------------------");

    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = build_strategy_config(&adapter).and_then(|strategy| {
        let tickers = resolve_tickers(None, &adapter)?;
        Ok((strategy, tickers))
    });
    let (strategy, tickers) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = build_backtest_config(&adapter);

    println!("SMA window:      {}", strategy.sma_window);
    println!("Percentiles:     {}", strategy.percentiles);
    println!(
        "Sizing:          scale {}, max fraction {}",
        strategy.sizing.scale, strategy.sizing.max_fraction
    );
    println!("Initial capital: {:.2}", bt_config.initial_capital);
    println!("Tickers:         {}", tickers.join(", "));
    println!("Data path:       {}", data_path(&adapter).display());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::{OrderIntent, Side};
    use crate::domain::signal::Signal;

    fn decision(current: i64, orders: Vec<OrderIntent>) -> TradeDecision {
        TradeDecision {
            close: Some(105.0),
            signal: Signal::Long,
            orders,
            ..TradeDecision::hold("AAPL", current)
        }
    }

    fn order(side: Side, quantity: i64, purpose: OrderPurpose) -> OrderIntent {
        OrderIntent {
            ticker: "AAPL".into(),
            side,
            quantity,
            purpose,
        }
    }

    #[test]
    fn format_decision_close_then_open() {
        let d = decision(
            -5,
            vec![
                order(Side::Buy, 5, OrderPurpose::CloseShort),
                order(Side::Buy, 10, OrderPurpose::OpenLong),
            ],
        );
        assert_eq!(
            format_decision(&d),
            vec![
                "=== CLOSE SHORT: 5 UNITS OF AAPL ===".to_string(),
                "=== LONG AAPL @ 105.00 | SIZE: 10 | TOTAL: 10 ===".to_string(),
            ]
        );
    }

    #[test]
    fn format_decision_pyramids_total() {
        let d = decision(4, vec![order(Side::Buy, 3, OrderPurpose::OpenLong)]);
        assert_eq!(
            format_decision(&d),
            vec!["=== LONG AAPL @ 105.00 | SIZE: 3 | TOTAL: 7 ===".to_string()]
        );
    }

    #[test]
    fn format_decision_hold_is_silent() {
        assert!(format_decision(&TradeDecision::hold("AAPL", 4)).is_empty());
    }

    #[test]
    fn format_cycle_lists_open_positions() {
        let book: PositionBook = vec![("AAPL".to_string(), 12), ("MSFT".to_string(), -3)]
            .into_iter()
            .collect();
        let out = format_cycle(&CycleReport::default(), &book);
        assert!(out.contains("AAPL: Long | 12 shares"));
        assert!(out.contains("MSFT: Short | 3 shares"));
    }

    #[test]
    fn empty_cycle_exits_successfully() {
        let code = cycle_exit_code(&CycleReport::default());
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::SUCCESS));
    }
}
