//! CSV report adapter implementing ReportPort.
//!
//! Writes one `<TICKER>_equity.csv` per backtested ticker and a single
//! `portfolio_equity.csv` with the averaged curves.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RevtraderError;
use crate::domain::portfolio::PortfolioReport;
use crate::ports::report_port::ReportPort;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn ticker_path(&self, ticker: &str) -> PathBuf {
        self.output_dir.join(format!("{}_equity.csv", ticker))
    }

    pub fn portfolio_path(&self) -> PathBuf {
        self.output_dir.join("portfolio_equity.csv")
    }

    fn writer(&self, path: &Path) -> Result<csv::Writer<fs::File>, RevtraderError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| RevtraderError::Report {
            reason: format!("failed to create {}: {}", self.output_dir.display(), e),
        })?;
        csv::Writer::from_path(path).map_err(|e| report_error(path, e))
    }
}

fn report_error(path: &Path, e: impl std::fmt::Display) -> RevtraderError {
    RevtraderError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_ticker(&self, result: &BacktestResult) -> Result<(), RevtraderError> {
        let path = self.ticker_path(&result.ticker);
        let mut wtr = self.writer(&path)?;

        wtr.write_record(["timestamp", "close", "equity", "buy_and_hold"])
            .map_err(|e| report_error(&path, e))?;
        for point in &result.equity_curve {
            wtr.write_record([
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                point.close.to_string(),
                format!("{:.2}", point.equity),
                format!("{:.2}", point.buy_and_hold),
            ])
            .map_err(|e| report_error(&path, e))?;
        }
        wtr.flush().map_err(|e| report_error(&path, e))?;

        info!(ticker = %result.ticker, path = %path.display(), "equity curve written");
        Ok(())
    }

    fn write_portfolio(&self, report: &PortfolioReport) -> Result<(), RevtraderError> {
        let path = self.portfolio_path();
        let mut wtr = self.writer(&path)?;

        wtr.write_record(["timestamp", "strategy", "buy_and_hold"])
            .map_err(|e| report_error(&path, e))?;
        for point in &report.aggregate_curve {
            wtr.write_record([
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.2}", point.strategy),
                format!("{:.2}", point.buy_and_hold),
            ])
            .map_err(|e| report_error(&path, e))?;
        }
        wtr.flush().map_err(|e| report_error(&path, e))?;

        info!(path = %path.display(), points = report.aggregate_curve.len(), "portfolio curve written");
        Ok(())
    }
}
