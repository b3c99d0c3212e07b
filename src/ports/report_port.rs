//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RevtraderError;
use crate::domain::portfolio::PortfolioReport;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write_ticker(&self, result: &BacktestResult) -> Result<(), RevtraderError>;

    fn write_portfolio(&self, report: &PortfolioReport) -> Result<(), RevtraderError>;

    /// Default implementation: every ticker curve followed by the aggregate.
    fn write_all(&self, report: &PortfolioReport) -> Result<(), RevtraderError> {
        for run in &report.runs {
            self.write_ticker(run)?;
        }
        self.write_portfolio(report)
    }
}
