//! Single analysis pass over one ticker's price history.
//!
//! price series -> ratio series -> thresholds -> per-bar signals. Thresholds
//! are estimated from the whole series, so every bar is classified against
//! the same set.

use tracing::warn;

use super::error::SeriesError;
use super::price::PriceSeries;
use super::ratio::{RatioSeries, build_ratio_series};
use super::signal::{Signal, classify_series};
use super::strategy::StrategyConfig;
use super::threshold::ThresholdSet;

#[derive(Debug, Clone, PartialEq)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub ratios: RatioSeries,
    pub thresholds: ThresholdSet,
    pub signals: Vec<Signal>,
}

impl TickerAnalysis {
    pub fn latest_signal(&self) -> Signal {
        self.signals.last().copied().unwrap_or(Signal::Hold)
    }

    pub fn latest_ratio(&self) -> Option<f64> {
        self.ratios.latest()
    }
}

pub fn analyze(series: &PriceSeries, config: &StrategyConfig) -> Result<TickerAnalysis, SeriesError> {
    let minimum = config.minimum_bars();
    if series.len() < minimum {
        return Err(SeriesError::InsufficientData {
            bars: series.len(),
            minimum,
        });
    }

    let ratios = build_ratio_series(series, config.sma_window);
    let thresholds = ThresholdSet::from_ratios(&ratios.defined(), &config.percentiles).map_err(
        |_| SeriesError::InsufficientData {
            bars: series.len(),
            minimum,
        },
    )?;

    if thresholds.is_degenerate() {
        warn!(
            ticker = series.ticker(),
            thresholds = ?thresholds.values,
            "degenerate thresholds, sizing falls back to epsilon floor"
        );
    }

    let signals = classify_series(&ratios, &thresholds);

    Ok(TickerAnalysis {
        ticker: series.ticker().to_string(),
        ratios,
        thresholds,
        signals,
    })
}
