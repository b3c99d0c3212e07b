//! Strategy parameters for the SMA mean-reversion rule.

use super::sizing::SizingParams;
use super::threshold::PercentileLevels;

pub const DEFAULT_SMA_WINDOW: usize = 21;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub sma_window: usize,
    pub percentiles: PercentileLevels,
    pub sizing: SizingParams,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            sma_window: DEFAULT_SMA_WINDOW,
            percentiles: PercentileLevels::default(),
            sizing: SizingParams::default(),
        }
    }
}

impl StrategyConfig {
    /// Bars needed before the latest point has a defined ratio.
    pub fn minimum_bars(&self) -> usize {
        self.sma_window.max(1)
    }
}
