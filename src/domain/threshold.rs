//! Empirical percentile thresholds over a ratio series.
//!
//! A [`ThresholdSet`] has five positional slots:
//!
//! | slot | meaning         | default percentile |
//! |------|-----------------|--------------------|
//! | 0    | buy threshold   | 5                  |
//! | 1    | low reference   | 0 (series minimum) |
//! | 2    | mid reference   | 50                 |
//! | 3    | high reference  | 100 (series max)   |
//! | 4    | sell threshold  | 95                 |
//!
//! Sizing reads slots 0/1 and 3/4 by position. The slot meanings only hold
//! for a percentile list shaped like the default; reordering the configured
//! levels reorders the slots with them.

use std::fmt;

use super::error::SeriesError;

pub const SLOT_BUY: usize = 0;
pub const SLOT_LOW: usize = 1;
pub const SLOT_MID: usize = 2;
pub const SLOT_HIGH: usize = 3;
pub const SLOT_SELL: usize = 4;

/// Five percentile levels in [0, 100], kept in definition order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileLevels(pub [f64; 5]);

impl Default for PercentileLevels {
    fn default() -> Self {
        PercentileLevels([5.0, 0.0, 50.0, 100.0, 95.0])
    }
}

impl PercentileLevels {
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let levels: [f64; 5] = values.try_into().ok()?;
        if levels.iter().all(|p| (0.0..=100.0).contains(p)) {
            Some(PercentileLevels(levels))
        } else {
            None
        }
    }
}

impl fmt::Display for PercentileLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub values: [f64; 5],
}

impl ThresholdSet {
    /// Computes the configured percentiles of `ratios` (undefined points
    /// already removed). Fails only when there is nothing to measure.
    pub fn from_ratios(ratios: &[f64], levels: &PercentileLevels) -> Result<Self, SeriesError> {
        if ratios.is_empty() {
            return Err(SeriesError::InsufficientData {
                bars: 0,
                minimum: 1,
            });
        }

        let mut sorted = ratios.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut values = [0.0; 5];
        for (slot, level) in values.iter_mut().zip(levels.0) {
            *slot = percentile_sorted(&sorted, level);
        }
        Ok(ThresholdSet { values })
    }

    pub fn buy(&self) -> f64 {
        self.values[SLOT_BUY]
    }

    pub fn low_reference(&self) -> f64 {
        self.values[SLOT_LOW]
    }

    pub fn mid_reference(&self) -> f64 {
        self.values[SLOT_MID]
    }

    pub fn high_reference(&self) -> f64 {
        self.values[SLOT_HIGH]
    }

    pub fn sell(&self) -> f64 {
        self.values[SLOT_SELL]
    }

    /// True when a sizing gap has zero or negative width, or the buy and
    /// sell thresholds have met or crossed.
    pub fn is_degenerate(&self) -> bool {
        self.buy() <= self.low_reference()
            || self.high_reference() <= self.sell()
            || self.buy() >= self.sell()
    }
}

/// Linear-interpolation percentile of an ascending slice, `p` in [0, 100].
///
/// The rank is `p / 100 * (n - 1)`; values between ranks are interpolated
/// from whichever neighbour is nearer so that p = 0 and p = 100 return the
/// exact extremes.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let t = rank - lo as f64;
            let (a, b) = (sorted[lo], sorted[hi]);
            if t >= 0.5 {
                b - (b - a) * (1.0 - t)
            } else {
                a + (b - a) * t
            }
        }
    }
}
