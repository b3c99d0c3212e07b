//! Position sizing from signal strength.
//!
//! The allocation fraction grows with how far the ratio has moved past its
//! triggering threshold, measured against the gap between that threshold
//! and the matching extreme:
//!
//! - Long:  `scale * (buy - ratio) / max(buy - low, eps)`
//! - Short: `scale * (ratio - sell) / max(high - sell, eps)`
//!
//! The result is clamped to `[0, max_fraction]`, and `max_fraction` itself
//! never exceeds [`MAX_FRACTION_CAP`]. Anything non-finite is 0.

use super::signal::Signal;
use super::threshold::ThresholdSet;

/// Hard ceiling on the allocation fraction, whatever the config says.
pub const MAX_FRACTION_CAP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingParams {
    pub scale: f64,
    pub max_fraction: f64,
    pub epsilon: f64,
}

impl Default for SizingParams {
    fn default() -> Self {
        SizingParams {
            scale: 0.25,
            max_fraction: 2.0,
            epsilon: 1e-6,
        }
    }
}

pub fn position_fraction(
    signal: Signal,
    ratio: f64,
    thresholds: &ThresholdSet,
    params: &SizingParams,
) -> f64 {
    let (distance, gap) = match signal {
        Signal::Long => (
            thresholds.buy() - ratio,
            thresholds.buy() - thresholds.low_reference(),
        ),
        Signal::Short => (
            ratio - thresholds.sell(),
            thresholds.high_reference() - thresholds.sell(),
        ),
        Signal::Hold => return 0.0,
    };

    let raw = params.scale * distance / gap.max(params.epsilon);
    clamp_fraction(raw, params.max_fraction)
}

fn clamp_fraction(raw: f64, max_fraction: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let ceiling = if max_fraction.is_nan() {
        0.0
    } else {
        max_fraction.clamp(0.0, MAX_FRACTION_CAP)
    };
    raw.clamp(0.0, ceiling)
}

/// Whole shares affordable with `equity * fraction` at `price`; 0 means no trade.
pub fn share_quantity(equity: f64, fraction: f64, price: f64) -> i64 {
    if price.is_nan() || price <= 0.0 {
        return 0;
    }
    let shares = (equity * fraction / price).floor();
    if shares.is_finite() && shares >= 1.0 {
        shares as i64
    } else {
        0
    }
}
