//! Buy/sell/hold classification of ratio observations.

use std::fmt;

use super::ratio::RatioSeries;
use super::threshold::ThresholdSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    Short,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => write!(f, "LONG"),
            Signal::Short => write!(f, "SHORT"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Short is tested first and a Long match overrides it, so crossed
/// thresholds resolve to Long.
pub fn classify(ratio: f64, thresholds: &ThresholdSet) -> Signal {
    let mut signal = Signal::Hold;
    if ratio > thresholds.sell() {
        signal = Signal::Short;
    }
    if ratio < thresholds.buy() {
        signal = Signal::Long;
    }
    signal
}

/// One signal per bar; bars without a defined ratio are Hold.
pub fn classify_series(ratios: &RatioSeries, thresholds: &ThresholdSet) -> Vec<Signal> {
    ratios
        .points
        .iter()
        .map(|p| match p.ratio {
            Some(r) => classify(r, thresholds),
            None => Signal::Hold,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(buy: f64, sell: f64) -> ThresholdSet {
        ThresholdSet {
            values: [buy, buy - 0.01, 1.0, sell + 0.01, sell],
        }
    }

    #[test]
    fn below_buy_is_long() {
        assert_eq!(classify(0.95, &thresholds(0.97, 1.03)), Signal::Long);
    }

    #[test]
    fn above_sell_is_short() {
        assert_eq!(classify(1.05, &thresholds(0.97, 1.03)), Signal::Short);
    }

    #[test]
    fn between_is_hold() {
        assert_eq!(classify(1.0, &thresholds(0.97, 1.03)), Signal::Hold);
    }

    #[test]
    fn boundaries_are_hold() {
        let t = thresholds(0.97, 1.03);
        assert_eq!(classify(0.97, &t), Signal::Hold);
        assert_eq!(classify(1.03, &t), Signal::Hold);
    }

    #[test]
    fn crossed_thresholds_resolve_to_long() {
        // sell below buy: 1.0 is both above sell and below buy
        let t = thresholds(1.02, 0.98);
        assert_eq!(classify(1.0, &t), Signal::Long);
    }

    #[test]
    fn nan_ratio_is_hold() {
        assert_eq!(classify(f64::NAN, &thresholds(0.97, 1.03)), Signal::Hold);
    }

    #[test]
    fn display() {
        assert_eq!(Signal::Long.to_string(), "LONG");
        assert_eq!(Signal::Short.to_string(), "SHORT");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }
}
