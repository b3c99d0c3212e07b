//! Price-to-SMA ratio series.
//!
//! SMA(n) at bar i is the arithmetic mean of closes i+1-n ..= i. The first
//! (n-1) bars have no SMA and therefore no ratio.

use chrono::NaiveDateTime;

use super::price::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioPoint {
    pub timestamp: NaiveDateTime,
    pub sma: Option<f64>,
    pub ratio: Option<f64>,
}

/// Parallel to a [`PriceSeries`]: one point per bar, defined from bar n-1 on.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioSeries {
    pub window: usize,
    pub points: Vec<RatioPoint>,
}

impl RatioSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ratio values with the undefined warmup dropped.
    pub fn defined(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.ratio).collect()
    }

    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.ratio.is_some()).count()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.ratio)
    }
}

/// Simple moving average over a slice of closes. Window 0 is never defined.
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let warmup = window.saturating_sub(1);
    (0..closes.len())
        .map(|i| {
            if window == 0 || i < warmup {
                return None;
            }
            let start = i + 1 - window;
            Some(closes[start..=i].iter().sum::<f64>() / window as f64)
        })
        .collect()
}

pub fn build_ratio_series(series: &PriceSeries, window: usize) -> RatioSeries {
    let closes = series.closes();
    let averages = sma(&closes, window);

    let points = series
        .bars()
        .iter()
        .zip(averages)
        .map(|(bar, sma)| RatioPoint {
            timestamp: bar.timestamp,
            sma,
            ratio: sma.filter(|s| *s > 0.0).map(|s| bar.close / s),
        })
        .collect();

    RatioSeries { window, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                close,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn sma_warmup() {
        let values = sma(&[10.0, 20.0, 30.0, 40.0], 3);
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_relative_eq!(values[2].unwrap(), 20.0);
        assert_relative_eq!(values[3].unwrap(), 30.0);
    }

    #[test]
    fn sma_window_one_is_identity() {
        let values = sma(&[5.0, 7.0], 1);
        assert_eq!(values, vec![Some(5.0), Some(7.0)]);
    }

    #[test]
    fn sma_window_zero_never_defined() {
        assert!(sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn sma_longer_than_series() {
        assert!(sma(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }

    #[test]
    fn ratio_series_values() {
        let series = make_series(&[100.0, 101.0, 99.0, 103.0, 97.0, 105.0]);
        let ratios = build_ratio_series(&series, 2);

        assert_eq!(ratios.len(), 6);
        assert_eq!(ratios.points[0].ratio, None);
        // 101 / 100.5
        assert_relative_eq!(ratios.points[1].ratio.unwrap(), 101.0 / 100.5);
        // 99 / 100
        assert_relative_eq!(ratios.points[2].ratio.unwrap(), 0.99);
        assert_eq!(ratios.defined_count(), 5);
        assert_relative_eq!(ratios.latest().unwrap(), 105.0 / 101.0);
    }

    #[test]
    fn constant_series_has_unit_ratio() {
        let series = make_series(&[42.0; 10]);
        let ratios = build_ratio_series(&series, 4);
        for value in ratios.defined() {
            assert_relative_eq!(value, 1.0);
        }
        assert_eq!(ratios.defined().len(), 7);
    }

    #[test]
    fn timestamps_parallel_to_prices() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let ratios = build_ratio_series(&series, 2);
        let stamps: Vec<_> = ratios.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, series.timestamps());
    }
}
