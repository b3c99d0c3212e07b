//! Summary statistics for a single equity curve.

use super::backtest::BacktestResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveMetrics {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl CurveMetrics {
    pub fn compute(curve: &[f64]) -> Self {
        let total_return = match (curve.first(), curve.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => (last - first) / first,
            _ => 0.0,
        };
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(curve);

        CurveMetrics {
            total_return,
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

/// Strategy and buy-and-hold metrics for one backtest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerMetrics {
    pub strategy: CurveMetrics,
    pub buy_and_hold: CurveMetrics,
}

impl TickerMetrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let baseline: Vec<f64> = result.equity_curve.iter().map(|p| p.buy_and_hold).collect();
        TickerMetrics {
            strategy: CurveMetrics::compute(&result.equity_values()),
            buy_and_hold: CurveMetrics::compute(&baseline),
        }
    }
}

/// Largest peak-to-trough fall as a fraction of the peak, and the longest
/// run of bars spent below a prior peak.
fn compute_drawdown(curve: &[f64]) -> (f64, usize) {
    let Some(&first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0;
    let mut current_dd_duration = 0;

    for &equity in curve {
        if equity >= peak {
            peak = equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_curve() {
        let m = CurveMetrics::compute(&[100.0, 100.0, 100.0]);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.max_drawdown_duration, 0);
    }

    #[test]
    fn total_return() {
        let m = CurveMetrics::compute(&[100.0, 90.0, 125.0]);
        assert_relative_eq!(m.total_return, 0.25);
    }

    #[test]
    fn drawdown_from_peak() {
        // peak 120, trough 90 -> 25%
        let m = CurveMetrics::compute(&[100.0, 120.0, 100.0, 90.0, 110.0, 130.0]);
        assert_relative_eq!(m.max_drawdown, 0.25);
        assert_eq!(m.max_drawdown_duration, 3);
    }

    #[test]
    fn empty_curve() {
        let m = CurveMetrics::compute(&[]);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }
}
