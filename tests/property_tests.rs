//! Property tests for signal, sizing and simulation invariants.
//!
//! Uses proptest to verify:
//! 1. Fraction bounds: sizing stays within [0, 2] for any finite inputs
//! 2. Constant prices: SMA equals the price and every defined ratio is 1
//! 3. Curve anchoring: the equity curve starts at initial capital
//! 4. Determinism: replaying the same inputs yields the same curve
//! 5. Idle strategy: all-Hold signals leave capital untouched
//! 6. Aggregation: portfolio P&L equals the sum of ticker P&L

mod common;

use common::*;
use proptest::prelude::*;
use revtrader::domain::backtest::{BacktestConfig, run_backtest, simulate};
use revtrader::domain::portfolio::summarize;
use revtrader::domain::ratio::{build_ratio_series, sma};
use revtrader::domain::signal::Signal;
use revtrader::domain::sizing::{SizingParams, position_fraction, share_quantity};
use revtrader::domain::threshold::ThresholdSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_ratio() -> impl Strategy<Value = f64> {
    0.5..1.5_f64
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..60)
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Long), Just(Signal::Short), Just(Signal::Hold)]
}

fn arb_path() -> impl Strategy<Value = (Vec<f64>, Vec<Signal>)> {
    arb_closes().prop_flat_map(|closes| {
        let n = closes.len();
        (Just(closes), prop::collection::vec(arb_signal(), n))
    })
}

// ── 1. Fraction bounds ───────────────────────────────────────────────

proptest! {
    /// Any threshold layout, including crossed or collapsed ones.
    #[test]
    fn fraction_is_clamped(
        values in prop::array::uniform5(arb_ratio()),
        ratio in arb_ratio(),
        signal in arb_signal(),
    ) {
        let thresholds = ThresholdSet { values };
        let f = position_fraction(signal, ratio, &thresholds, &SizingParams::default());
        prop_assert!(f.is_finite());
        prop_assert!((0.0..=2.0).contains(&f));
    }

    /// buy == low engages the epsilon floor without escaping the clamp.
    #[test]
    fn fraction_clamped_when_gap_collapses(level in arb_ratio(), ratio in arb_ratio()) {
        let thresholds = ThresholdSet { values: [level, level, level, level, level] };
        for signal in [Signal::Long, Signal::Short] {
            let f = position_fraction(signal, ratio, &thresholds, &SizingParams::default());
            prop_assert!((0.0..=2.0).contains(&f));
        }
    }

    #[test]
    fn share_quantity_never_overspends(
        equity in 0.0..1_000_000.0_f64,
        fraction in 0.0..2.0_f64,
        price in 0.01..1000.0_f64,
    ) {
        let shares = share_quantity(equity, fraction, price);
        prop_assert!(shares >= 0);
        prop_assert!(shares as f64 * price <= equity * fraction + 1e-6);
    }
}

// ── 2. Constant prices ───────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_series_has_unit_ratio(
        price in 1.0..1000.0_f64,
        len in 1usize..50,
        window in 1usize..10,
    ) {
        let closes = vec![price; len];
        for avg in sma(&closes, window).into_iter().flatten() {
            prop_assert!((avg - price).abs() <= 1e-9 * price);
        }

        let ratios = build_ratio_series(&make_series("FLAT", &closes), window);
        for r in ratios.defined() {
            prop_assert!((r - 1.0).abs() < 1e-9);
        }
        prop_assert_eq!(ratios.defined_count(), len.saturating_sub(window - 1));
    }
}

// ── 3-5. Simulator ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn curve_starts_at_initial_capital(
        (closes, signals) in arb_path(),
        capital in 1.0..1_000_000.0_f64,
    ) {
        let curve = simulate(&closes, &signals, capital);
        prop_assert_eq!(curve.len(), closes.len());
        prop_assert_eq!(curve[0], capital);
    }

    #[test]
    fn simulation_is_deterministic((closes, signals) in arb_path()) {
        let first = simulate(&closes, &signals, 10_000.0);
        let second = simulate(&closes, &signals, 10_000.0);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn all_hold_is_flat(closes in arb_closes(), capital in 1.0..1_000_000.0_f64) {
        let signals = vec![Signal::Hold; closes.len()];
        let curve = simulate(&closes, &signals, capital);
        prop_assert!(curve.iter().all(|&c| c == capital));
    }
}

// ── 6. Aggregation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn portfolio_pnl_is_sum_of_ticker_pnl(
        paths in prop::collection::vec(arb_path(), 1..6),
    ) {
        let config = BacktestConfig { initial_capital: 50_000.0 };
        let runs: Vec<_> = paths
            .iter()
            .enumerate()
            .map(|(i, (closes, signals))| {
                let series = make_series(&format!("T{}", i), closes);
                run_backtest(&series, signals, &config).unwrap()
            })
            .collect();

        let summary = summarize(&runs, config.initial_capital);
        let expected: f64 = runs.iter().map(|r| r.pnl()).sum::<f64>() + config.initial_capital;

        prop_assert!((summary.final_strategy_capital - expected).abs() <= 1e-6 * expected.abs().max(1.0));
        prop_assert_eq!(summary.num_tickers, runs.len());
        prop_assert!(summary.num_profitable <= runs.len());
        prop_assert!(summary.num_outperformed <= runs.len());
    }
}
