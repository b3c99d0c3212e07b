//! Configuration validation.
//!
//! Validates all config fields before a backtest or live cycle runs.

use crate::domain::error::RevtraderError;
use crate::domain::sizing::MAX_FRACTION_CAP;
use crate::domain::threshold::PercentileLevels;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    validate_live_config(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    validate_sma_window(config)?;
    parse_percentiles(config)?;
    validate_positive(config, "strategy", "size_scale")?;
    validate_max_fraction(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    validate_initial_capital(config)?;
    validate_tickers(config)?;
    Ok(())
}

pub fn validate_live_config(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    validate_positive(config, "live", "equity")
}

fn invalid(section: &str, key: &str, reason: &str) -> RevtraderError {
    RevtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_sma_window(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    let Some(raw) = config.get_string("strategy", "sma_window") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(()),
        _ => Err(invalid(
            "strategy",
            "sma_window",
            "sma_window must be a positive integer",
        )),
    }
}

/// Reads `[strategy] percentiles`, falling back to the default levels when
/// the key is absent. The five values keep their configured order; slot 0
/// is read as the buy threshold, 1 low, 2 mid, 3 high, 4 sell.
pub fn parse_percentiles(config: &dyn ConfigPort) -> Result<PercentileLevels, RevtraderError> {
    let Some(items) = config.get_list("strategy", "percentiles") else {
        return Ok(PercentileLevels::default());
    };

    let values = items
        .iter()
        .map(|s| s.parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| invalid("strategy", "percentiles", "percentiles must be numbers"))?;

    PercentileLevels::from_slice(&values).ok_or_else(|| {
        invalid(
            "strategy",
            "percentiles",
            "percentiles must be exactly five values between 0 and 100",
        )
    })
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), RevtraderError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(invalid(section, key, &format!("{} must be positive", key))),
    }
}

fn validate_max_fraction(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    let Some(raw) = config.get_string("strategy", "max_fraction") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 && v <= MAX_FRACTION_CAP => Ok(()),
        _ => Err(invalid(
            "strategy",
            "max_fraction",
            &format!("max_fraction must be in (0, {}]", MAX_FRACTION_CAP),
        )),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    let value = config.get_double("backtest", "initial_capital", 0.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), RevtraderError> {
    match config.get_string("backtest", "tickers") {
        Some(s) if !s.trim().is_empty() => parse_tickers(&s)
            .map(|_| ())
            .map_err(|e| invalid("backtest", "tickers", &e.to_string())),
        _ => Err(RevtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "tickers".to_string(),
        }),
    }
}
