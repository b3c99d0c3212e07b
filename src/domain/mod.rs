//! Core domain types and logic.

pub mod price;
pub mod ratio;
pub mod threshold;
pub mod signal;
pub mod sizing;
pub mod strategy;
pub mod analysis;
pub mod decision;
pub mod backtest;
pub mod portfolio;
pub mod metrics;
pub mod universe;
pub mod execution;
pub mod config_validation;
pub mod error;
