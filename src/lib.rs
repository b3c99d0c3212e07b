//! revtrader: SMA mean-reversion signal generator and backtester.
//!
//! Hexagonal architecture: pure signal, sizing and simulation logic in
//! [`domain`], collaborator traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
