//! Market-data access port.

use crate::domain::error::RevtraderError;
use crate::domain::price::PriceBar;

/// Source of close-price history. How bars are obtained (files, a vendor
/// API, a cache) is the adapter's business; the core only sees bars.
pub trait DataPort {
    fn fetch_closes(&self, ticker: &str) -> Result<Vec<PriceBar>, RevtraderError>;
}
