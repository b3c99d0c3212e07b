//! Order execution port.

use crate::domain::decision::OrderIntent;
use crate::domain::error::RevtraderError;

/// Brokerage collaborator. Implementations own retries and connectivity;
/// an `Ok` from `submit_order` means the order filled as requested.
pub trait BrokerPort {
    fn account_equity(&self) -> Result<f64, RevtraderError>;

    fn submit_order(&mut self, order: &OrderIntent) -> Result<(), RevtraderError>;
}
