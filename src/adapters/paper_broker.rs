//! Deterministic paper broker.
//!
//! Every order is acknowledged and filled immediately in full. Equity is
//! fixed at construction; the broker keeps a log of accepted orders with
//! sequential ids and never touches the network.

use tracing::info;

use crate::domain::decision::OrderIntent;
use crate::domain::error::RevtraderError;
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFill {
    pub order_id: String,
    pub order: OrderIntent,
}

pub struct PaperBroker {
    equity: f64,
    next_order_id: u64,
    fills: Vec<PaperFill>,
}

impl PaperBroker {
    pub fn new(equity: f64) -> Self {
        Self {
            equity,
            next_order_id: 1,
            fills: Vec::new(),
        }
    }

    pub fn fills(&self) -> &[PaperFill] {
        &self.fills
    }

    pub fn fill_count(&self) -> usize {
        self.fills.len()
    }
}

impl BrokerPort for PaperBroker {
    fn account_equity(&self) -> Result<f64, RevtraderError> {
        Ok(self.equity)
    }

    fn submit_order(&mut self, order: &OrderIntent) -> Result<(), RevtraderError> {
        if order.quantity < 1 {
            return Err(RevtraderError::Broker {
                ticker: order.ticker.clone(),
                reason: format!("quantity must be positive, got {}", order.quantity),
            });
        }

        let order_id = format!("PAPER-{:06}", self.next_order_id);
        self.next_order_id += 1;

        info!(
            order_id = %order_id,
            ticker = %order.ticker,
            side = %order.side,
            quantity = order.quantity,
            "paper order filled"
        );

        self.fills.push(PaperFill {
            order_id,
            order: order.clone(),
        });
        Ok(())
    }
}
