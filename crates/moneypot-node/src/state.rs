//! Application state.

use std::sync::Arc;

use moneypot_state::{EventBus, Market};
use tokio::sync::RwLock;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The hosted market. Writers hold the lock for the whole operation, so
    /// lifecycle calls never interleave.
    pub market: Arc<RwLock<Market>>,

    /// Event bus of the hosted market, usable without taking the lock.
    pub bus: EventBus,
}

impl AppState {
    /// Create a new application state.
    pub fn new(market: Market) -> Self {
        let bus = market.bus().clone();
        Self {
            market: Arc::new(RwLock::new(market)),
            bus,
        }
    }
}
