//! # Money Pot Core
//!
//! Core records and rules for escrow-backed challenge pots.
//!
//! This crate provides the fundamental building blocks:
//! - [`Pot`] and [`Attempt`] - the lifecycle records
//! - [`EventLog`] - append-only audit trail
//! - [`PayoutSplit`] and [`Transfer`] - escrow accounting
//! - [`AccessControl`] - oracle / creator / hunter checks
//! - [`MarketError`] - error taxonomy

pub mod access;
pub mod config;
pub mod error;
pub mod escrow;
pub mod event;
pub mod pot;
pub mod types;

// Re-exports for convenience
pub use access::{AccessControl, Role};
pub use config::{MarketConfig, ATTEMPT_WINDOW_SECS, DIFFICULTY_MODULUS, HUNTER_PAYOUT_PERCENT};
pub use error::{MarketError, Result};
pub use escrow::{PayoutSplit, Transfer};
pub use event::{Event, EventKind, EventLog};
pub use pot::{difficulty_for, Attempt, Pot, PotParams};
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::access::Role;
    pub use crate::config::MarketConfig;
    pub use crate::error::{MarketError, Result};
    pub use crate::event::{Event, EventKind};
    pub use crate::pot::{Attempt, Pot, PotParams};
    pub use crate::types::{AccountId, AssetType, AttemptId, PotId, Timestamp};
}
