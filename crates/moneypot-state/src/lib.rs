//! # Money Pot State
//!
//! The authoritative market: registry, custody, clock and the lifecycle
//! operations that tie them together.

pub mod clock;
pub mod custody;
pub mod market;
pub mod registry;
pub mod subscription;

pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{Custodian, InMemoryCustodian};
pub use market::Market;
pub use registry::Registry;
pub use subscription::{EventBus, EventSubscription, SubscriptionFilter};
