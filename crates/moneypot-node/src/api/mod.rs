//! HTTP and WebSocket handlers.

pub mod attempts;
pub mod caller;
pub mod error;
pub mod events;
pub mod health;
pub mod pots;
pub mod ws;

pub use caller::Caller;
pub use error::{ApiError, ApiResult};
