//! Error types for Money Pot.

use thiserror::Error;

use crate::access::Role;
use crate::types::{AccountId, AssetType, AttemptId, PotId, Timestamp};

/// Main error type for market operations.
///
/// Every variant is surfaced to the caller unchanged; none is retried or
/// folded into another.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// The per-attempt fee exceeds the deposit.
    #[error("Invalid fee: fee {fee} exceeds deposit {amount}")]
    InvalidFee { fee: u64, amount: u64 },

    /// The pot has already been solved or expired.
    #[error("Pot {pot_id} is not active")]
    PotNotActive { pot_id: PotId },

    /// A creator tried to attempt their own pot.
    #[error("Creator cannot attempt their own pot {pot_id}")]
    CreatorCannotAttempt { pot_id: PotId },

    /// The source account cannot cover the amount.
    #[error("Insufficient funds: {account} holds {available} {asset}, needs {required}")]
    InsufficientFunds {
        account: AccountId,
        asset: AssetType,
        required: u64,
        available: u64,
    },

    /// The pot's own expiry has passed.
    #[error("Pot {pot_id} expired at {expires_at}")]
    PotExpired { pot_id: PotId, expires_at: Timestamp },

    /// Expiry was requested before the pot's expiry time.
    #[error("Pot {pot_id} does not expire until {expires_at}")]
    NotYetExpired { pot_id: PotId, expires_at: Timestamp },

    /// The attempt's reporting window has passed.
    #[error("Attempt {attempt_id} expired at {expires_at}")]
    AttemptExpired {
        attempt_id: AttemptId,
        expires_at: Timestamp,
    },

    /// An outcome was already reported for this attempt.
    #[error("Attempt {attempt_id} is already completed")]
    AttemptAlreadyCompleted { attempt_id: AttemptId },

    /// The caller does not hold the role the operation requires.
    #[error("Unauthorized: {caller} is not the {required}")]
    Unauthorized { caller: AccountId, required: Role },

    /// Resource not found.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: u64 },

    /// The custodian rejected a transfer for a reason other than funds.
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Market configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MarketError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::InvalidFee { .. } => "invalid_fee",
            MarketError::PotNotActive { .. } => "pot_not_active",
            MarketError::CreatorCannotAttempt { .. } => "creator_cannot_attempt",
            MarketError::InsufficientFunds { .. } => "insufficient_funds",
            MarketError::PotExpired { .. } => "pot_expired",
            MarketError::NotYetExpired { .. } => "not_yet_expired",
            MarketError::AttemptExpired { .. } => "attempt_expired",
            MarketError::AttemptAlreadyCompleted { .. } => "attempt_already_completed",
            MarketError::Unauthorized { .. } => "unauthorized",
            MarketError::NotFound { .. } => "not_found",
            MarketError::Transfer(_) => "transfer_error",
            MarketError::Overflow(_) => "overflow",
            MarketError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Shorthand for a missing pot.
    pub fn pot_not_found(id: PotId) -> Self {
        MarketError::NotFound {
            resource_type: "Pot".to_string(),
            id,
        }
    }

    /// Shorthand for a missing attempt.
    pub fn attempt_not_found(id: AttemptId) -> Self {
        MarketError::NotFound {
            resource_type: "Attempt".to_string(),
            id,
        }
    }
}

/// Convenience Result type for market operations.
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            MarketError::InvalidFee { fee: 2, amount: 1 },
            MarketError::PotNotActive { pot_id: 0 },
            MarketError::CreatorCannotAttempt { pot_id: 0 },
            MarketError::InsufficientFunds {
                account: AccountId::new("a"),
                asset: AssetType::new("x"),
                required: 1,
                available: 0,
            },
            MarketError::PotExpired { pot_id: 0, expires_at: 1 },
            MarketError::NotYetExpired { pot_id: 0, expires_at: 1 },
            MarketError::AttemptExpired { attempt_id: 0, expires_at: 1 },
            MarketError::AttemptAlreadyCompleted { attempt_id: 0 },
            MarketError::Unauthorized {
                caller: AccountId::new("a"),
                required: Role::Oracle,
            },
            MarketError::pot_not_found(0),
            MarketError::Transfer("x".into()),
            MarketError::Overflow("x".into()),
            MarketError::InvalidConfig("x".into()),
        ];

        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display() {
        let err = MarketError::Unauthorized {
            caller: AccountId::new("mallory"),
            required: Role::Oracle,
        };
        assert_eq!(err.to_string(), "Unauthorized: mallory is not the oracle");
    }
}
