//! Pot and attempt records.
//!
//! A pot is an escrowed deposit open to fee-gated attempts until it is solved
//! or expires. An attempt is one hunter's time-boxed try against a pot.

use serde::{Deserialize, Serialize};

use crate::config::DIFFICULTY_MODULUS;
use crate::error::{MarketError, Result};
use crate::types::{AccountId, AssetType, AttemptId, PotId, Timestamp};

/// A challenge deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    /// Unique, monotonic identifier.
    pub id: PotId,

    /// The account that funded the pot.
    pub creator: AccountId,

    /// Value currently escrowed for this pot: the deposit plus every fee paid.
    pub total_value: u64,

    /// Fixed cost of one attempt.
    pub fee: u64,

    /// When the pot was created.
    pub created_at: Timestamp,

    /// After this time no attempts or reports are accepted and the creator
    /// may reclaim the pot.
    pub expires_at: Timestamp,

    /// Cleared exactly once, when the pot is solved or expired.
    pub is_active: bool,

    /// Number of attempts registered so far.
    pub attempts_count: u64,

    /// Opaque identifier supplied by the creator.
    pub unique_tag: String,

    /// The asset this pot escrows.
    pub asset_type: AssetType,
}

impl Pot {
    /// Whether `now` is past the pot's expiry.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Whether the creator could reclaim the pot at `now`.
    pub fn is_expirable_at(&self, now: Timestamp) -> bool {
        self.is_active && self.is_expired_at(now)
    }

    /// Check that the pot accepts attempts and reports at `now`.
    pub fn ensure_open(&self, now: Timestamp) -> Result<()> {
        if !self.is_active {
            return Err(MarketError::PotNotActive { pot_id: self.id });
        }
        if self.is_expired_at(now) {
            return Err(MarketError::PotExpired {
                pot_id: self.id,
                expires_at: self.expires_at,
            });
        }
        Ok(())
    }
}

/// One hunter's registered try against a pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Unique, monotonic identifier.
    pub id: AttemptId,

    /// The pot this attempt targets.
    pub pot_id: PotId,

    /// The account that paid the fee.
    pub hunter: AccountId,

    /// Deadline for the oracle's report.
    pub expires_at: Timestamp,

    /// Derived from how contested the pot was when the attempt was made.
    pub difficulty: u64,

    /// Set exactly once, by the oracle's report.
    pub is_completed: bool,
}

impl Attempt {
    /// Whether the reporting window has closed at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Difficulty for an attempt given the pot's attempt count including it.
///
/// Always within `1..=attempts_count + 2`.
pub fn difficulty_for(attempts_count: u64) -> u64 {
    let raw = (attempts_count % DIFFICULTY_MODULUS) + 2;
    raw.clamp(1, attempts_count.saturating_add(2))
}

/// Parameters for a new pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotParams {
    /// Deposit moved from the creator into custody.
    pub amount: u64,

    /// Seconds until the pot expires.
    pub duration: u64,

    /// Cost of each attempt.
    pub fee: u64,

    /// Opaque creator-supplied identifier.
    #[serde(default)]
    pub unique_tag: String,

    /// Asset to escrow.
    pub asset_type: AssetType,
}

impl PotParams {
    /// Create parameters for a pot of `asset_type`.
    pub fn new(amount: u64, duration: u64, fee: u64, asset_type: impl Into<AssetType>) -> Self {
        Self {
            amount,
            duration,
            fee,
            unique_tag: String::new(),
            asset_type: asset_type.into(),
        }
    }

    /// Set the unique tag.
    pub fn tag(mut self, unique_tag: impl Into<String>) -> Self {
        self.unique_tag = unique_tag.into();
        self
    }

    /// Reject a fee larger than the deposit.
    pub fn validate(&self) -> Result<()> {
        if self.fee > self.amount {
            return Err(MarketError::InvalidFee {
                fee: self.fee,
                amount: self.amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pot() -> Pot {
        Pot {
            id: 0,
            creator: AccountId::new("alice"),
            total_value: 1_000,
            fee: 10,
            created_at: 0,
            expires_at: 100,
            is_active: true,
            attempts_count: 0,
            unique_tag: String::new(),
            asset_type: AssetType::new("APT"),
        }
    }

    #[test]
    fn test_difficulty_first_attempts() {
        assert_eq!(difficulty_for(0), 2);
        assert_eq!(difficulty_for(1), 3);
        assert_eq!(difficulty_for(9), 11);
        assert_eq!(difficulty_for(10), 12);
        assert_eq!(difficulty_for(11), 2);
    }

    #[test]
    fn test_difficulty_bounds() {
        for count in (0..500).chain([u64::MAX - 1, u64::MAX]) {
            let d = difficulty_for(count);
            assert!(d >= 1, "count {count}");
            assert!(d <= count.saturating_add(2), "count {count}");
        }
    }

    #[test]
    fn test_ensure_open() {
        let mut pot = sample_pot();
        assert!(pot.ensure_open(99).is_ok());
        assert_eq!(
            pot.ensure_open(100),
            Err(MarketError::PotExpired {
                pot_id: 0,
                expires_at: 100
            })
        );

        pot.is_active = false;
        assert_eq!(
            pot.ensure_open(0),
            Err(MarketError::PotNotActive { pot_id: 0 })
        );
    }

    #[test]
    fn test_expirable() {
        let mut pot = sample_pot();
        assert!(!pot.is_expirable_at(99));
        assert!(pot.is_expirable_at(100));
        pot.is_active = false;
        assert!(!pot.is_expirable_at(100));
    }

    #[test]
    fn test_params_fee_validation() {
        assert!(PotParams::new(100, 10, 100, "APT").validate().is_ok());
        assert_eq!(
            PotParams::new(100, 10, 101, "APT").validate(),
            Err(MarketError::InvalidFee {
                fee: 101,
                amount: 100
            })
        );
    }

    #[test]
    fn test_params_builder() {
        let params = PotParams::new(1, 2, 0, "APT").tag("0x1fa");
        assert_eq!(params.unique_tag, "0x1fa");
        assert_eq!(params.asset_type, AssetType::new("APT"));
    }
}
