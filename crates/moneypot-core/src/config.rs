//! Fixed constants and market configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::types::AccountId;

/// Seconds an attempt stays open for an oracle report.
pub const ATTEMPT_WINDOW_SECS: u64 = 300;

/// Modulus applied to the attempt count when deriving difficulty.
pub const DIFFICULTY_MODULUS: u64 = 11;

/// Percentage of a solved pot paid to the winning hunter.
/// The remainder goes to the platform.
pub const HUNTER_PAYOUT_PERCENT: u64 = 40;

/// Identities configured once when a market is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// The single trusted identity allowed to report attempt outcomes.
    pub oracle: AccountId,

    /// Account receiving the platform share of solved pots.
    pub platform: AccountId,

    /// Account holding escrowed value.
    pub custody: AccountId,
}

impl MarketConfig {
    /// Create a new config.
    pub fn new(
        oracle: impl Into<AccountId>,
        platform: impl Into<AccountId>,
        custody: impl Into<AccountId>,
    ) -> Self {
        Self {
            oracle: oracle.into(),
            platform: platform.into(),
            custody: custody.into(),
        }
    }

    /// Check that the custody account is distinct from the other roles.
    pub fn validate(&self) -> Result<()> {
        if self.custody == self.oracle || self.custody == self.platform {
            return Err(MarketError::InvalidConfig(format!(
                "custody account {} must differ from oracle and platform",
                self.custody
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = MarketConfig::new("oracle", "platform", "custody");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custody_must_be_distinct() {
        let config = MarketConfig::new("oracle", "platform", "platform");
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oracle_may_double_as_platform() {
        let config = MarketConfig::new("ops", "ops", "custody");
        assert!(config.validate().is_ok());
    }
}
