//! Role checks for mutating operations.
//!
//! All identity comparison happens here. The oracle is a single configured
//! identity; there is no threshold or multi-party reporting. The custody
//! account only ever holds escrow and never takes part in a pot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::pot::Pot;
use crate::types::AccountId;

/// A role a caller may hold relative to a pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The configured outcome reporter.
    Oracle,
    /// The account that funded the pot.
    Creator,
    /// Anyone other than the creator.
    Hunter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Oracle => "oracle",
            Role::Creator => "creator",
            Role::Hunter => "hunter",
        };
        f.write_str(name)
    }
}

/// Resolves caller identities against roles.
#[derive(Debug, Clone)]
pub struct AccessControl {
    oracle: AccountId,
    custody: AccountId,
}

impl AccessControl {
    /// Create access control for the given oracle and custody identities.
    pub fn new(oracle: AccountId, custody: AccountId) -> Self {
        Self { oracle, custody }
    }

    /// The configured oracle.
    pub fn oracle(&self) -> &AccountId {
        &self.oracle
    }

    /// Whether `caller` holds `role`. Pot-relative roles need the pot.
    pub fn holds(&self, caller: &AccountId, role: Role, pot: Option<&Pot>) -> bool {
        match role {
            Role::Oracle => *caller == self.oracle,
            Role::Creator => pot.is_some_and(|p| *caller == p.creator),
            Role::Hunter => pot.is_some_and(|p| *caller != p.creator && *caller != self.custody),
        }
    }

    /// Require the oracle role.
    pub fn require_oracle(&self, caller: &AccountId) -> Result<()> {
        if self.holds(caller, Role::Oracle, None) {
            Ok(())
        } else {
            Err(MarketError::Unauthorized {
                caller: caller.clone(),
                required: Role::Oracle,
            })
        }
    }

    /// Require the creator role on `pot`.
    pub fn require_creator(&self, caller: &AccountId, pot: &Pot) -> Result<()> {
        if self.holds(caller, Role::Creator, Some(pot)) {
            Ok(())
        } else {
            Err(MarketError::Unauthorized {
                caller: caller.clone(),
                required: Role::Creator,
            })
        }
    }

    /// Require the hunter role on `pot`. The creator gets its own error.
    pub fn require_hunter(&self, caller: &AccountId, pot: &Pot) -> Result<()> {
        if *caller == pot.creator {
            return Err(MarketError::CreatorCannotAttempt { pot_id: pot.id });
        }
        self.require_participant(caller, Role::Hunter)
    }

    /// Reject the custody account acting as `role`. Its transfers into
    /// custody would be self-transfers that move nothing.
    pub fn require_participant(&self, caller: &AccountId, role: Role) -> Result<()> {
        if *caller == self.custody {
            return Err(MarketError::Unauthorized {
                caller: caller.clone(),
                required: role,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetType;

    fn pot_by(creator: &str) -> Pot {
        Pot {
            id: 4,
            creator: AccountId::new(creator),
            total_value: 10,
            fee: 1,
            created_at: 0,
            expires_at: 100,
            is_active: true,
            attempts_count: 0,
            unique_tag: "tag".to_string(),
            asset_type: AssetType::new("APT"),
        }
    }

    fn access() -> AccessControl {
        AccessControl::new(AccountId::new("oracle"), AccountId::new("custody"))
    }

    #[test]
    fn test_oracle_check() {
        let access = access();
        assert!(access.require_oracle(&AccountId::new("oracle")).is_ok());

        let err = access.require_oracle(&AccountId::new("eve")).unwrap_err();
        assert_eq!(
            err,
            MarketError::Unauthorized {
                caller: AccountId::new("eve"),
                required: Role::Oracle,
            }
        );
    }

    #[test]
    fn test_creator_and_hunter_are_exclusive() {
        let access = access();
        let pot = pot_by("alice");
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        assert!(access.require_creator(&alice, &pot).is_ok());
        assert!(access.require_creator(&bob, &pot).is_err());
        assert!(access.require_hunter(&bob, &pot).is_ok());
        assert_eq!(
            access.require_hunter(&alice, &pot),
            Err(MarketError::CreatorCannotAttempt { pot_id: 4 })
        );
    }

    #[test]
    fn test_pot_roles_need_a_pot() {
        let access = access();
        assert!(!access.holds(&AccountId::new("alice"), Role::Creator, None));
        assert!(!access.holds(&AccountId::new("alice"), Role::Hunter, None));
    }

    #[test]
    fn test_oracle_can_also_create() {
        let access = access();
        let pot = pot_by("oracle");
        let oracle = AccountId::new("oracle");
        assert!(access.holds(&oracle, Role::Oracle, Some(&pot)));
        assert!(access.holds(&oracle, Role::Creator, Some(&pot)));
    }

    #[test]
    fn test_custody_cannot_participate() {
        let access = access();
        let custody = AccountId::new("custody");
        let pot = pot_by("alice");

        assert!(!access.holds(&custody, Role::Hunter, Some(&pot)));
        assert_eq!(
            access.require_hunter(&custody, &pot),
            Err(MarketError::Unauthorized {
                caller: custody.clone(),
                required: Role::Hunter,
            })
        );
        assert_eq!(
            access.require_participant(&custody, Role::Creator),
            Err(MarketError::Unauthorized {
                caller: custody,
                required: Role::Creator,
            })
        );
        assert!(access
            .require_participant(&AccountId::new("oracle"), Role::Hunter)
            .is_ok());
    }
}
