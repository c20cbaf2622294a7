//! Node configuration, read from the environment.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use moneypot_core::{AccountId, AssetType, MarketConfig};
use moneypot_state::{InMemoryCustodian, Market, SystemClock};
use serde::Deserialize;
use tracing::info;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Settings for one node process.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the API server binds to.
    pub addr: SocketAddr,

    /// Identities for the hosted market.
    pub market: MarketConfig,

    /// Optional file of balances credited at start-up.
    pub genesis: Option<PathBuf>,
}

impl NodeConfig {
    /// Read `MONEYPOT_*` variables from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr = var("MONEYPOT_ADDR", DEFAULT_ADDR);
        let addr = addr
            .parse()
            .with_context(|| format!("invalid MONEYPOT_ADDR {addr:?}"))?;

        let market = MarketConfig::new(
            var("MONEYPOT_ORACLE", "oracle"),
            var("MONEYPOT_PLATFORM", "platform"),
            var("MONEYPOT_CUSTODY", "custody"),
        );
        market.validate()?;

        Ok(Self {
            addr,
            market,
            genesis: lookup("MONEYPOT_GENESIS").map(PathBuf::from),
        })
    }

    /// Build the market this node serves, seeding custody from the genesis
    /// file if one is configured.
    pub fn build_market(&self) -> anyhow::Result<Market> {
        let custodian = match &self.genesis {
            Some(path) => Genesis::load(path)?.custodian()?,
            None => InMemoryCustodian::new(),
        };
        Ok(Market::new(
            self.market.clone(),
            custodian,
            Arc::new(SystemClock),
        )?)
    }
}

/// Balances that exist before the market starts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisBalance {
    pub account: AccountId,
    pub asset: AssetType,
    pub amount: u64,
}

impl Genesis {
    /// Read a genesis file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading genesis file {}", path.display()))?;
        let genesis: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing genesis file {}", path.display()))?;
        info!(path = %path.display(), balances = genesis.balances.len(), "loaded genesis");
        Ok(genesis)
    }

    /// Custodian holding these balances.
    pub fn custodian(&self) -> moneypot_core::Result<InMemoryCustodian> {
        let mut custodian = InMemoryCustodian::new();
        for entry in &self.balances {
            custodian.credit(&entry.account, &entry.asset, entry.amount)?;
        }
        Ok(custodian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneypot_state::Custodian;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.market, MarketConfig::new("oracle", "platform", "custody"));
        assert!(config.genesis.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("MONEYPOT_ADDR", "127.0.0.1:8080"),
            ("MONEYPOT_ORACLE", "judge"),
            ("MONEYPOT_GENESIS", "/tmp/genesis.json"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.market.oracle, AccountId::new("judge"));
        assert_eq!(config.genesis, Some(PathBuf::from("/tmp/genesis.json")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(NodeConfig::from_lookup(lookup(&[("MONEYPOT_ADDR", "nowhere")])).is_err());
        assert!(NodeConfig::from_lookup(lookup(&[("MONEYPOT_CUSTODY", "oracle")])).is_err());
    }

    #[test]
    fn test_genesis_custodian() {
        let genesis: Genesis = serde_json::from_str(
            r#"{"balances": [
                {"account": "alice", "asset": "APT", "amount": 500},
                {"account": "alice", "asset": "APT", "amount": 250},
                {"account": "bob", "asset": "USDC", "amount": 7}
            ]}"#,
        )
        .unwrap();

        let custodian = genesis.custodian().unwrap();
        assert_eq!(
            custodian.balance_of(&AccountId::new("alice"), &AssetType::new("APT")),
            750
        );
        assert_eq!(
            custodian.balance_of(&AccountId::new("bob"), &AssetType::new("USDC")),
            7
        );
    }

    #[test]
    fn test_missing_genesis_file() {
        let config = NodeConfig {
            genesis: Some(PathBuf::from("/nonexistent/moneypot-genesis.json")),
            ..NodeConfig::from_lookup(lookup(&[])).unwrap()
        };
        assert!(config.build_market().is_err());
    }
}
