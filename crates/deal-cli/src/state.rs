//! # CLI State File
//!
//! The registries persisted as a single JSON document. The state file is
//! the CLI's stand-in for on-chain storage: every mutating subcommand
//! loads it, applies one operation, and writes it back whole.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use deal_core::Address;
use deal_registry::{AccountRegistry, DealRegistry};

/// The persisted registries.
#[derive(Debug, Serialize, Deserialize)]
pub struct StackState {
    /// Investor compliance records.
    pub accounts: AccountRegistry,
    /// Deal issuance records.
    pub deals: DealRegistry,
}

impl StackState {
    /// Fresh state with `master` as master admin of both registries.
    pub fn init(master: Address) -> Self {
        Self {
            accounts: AccountRegistry::new(master.clone()),
            deals: DealRegistry::new(master),
        }
    }

    /// Load state from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing state file {}", path.display()))
    }

    /// Load state, or initialize it with `master` if the file is absent.
    pub fn load_or_init(path: &Path, master: &Address) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::init(master.clone()))
        }
    }

    /// Write state back to a JSON file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing state")?;
        fs::write(path, json)
            .with_context(|| format!("writing state file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deal_registry::{AccreditationStatus, KycStatus};

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn test_state_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.json");

        let mut state = StackState::init(addr("master"));
        state
            .accounts
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::VerifiedAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        state.save(&path).unwrap();

        let loaded = StackState::load(&path).unwrap();
        assert_eq!(
            loaded.accounts.account_of(&addr("alice")).unwrap().country_code,
            "US"
        );
    }

    #[test]
    fn test_load_or_init_creates_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let state = StackState::load_or_init(&path, &addr("master")).unwrap();
        assert_eq!(state.accounts.master_admin(), &addr("master"));
    }
}
