//! # Account Registry — Investor Compliance Records
//!
//! Maps investor ledger addresses to compliance records: jurisdiction
//! (country code), accreditation status, and KYC status. Records are
//! created and mutated only by admins, under a capability-scoped
//! ownership model:
//!
//! - The **master admin** (set at construction) may act on any account
//!   and is the only identity that can appoint further admins.
//! - An **admin** may create accounts; each record carries the creating
//!   admin as its `owner_admin`, and only that admin (or the master) may
//!   mutate the record or its address links afterward.
//!
//! A non-owning admin is rejected with [`RegistryError::NotAccountAdmin`]
//! — deliberately distinct from [`RegistryError::NotAdmin`], because
//! "not your account" and "not an admin at all" call for different
//! remediation.
//!
//! ## Invariants
//!
//! - Every linked address maps to exactly one account id.
//! - An address with no record resolves to nothing; the compliance
//!   engine treats it as Unknown/Unknown.
//! - Every operation validates fully before mutating — a failed call
//!   leaves the registry and its event log untouched.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deal_core::{AccountId, Address};

// ─── Status Enums ────────────────────────────────────────────────────

/// Investor accreditation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditationStatus {
    /// No accreditation information on record.
    Unknown,
    /// Investor is known to not be accredited.
    NotAccredited,
    /// Investor has self-attested accreditation.
    SelfAccredited,
    /// Accreditation has been independently verified.
    VerifiedAccredited,
}

impl std::fmt::Display for AccreditationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::NotAccredited => "NOT_ACCREDITED",
            Self::SelfAccredited => "SELF_ACCREDITED",
            Self::VerifiedAccredited => "VERIFIED_ACCREDITED",
        };
        f.write_str(s)
    }
}

/// Investor KYC status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// No KYC information on record.
    Unknown,
    /// KYC is current and valid.
    Valid,
    /// KYC was valid but has lapsed.
    Lapsed,
    /// KYC was reviewed and rejected.
    Rejected,
}

impl KycStatus {
    /// Whether this status permits receiving transfers. Only `Valid`
    /// does — `Unknown` is treated as strictly as `Lapsed`/`Rejected`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::Valid => "VALID",
            Self::Lapsed => "LAPSED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Records and Events ──────────────────────────────────────────────

/// An investor compliance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Sequentially assigned account identifier.
    pub id: AccountId,
    /// ISO-style country code (e.g. "US", "CA").
    pub country_code: String,
    /// Accreditation status.
    pub accreditation: AccreditationStatus,
    /// KYC status.
    pub kyc: KycStatus,
    /// The admin that created this record and owns mutation rights.
    pub owner_admin: Address,
    /// Ledger addresses linked to this account.
    pub addresses: BTreeSet<Address>,
}

/// Registry events, in emission order, for off-chain indexers.
///
/// On-chain-style callers never consume these; they exist so an indexer
/// replaying the log can reconstruct the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A new account record was created.
    AccountAdded {
        /// Assigned account id.
        account_id: AccountId,
        /// Country code at creation.
        country_code: String,
        /// Accreditation at creation.
        accreditation: AccreditationStatus,
        /// KYC at creation.
        kyc: KycStatus,
        /// Initial linked addresses.
        addresses: Vec<Address>,
    },
    /// An account's compliance fields were updated.
    AccountUpdated {
        /// The updated account.
        account_id: AccountId,
        /// New country code.
        country_code: String,
        /// New accreditation status.
        accreditation: AccreditationStatus,
        /// New KYC status.
        kyc: KycStatus,
    },
    /// An address was linked to an account.
    AddressAdded {
        /// The account the address now belongs to.
        account_id: AccountId,
        /// The linked address.
        address: Address,
    },
    /// An address link was removed.
    AddressRemoved {
        /// The account the address belonged to.
        account_id: AccountId,
        /// The unlinked address.
        address: Address,
    },
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from account-registry operations.
#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    /// The caller holds no admin role at all.
    #[error("{caller} is not an admin")]
    NotAdmin {
        /// The rejected caller.
        caller: Address,
    },

    /// The caller is an admin, but not the admin that owns this account.
    #[error("{caller} is not the admin for {account_id}")]
    NotAccountAdmin {
        /// The rejected caller.
        caller: Address,
        /// The account the caller tried to mutate.
        account_id: AccountId,
    },

    /// Only the master admin may appoint admins.
    #[error("{caller} is not the master admin")]
    NotMasterAdmin {
        /// The rejected caller.
        caller: Address,
    },

    /// No account exists with this id.
    #[error("no account with id {account_id}")]
    UnknownAccount {
        /// The missing account id.
        account_id: AccountId,
    },

    /// The address is not linked to any account.
    #[error("address {address} is not linked to any account")]
    UnknownAddress {
        /// The unlinked address.
        address: Address,
    },

    /// The address is already linked to an account.
    #[error("address {address} is already linked to {account_id}")]
    AddressAlreadyLinked {
        /// The conflicting address.
        address: Address,
        /// The account it is linked to.
        account_id: AccountId,
    },

    /// `add_addresses` received mismatched slice lengths.
    #[error("pairwise address/account arguments differ in length: {addresses} vs {accounts}")]
    LengthMismatch {
        /// Number of addresses supplied.
        addresses: usize,
        /// Number of account ids supplied.
        accounts: usize,
    },
}

// ─── Registry ────────────────────────────────────────────────────────

/// The investor account registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRegistry {
    master_admin: Address,
    admins: BTreeSet<Address>,
    accounts: Vec<AccountRecord>,
    address_index: HashMap<Address, AccountId>,
    events: Vec<RegistryEvent>,
}

impl AccountRegistry {
    /// Create a registry with the given master admin. The master admin
    /// holds the admin role implicitly.
    pub fn new(master_admin: Address) -> Self {
        Self {
            master_admin,
            admins: BTreeSet::new(),
            accounts: Vec::new(),
            address_index: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Whether `who` holds the admin role (master admin included).
    pub fn is_admin(&self, who: &Address) -> bool {
        *who == self.master_admin || self.admins.contains(who)
    }

    /// The master admin address.
    pub fn master_admin(&self) -> &Address {
        &self.master_admin
    }

    /// Appoint a new admin. Master admin only.
    pub fn add_admin(&mut self, caller: &Address, admin: Address) -> Result<(), RegistryError> {
        if *caller != self.master_admin {
            return Err(RegistryError::NotMasterAdmin {
                caller: caller.clone(),
            });
        }
        self.admins.insert(admin);
        Ok(())
    }

    /// Create an account record with its initial linked addresses.
    ///
    /// Ids are assigned sequentially starting from 0. The caller becomes
    /// the record's owning admin. Emits [`RegistryEvent::AccountAdded`].
    pub fn add_account(
        &mut self,
        caller: &Address,
        country_code: impl Into<String>,
        accreditation: AccreditationStatus,
        kyc: KycStatus,
        addresses: Vec<Address>,
    ) -> Result<AccountId, RegistryError> {
        self.require_admin(caller)?;
        self.require_unlinked(&addresses)?;

        let id = AccountId(self.accounts.len() as u64);
        let country_code = country_code.into();
        for address in &addresses {
            self.address_index.insert(address.clone(), id);
        }
        self.accounts.push(AccountRecord {
            id,
            country_code: country_code.clone(),
            accreditation,
            kyc,
            owner_admin: caller.clone(),
            addresses: addresses.iter().cloned().collect(),
        });
        self.events.push(RegistryEvent::AccountAdded {
            account_id: id,
            country_code,
            accreditation,
            kyc,
            addresses,
        });
        tracing::debug!(account_id = %id, admin = %caller, "account added");
        Ok(id)
    }

    /// Update an account's compliance fields.
    ///
    /// Only the owning admin or the master admin may update. Emits
    /// [`RegistryEvent::AccountUpdated`].
    pub fn update_account(
        &mut self,
        caller: &Address,
        account_id: AccountId,
        country_code: impl Into<String>,
        accreditation: AccreditationStatus,
        kyc: KycStatus,
    ) -> Result<(), RegistryError> {
        self.require_account_admin(caller, account_id)?;
        let country_code = country_code.into();

        // Index is valid: require_account_admin resolved the record.
        let record = &mut self.accounts[account_id.0 as usize];
        record.country_code = country_code.clone();
        record.accreditation = accreditation;
        record.kyc = kyc;

        self.events.push(RegistryEvent::AccountUpdated {
            account_id,
            country_code,
            accreditation,
            kyc,
        });
        Ok(())
    }

    /// Link addresses to accounts, pairwise.
    ///
    /// `addresses[i]` is linked to `account_ids[i]`. The caller must own
    /// every target account (or be the master admin). Validates the whole
    /// batch before linking anything. Emits one
    /// [`RegistryEvent::AddressAdded`] per link.
    pub fn add_addresses(
        &mut self,
        caller: &Address,
        addresses: Vec<Address>,
        account_ids: Vec<AccountId>,
    ) -> Result<(), RegistryError> {
        if addresses.len() != account_ids.len() {
            return Err(RegistryError::LengthMismatch {
                addresses: addresses.len(),
                accounts: account_ids.len(),
            });
        }
        for account_id in &account_ids {
            self.require_account_admin(caller, *account_id)?;
        }
        self.require_unlinked(&addresses)?;

        for (address, account_id) in addresses.into_iter().zip(account_ids) {
            self.address_index.insert(address.clone(), account_id);
            self.accounts[account_id.0 as usize]
                .addresses
                .insert(address.clone());
            self.events
                .push(RegistryEvent::AddressAdded { account_id, address });
        }
        Ok(())
    }

    /// Remove an address-to-account link.
    ///
    /// Only the admin owning the linked account (or the master admin)
    /// may remove. Emits [`RegistryEvent::AddressRemoved`].
    pub fn remove_address(
        &mut self,
        caller: &Address,
        address: &Address,
    ) -> Result<(), RegistryError> {
        let account_id =
            *self
                .address_index
                .get(address)
                .ok_or_else(|| RegistryError::UnknownAddress {
                    address: address.clone(),
                })?;
        self.require_account_admin(caller, account_id)?;

        self.address_index.remove(address);
        self.accounts[account_id.0 as usize].addresses.remove(address);
        self.events.push(RegistryEvent::AddressRemoved {
            account_id,
            address: address.clone(),
        });
        Ok(())
    }

    /// Resolve the account record linked to an address, if any.
    pub fn account_of(&self, address: &Address) -> Option<&AccountRecord> {
        let id = self.address_index.get(address)?;
        self.accounts.get(id.0 as usize)
    }

    /// Look up an account record by id.
    pub fn account(&self, account_id: AccountId) -> Option<&AccountRecord> {
        self.accounts.get(account_id.0 as usize)
    }

    /// The ordered event log.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    fn require_admin(&self, caller: &Address) -> Result<(), RegistryError> {
        if !self.is_admin(caller) {
            return Err(RegistryError::NotAdmin {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Admin check scoped to one account: owner admin or master admin.
    fn require_account_admin(
        &self,
        caller: &Address,
        account_id: AccountId,
    ) -> Result<(), RegistryError> {
        self.require_admin(caller)?;
        let record = self
            .accounts
            .get(account_id.0 as usize)
            .ok_or(RegistryError::UnknownAccount { account_id })?;
        if *caller != record.owner_admin && *caller != self.master_admin {
            return Err(RegistryError::NotAccountAdmin {
                caller: caller.clone(),
                account_id,
            });
        }
        Ok(())
    }

    /// Reject the batch if any address is already linked, or appears
    /// twice within the batch itself.
    fn require_unlinked(&self, addresses: &[Address]) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for address in addresses {
            if let Some(id) = self.address_index.get(address) {
                return Err(RegistryError::AddressAlreadyLinked {
                    address: address.clone(),
                    account_id: *id,
                });
            }
            if !seen.insert(address) {
                return Err(RegistryError::AddressAlreadyLinked {
                    address: address.clone(),
                    // Duplicate within the batch: report the id it would
                    // have been linked to first, which is the next id.
                    account_id: AccountId(self.accounts.len() as u64),
                });
            }
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn registry() -> AccountRegistry {
        AccountRegistry::new(addr("master"))
    }

    // ── Admin role tests ─────────────────────────────────────────────

    #[test]
    fn test_master_admin_adds_account() {
        let mut reg = registry();
        let id = reg
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        assert_eq!(id, AccountId(0));

        let record = reg.account_of(&addr("alice")).unwrap();
        assert_eq!(record.country_code, "US");
        assert_eq!(record.accreditation, AccreditationStatus::SelfAccredited);
        assert_eq!(record.kyc, KycStatus::Valid);
    }

    #[test]
    fn test_appointed_admin_adds_account() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        let id = reg
            .add_account(
                &addr("bob"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        assert_eq!(id, AccountId(0));
        assert_eq!(reg.account(id).unwrap().owner_admin, addr("bob"));
    }

    #[test]
    fn test_non_admin_cannot_add_account() {
        let mut reg = registry();
        let err = reg
            .add_account(
                &addr("bob"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::NotAdmin { caller: addr("bob") });
        assert!(reg.account_of(&addr("alice")).is_none());
        assert!(reg.events().is_empty());
    }

    #[test]
    fn test_only_master_appoints_admins() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        let err = reg.add_admin(&addr("bob"), addr("carol")).unwrap_err();
        assert_eq!(err, RegistryError::NotMasterAdmin { caller: addr("bob") });
    }

    // ── Ownership tests ──────────────────────────────────────────────

    #[test]
    fn test_owning_admin_updates_account() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        let id = reg
            .add_account(
                &addr("bob"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();

        reg.update_account(
            &addr("bob"),
            id,
            "EU",
            AccreditationStatus::SelfAccredited,
            KycStatus::Valid,
        )
        .unwrap();
        assert_eq!(reg.account(id).unwrap().country_code, "EU");

        // bob can also manage the account's addresses
        reg.add_addresses(&addr("bob"), vec![addr("charlie")], vec![id])
            .unwrap();
        reg.remove_address(&addr("bob"), &addr("charlie")).unwrap();
    }

    #[test]
    fn test_non_owning_admin_rejected_with_account_scoped_error() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        // master creates the account; bob does not own it
        let id = reg
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();

        let err = reg
            .update_account(
                &addr("bob"),
                id,
                "EU",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotAccountAdmin {
                caller: addr("bob"),
                account_id: id,
            }
        );
        // never a silent no-op
        assert_eq!(reg.account(id).unwrap().country_code, "US");

        let err = reg
            .add_addresses(&addr("bob"), vec![addr("charlie")], vec![id])
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotAccountAdmin { .. }));

        let err = reg.remove_address(&addr("bob"), &addr("alice")).unwrap_err();
        assert!(matches!(err, RegistryError::NotAccountAdmin { .. }));
    }

    #[test]
    fn test_master_admin_acts_on_any_account() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        let id = reg
            .add_account(
                &addr("bob"),
                "CA",
                AccreditationStatus::VerifiedAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();

        reg.update_account(
            &addr("master"),
            id,
            "CA",
            AccreditationStatus::VerifiedAccredited,
            KycStatus::Lapsed,
        )
        .unwrap();
        assert_eq!(reg.account(id).unwrap().kyc, KycStatus::Lapsed);
    }

    // ── Address linking tests ────────────────────────────────────────

    #[test]
    fn test_address_maps_to_exactly_one_account() {
        let mut reg = registry();
        reg.add_account(
            &addr("master"),
            "US",
            AccreditationStatus::SelfAccredited,
            KycStatus::Valid,
            vec![addr("alice")],
        )
        .unwrap();
        let err = reg
            .add_account(
                &addr("master"),
                "CA",
                AccreditationStatus::Unknown,
                KycStatus::Unknown,
                vec![addr("alice")],
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::AddressAlreadyLinked { .. }));
    }

    #[test]
    fn test_add_addresses_length_mismatch() {
        let mut reg = registry();
        let id = reg
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        let err = reg
            .add_addresses(&addr("master"), vec![addr("b"), addr("c")], vec![id])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::LengthMismatch {
                addresses: 2,
                accounts: 1,
            }
        );
    }

    #[test]
    fn test_remove_then_relink_address() {
        let mut reg = registry();
        let id = reg
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        reg.remove_address(&addr("master"), &addr("alice")).unwrap();
        assert!(reg.account_of(&addr("alice")).is_none());

        // the address is free to link again
        reg.add_addresses(&addr("master"), vec![addr("alice")], vec![id])
            .unwrap();
        assert_eq!(reg.account_of(&addr("alice")).unwrap().id, id);
    }

    #[test]
    fn test_remove_unknown_address() {
        let mut reg = registry();
        let err = reg
            .remove_address(&addr("master"), &addr("nobody"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownAddress {
                address: addr("nobody"),
            }
        );
    }

    // ── Event log tests ──────────────────────────────────────────────

    #[test]
    fn test_event_log_order() {
        let mut reg = registry();
        let id = reg
            .add_account(
                &addr("master"),
                "US",
                AccreditationStatus::SelfAccredited,
                KycStatus::Valid,
                vec![addr("alice")],
            )
            .unwrap();
        reg.add_addresses(&addr("master"), vec![addr("bob")], vec![id])
            .unwrap();
        reg.remove_address(&addr("master"), &addr("bob")).unwrap();

        assert_eq!(reg.events().len(), 3);
        assert!(matches!(reg.events()[0], RegistryEvent::AccountAdded { .. }));
        assert_eq!(
            reg.events()[1],
            RegistryEvent::AddressAdded {
                account_id: id,
                address: addr("bob"),
            }
        );
        assert_eq!(
            reg.events()[2],
            RegistryEvent::AddressRemoved {
                account_id: id,
                address: addr("bob"),
            }
        );
    }

    #[test]
    fn test_sequential_ids() {
        let mut reg = registry();
        for (i, a) in ["a1", "a2", "a3"].iter().enumerate() {
            let id = reg
                .add_account(
                    &addr("master"),
                    "CA",
                    AccreditationStatus::Unknown,
                    KycStatus::Valid,
                    vec![addr(a)],
                )
                .unwrap();
            assert_eq!(id, AccountId(i as u64));
        }
    }

    // ── Serialization tests ──────────────────────────────────────────

    #[test]
    fn test_registry_serde_roundtrip() {
        let mut reg = registry();
        reg.add_admin(&addr("master"), addr("bob")).unwrap();
        reg.add_account(
            &addr("bob"),
            "US",
            AccreditationStatus::VerifiedAccredited,
            KycStatus::Valid,
            vec![addr("alice")],
        )
        .unwrap();

        let json = serde_json::to_string(&reg).unwrap();
        let parsed: AccountRegistry = serde_json::from_str(&json).unwrap();
        let record = parsed.account_of(&addr("alice")).unwrap();
        assert_eq!(record.country_code, "US");
        assert_eq!(record.owner_admin, addr("bob"));
        assert_eq!(parsed.events().len(), reg.events().len());
    }
}
