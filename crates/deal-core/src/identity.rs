//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifier namespaces of the deal stack.
//! These prevent accidental identifier confusion — you cannot pass an
//! `AccountId` where a `DealId` is expected, and a ledger address is
//! never interchangeable with either.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A ledger address: the identity under which balances and positions are
/// held and under which callers authenticate to the registries.
///
/// Addresses are opaque non-empty strings. The stack never interprets
/// their content — equality is the only operation that matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create an address from a non-empty string.
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "address must be non-empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    /// The string form of the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an investor account record.
///
/// Account ids are assigned sequentially by the account registry,
/// starting from 0, and are never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AccountId(pub u64);

impl AccountId {
    /// The numeric id.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// Unique identifier for a deal (an issued investment instrument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(pub Uuid);

impl DealId {
    /// Generate a new random deal identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DealId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deal:{}", self.0)
    }
}
