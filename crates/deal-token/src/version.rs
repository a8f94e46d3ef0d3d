//! # Schema Version Gates
//!
//! The deployed system evolved through five schema versions. Rather than
//! an upgrade-proxy inheritance chain, each version is a number with an
//! explicit capability table, and upgrades move strictly forward:
//!
//! - **V0** — bare position ledger, no compliance, fixed 18-decimal
//!   payment scaling.
//! - **V1/V2** — metadata and storage migrations (no capability change
//!   visible at this layer).
//! - **V3** — the compliance gate becomes configurable.
//! - **V4** — per-deal payment decimals.
//!
//! Forward jumps are allowed (a fresh instance may load straight at V3
//! or V4); downgrades and same-version "upgrades" are structured errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A schema version of the position ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum SchemaVersion {
    /// Initial deployment.
    V0 = 0,
    /// Metadata migration.
    V1 = 1,
    /// Storage migration.
    V2 = 2,
    /// Compliance gate configurable.
    V3 = 3,
    /// Per-deal payment decimals.
    V4 = 4,
}

/// Errors from version transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// The target version does not move forward.
    #[error("upgrade must move forward: {from} -> {to}")]
    NotForward {
        /// Current version.
        from: SchemaVersion,
        /// Attempted target.
        to: SchemaVersion,
    },

    /// The requested capability is not available at this version.
    #[error("{capability} requires {required} or later (current: {current})")]
    CapabilityUnavailable {
        /// Human name of the capability.
        capability: &'static str,
        /// Minimum version providing it.
        required: SchemaVersion,
        /// Version in force.
        current: SchemaVersion,
    },
}

impl SchemaVersion {
    /// The numeric version.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Whether a compliance gate may be configured at this version.
    pub fn supports_compliance_gate(&self) -> bool {
        *self >= Self::V3
    }

    /// Whether deals may use payment decimals other than 18.
    pub fn supports_payment_decimals(&self) -> bool {
        *self >= Self::V4
    }

    /// Validate a forward-only upgrade from `self` to `to`.
    pub fn validate_upgrade(&self, to: SchemaVersion) -> Result<(), VersionError> {
        if to <= *self {
            return Err(VersionError::NotForward { from: *self, to });
        }
        Ok(())
    }

    /// Require the compliance-gate capability.
    pub fn require_compliance_gate(&self) -> Result<(), VersionError> {
        if !self.supports_compliance_gate() {
            return Err(VersionError::CapabilityUnavailable {
                capability: "compliance gate",
                required: Self::V3,
                current: *self,
            });
        }
        Ok(())
    }

    /// Require the per-deal-decimals capability.
    pub fn require_payment_decimals(&self) -> Result<(), VersionError> {
        if !self.supports_payment_decimals() {
            return Err(VersionError::CapabilityUnavailable {
                capability: "per-deal payment decimals",
                required: Self::V4,
                current: *self,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.number())
    }
}
