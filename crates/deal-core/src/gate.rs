//! # Transfer Gate — the Compliance Seam
//!
//! Defines the trait through which the position ledger asks a compliance
//! engine whether a transfer may proceed. The ledger never depends on a
//! concrete engine; it holds an `Option<Arc<dyn TransferGate>>` that can
//! be absent (unrestricted bootstrap state) or replaced across upgrade
//! versions.
//!
//! ## Contract
//!
//! `check()` is read-only and **never fails**: an unresolvable account,
//! an unknown deal, or any other evaluation problem yields `Deny` with a
//! structured reason, not an error. Denials surface to callers as a
//! ledger-level abort; technical failures do not exist on this path.

use serde::{Deserialize, Serialize};

use crate::identity::{Address, DealId};
use crate::temporal::Timestamp;

/// Why a transfer was denied.
///
/// Reasons are part of the caller-facing surface: a compliance denial
/// tells the caller to fix the recipient's standing or wait out a holding
/// period, which is different remediation from an authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// The recipient's KYC status is not Valid (including addresses with
    /// no account record at all).
    KycNotValid,
    /// The deal has no registered issuance record.
    UnknownDeal,
    /// The asset is younger than the recipient's required holding period.
    HoldingPeriodNotMet {
        /// Months the recipient must wait from issuance.
        required_months: u64,
        /// Whole months elapsed since issuance at evaluation time.
        age_months: u64,
    },
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KycNotValid => f.write_str("recipient KYC is not valid"),
            Self::UnknownDeal => f.write_str("deal has no issuance record"),
            Self::HoldingPeriodNotMet {
                required_months,
                age_months,
            } => write!(
                f,
                "holding period not met: asset is {age_months} months old, {required_months} required"
            ),
        }
    }
}

/// The outcome of a transfer-compliance evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDecision {
    /// The transfer may proceed.
    Allow,
    /// The transfer is blocked, with the business reason.
    Deny(DenialReason),
}

impl TransferDecision {
    /// Whether the decision permits the transfer.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// A pluggable transfer-compliance decision function.
///
/// Implementations are read-only over their backing stores and safe to
/// invoke any number of times per evaluation — there are no mutation
/// side effects and no caching of age computations.
pub trait TransferGate: Send + Sync {
    /// Decide whether `amount`-agnostic movement of a `deal_id` position
    /// from `from` to `to` is permitted at time `at`.
    fn check(
        &self,
        from: &Address,
        to: &Address,
        deal_id: &DealId,
        at: Timestamp,
    ) -> TransferDecision;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_is_allowed() {
        assert!(TransferDecision::Allow.is_allowed());
        assert!(!TransferDecision::Deny(DenialReason::KycNotValid).is_allowed());
    }

    #[test]
    fn test_denial_reason_messages() {
        assert_eq!(
            DenialReason::KycNotValid.to_string(),
            "recipient KYC is not valid"
        );
        assert_eq!(
            DenialReason::HoldingPeriodNotMet {
                required_months: 6,
                age_months: 2
            }
            .to_string(),
            "holding period not met: asset is 2 months old, 6 required"
        );
    }

    #[test]
    fn test_decision_serde_roundtrip() {
        let d = TransferDecision::Deny(DenialReason::HoldingPeriodNotMet {
            required_months: 12,
            age_months: 8,
        });
        let json = serde_json::to_string(&d).unwrap();
        let parsed: TransferDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }
}
