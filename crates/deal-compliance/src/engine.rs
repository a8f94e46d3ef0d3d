//! # Compliance Engine
//!
//! The transfer decision function. Evaluation order, first match wins:
//!
//! 1. Recipient KYC must be `Valid`. An address with no account record
//!    resolves to Unknown/Unknown and is denied here — the strictest
//!    reading of an unresolved recipient.
//! 2. The deal must have an issuance record.
//! 3. Restricted-country (US) recipients wait out a holding period from
//!    issuance: 6 policy months if verified-accredited, 12 otherwise.
//!    The boundary is inclusive on the allow side — at exactly 6 (or 12)
//!    months the transfer is allowed.
//! 4. Everyone else: allowed regardless of age.
//!
//! The sender's standing is not consulted; the rule restricts who may
//! *receive* a position. Mint and burn paths never reach this engine —
//! that bypass belongs to the position ledger, not the gate.

use std::sync::Arc;

use parking_lot::RwLock;

use deal_core::{Address, DealId, DenialReason, Timestamp, TransferDecision, TransferGate};
use deal_registry::{AccountRegistry, AccreditationStatus, DealRegistry, KycStatus};

use crate::policy::HoldingPolicy;

/// The transfer-compliance decision engine.
///
/// Holds shared read views of the two registries. All locks taken are
/// read locks; the engine never mutates registry state.
pub struct ComplianceEngine {
    accounts: Arc<RwLock<AccountRegistry>>,
    deals: Arc<RwLock<DealRegistry>>,
    policy: HoldingPolicy,
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ComplianceEngine {
    /// Create an engine over the given registries with the default policy.
    pub fn new(accounts: Arc<RwLock<AccountRegistry>>, deals: Arc<RwLock<DealRegistry>>) -> Self {
        Self::with_policy(accounts, deals, HoldingPolicy::default())
    }

    /// Create an engine with an explicit policy.
    pub fn with_policy(
        accounts: Arc<RwLock<AccountRegistry>>,
        deals: Arc<RwLock<DealRegistry>>,
        policy: HoldingPolicy,
    ) -> Self {
        Self {
            accounts,
            deals,
            policy,
        }
    }

    /// The policy in force.
    pub fn policy(&self) -> &HoldingPolicy {
        &self.policy
    }

    fn evaluate(&self, to: &Address, deal_id: &DealId, at: Timestamp) -> TransferDecision {
        // Unresolved recipients fall through as Unknown/Unknown.
        let (country, accreditation, kyc) = match self.accounts.read().account_of(to) {
            Some(record) => (
                record.country_code.clone(),
                record.accreditation,
                record.kyc,
            ),
            None => (
                String::new(),
                AccreditationStatus::Unknown,
                KycStatus::Unknown,
            ),
        };

        if !kyc.is_valid() {
            return TransferDecision::Deny(DenialReason::KycNotValid);
        }

        let issue_date = match self.deals.read().deal(deal_id) {
            Some(record) => record.issue_date,
            None => return TransferDecision::Deny(DenialReason::UnknownDeal),
        };

        if country != self.policy.restricted_country {
            return TransferDecision::Allow;
        }

        let age_months = self.policy.age_months(at.secs_since(issue_date));
        let required_months = if accreditation == AccreditationStatus::VerifiedAccredited {
            self.policy.verified_accredited_months
        } else {
            self.policy.default_months
        };

        if age_months >= required_months {
            TransferDecision::Allow
        } else {
            TransferDecision::Deny(DenialReason::HoldingPeriodNotMet {
                required_months,
                age_months,
            })
        }
    }
}

impl TransferGate for ComplianceEngine {
    fn check(
        &self,
        from: &Address,
        to: &Address,
        deal_id: &DealId,
        at: Timestamp,
    ) -> TransferDecision {
        let decision = self.evaluate(to, deal_id, at);
        if let TransferDecision::Deny(reason) = &decision {
            tracing::debug!(%from, %to, %deal_id, %reason, "transfer denied");
        }
        decision
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
