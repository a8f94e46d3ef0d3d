//! # Deal Registry — Issuance Metadata
//!
//! Per-deal issuance records consumed by the compliance engine (issue
//! date → asset age) and the position ledger (payment token, decimals,
//! funds recipient).
//!
//! ## Invariant
//!
//! The issue date is immutable once a deal is registered. Asset age is
//! the regulatory clock — re-dating a deal would silently re-open or
//! close holding-period windows, so registering the same deal id twice
//! is a configuration error, not an update.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deal_core::{Address, DealId, Timestamp};

/// Errors from deal-registry operations.
#[derive(Error, Debug, PartialEq)]
pub enum DealError {
    /// The caller is not the registry admin.
    #[error("{caller} is not the deal registry admin")]
    NotAdmin {
        /// The rejected caller.
        caller: Address,
    },

    /// The deal id is already registered (issue dates are immutable).
    #[error("deal {deal_id} is already registered")]
    AlreadyRegistered {
        /// The conflicting deal id.
        deal_id: DealId,
    },

    /// No deal exists with this id.
    #[error("no deal with id {deal_id}")]
    UnknownDeal {
        /// The missing deal id.
        deal_id: DealId,
    },
}

/// Issuance metadata for one deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    /// The deal identifier.
    pub deal_id: DealId,
    /// When the deal's asset was issued. Immutable.
    pub issue_date: Timestamp,
    /// The payment token positions in this deal are denominated in.
    pub payment_token: Address,
    /// Decimals of the payment token (position quantities are whole
    /// units; payments scale by `10^payment_decimals`).
    pub payment_decimals: u8,
    /// Where capital contributions are forwarded on mint.
    pub funds_recipient: Address,
}

/// The deal issuance registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRegistry {
    admin: Address,
    deals: HashMap<DealId, DealRecord>,
}

impl DealRegistry {
    /// Create a registry administered by `admin`.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            deals: HashMap::new(),
        }
    }

    /// Register a deal's issuance record. Admin only; one registration
    /// per deal id, ever.
    pub fn register(&mut self, caller: &Address, record: DealRecord) -> Result<(), DealError> {
        if *caller != self.admin {
            return Err(DealError::NotAdmin {
                caller: caller.clone(),
            });
        }
        if self.deals.contains_key(&record.deal_id) {
            return Err(DealError::AlreadyRegistered {
                deal_id: record.deal_id,
            });
        }
        tracing::debug!(deal_id = %record.deal_id, issue_date = %record.issue_date, "deal registered");
        self.deals.insert(record.deal_id, record);
        Ok(())
    }

    /// Look up a deal's issuance record.
    pub fn deal(&self, deal_id: &DealId) -> Option<&DealRecord> {
        self.deals.get(deal_id)
    }

    /// Number of registered deals.
    pub fn len(&self) -> usize {
        self.deals.len()
    }

    /// Whether no deals are registered.
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}
