//! # Deposit Escrow State Machine
//!
//! ## States
//!
//! ```text
//! Deployed ──set_crowdfi()──▶ Ready ──fund()──▶ Funded (terminal)
//! ```
//!
//! Strictly forward, no regression. `set_crowdfi` succeeds exactly once
//! per escrow instance; `fund` disburses the escrow's entire payment
//! balance and always leaves the escrow holding zero.
//!
//! ## Fund routing
//!
//! Let `total` be the escrow's payment balance and `direct` the capital
//! the oracle credited to the escrow's own address (capped at `total`).
//! Then:
//!
//! - project receives `direct`,
//! - oracle pool receives `floor(surplus * 90 / 100)` where
//!   `surplus = total - direct`,
//! - fee recipient receives the rest of `surplus`.
//!
//! Rounding is deterministic: the pool share floors and every remainder
//! unit goes to the fee recipient. 35 surplus units split 31/4, never
//! 32/3, regardless of transfer order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::sync::Arc;

use deal_core::{Address, Timestamp};
use deal_ledger::{LedgerError, PaymentLedger};

use crate::oracle::CrowdFundingOracle;

/// Numerator of the crowdfunding-pool share of the surplus.
pub const POOL_SPLIT_NUMERATOR: u128 = 90;
/// Denominator of the surplus split.
pub const FEE_SPLIT_DENOMINATOR: u128 = 100;

// ─── State ───────────────────────────────────────────────────────────

/// The escrow lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EscrowState {
    /// Escrow constructed; oracle not yet attached.
    Deployed = 0,
    /// Oracle attached; awaiting disbursement.
    Ready = 1,
    /// Funds disbursed (terminal).
    Funded = 2,
}

impl EscrowState {
    /// Numeric state code (0, 1, 2).
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Funded)
    }
}

impl std::fmt::Display for EscrowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Deployed => "DEPLOYED",
            Self::Ready => "READY",
            Self::Funded => "FUNDED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from escrow operations.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// The caller is not the escrow operator.
    #[error("{caller} is not the escrow operator")]
    NotOperator {
        /// The rejected caller.
        caller: Address,
    },

    /// The operation is not valid in the current state.
    #[error("escrow state is not {expected} (current: {actual})")]
    StateMismatch {
        /// Required state.
        expected: EscrowState,
        /// State in force.
        actual: EscrowState,
    },

    /// The oracle reference was already set.
    #[error("crowdfunding oracle already set")]
    CrowdFiAlreadySet,

    /// Disbursement transfer failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ─── Records ─────────────────────────────────────────────────────────

/// Record of an escrow state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowTransitionRecord {
    /// State before the transition.
    pub from_state: EscrowState,
    /// State after the transition.
    pub to_state: EscrowState,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

/// The disbursement a `fund()` call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReport {
    /// Total payment balance collected by the escrow.
    pub total: u128,
    /// Sent to the project (the oracle's funding-target portion).
    pub project: u128,
    /// Sent to the crowdfunding pool.
    pub pool: u128,
    /// Sent to the fee recipient.
    pub fee: u128,
}

// ─── Escrow ──────────────────────────────────────────────────────────

/// A pooled-capital deposit escrow.
pub struct DepositEscrow {
    address: Address,
    fee_recipient: Address,
    project: Address,
    operator: Address,
    oracle: Option<Arc<dyn CrowdFundingOracle>>,
    state: EscrowState,
    transitions: Vec<EscrowTransitionRecord>,
}

impl std::fmt::Debug for DepositEscrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepositEscrow")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("oracle_set", &self.oracle.is_some())
            .finish_non_exhaustive()
    }
}

impl DepositEscrow {
    /// Create an escrow in the `Deployed` state.
    ///
    /// `address` is the escrow's own payment-ledger account, where
    /// collected capital accumulates before disbursement.
    pub fn new(
        address: Address,
        fee_recipient: Address,
        project: Address,
        operator: Address,
    ) -> Self {
        Self {
            address,
            fee_recipient,
            project,
            operator,
            oracle: None,
            state: EscrowState::Deployed,
            transitions: Vec::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> EscrowState {
        self.state
    }

    /// The escrow's own payment-ledger address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Ordered log of state transitions.
    pub fn transitions(&self) -> &[EscrowTransitionRecord] {
        &self.transitions
    }

    /// Attach the crowdfunding oracle. Operator only; exactly once.
    ///
    /// Transitions `Deployed → Ready`. A second call fails with
    /// [`EscrowError::CrowdFiAlreadySet`] in whatever state the escrow
    /// is in, and changes nothing.
    pub fn set_crowdfi(
        &mut self,
        caller: &Address,
        oracle: Arc<dyn CrowdFundingOracle>,
    ) -> Result<(), EscrowError> {
        self.require_operator(caller)?;
        if self.oracle.is_some() {
            return Err(EscrowError::CrowdFiAlreadySet);
        }
        self.oracle = Some(oracle);
        self.do_transition(EscrowState::Ready);
        Ok(())
    }

    /// Disburse the escrow's entire payment balance. Operator only;
    /// requires `Ready`.
    ///
    /// Transitions to `Funded` regardless of amounts — a zero-balance
    /// escrow funds successfully with an all-zero report. After the
    /// call the escrow's payment balance is exactly 0.
    pub fn fund(
        &mut self,
        caller: &Address,
        ledger: &mut PaymentLedger,
    ) -> Result<FundingReport, EscrowError> {
        self.require_operator(caller)?;
        if self.state != EscrowState::Ready {
            return Err(EscrowError::StateMismatch {
                expected: EscrowState::Ready,
                actual: self.state,
            });
        }
        // Ready is only entered through set_crowdfi, so the oracle is
        // present; the fallback keeps the invariant checked, not assumed.
        let oracle = match &self.oracle {
            Some(oracle) => Arc::clone(oracle),
            None => {
                return Err(EscrowError::StateMismatch {
                    expected: EscrowState::Ready,
                    actual: self.state,
                })
            }
        };

        let total = ledger.balance_of(&self.address);
        let direct = oracle.balance_of(&self.address).min(total);
        let surplus = total - direct;
        let pool = pool_share(surplus);
        let fee = surplus - pool;

        ledger.transfer(&self.address, &self.project, direct)?;
        ledger.transfer(&self.address, &oracle.pool_address(), pool)?;
        ledger.transfer(&self.address, &self.fee_recipient, fee)?;

        self.do_transition(EscrowState::Funded);
        let report = FundingReport {
            total,
            project: direct,
            pool,
            fee,
        };
        tracing::info!(
            escrow = %self.address,
            total,
            project = direct,
            pool,
            fee,
            "escrow disbursed"
        );
        Ok(report)
    }

    fn require_operator(&self, caller: &Address) -> Result<(), EscrowError> {
        if *caller != self.operator {
            return Err(EscrowError::NotOperator {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: EscrowState) {
        self.transitions.push(EscrowTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Timestamp::now(),
        });
        self.state = to;
    }
}

/// `floor(surplus * 90 / 100)` computed without the intermediate
/// product, so the split is exact up to `u128::MAX` — the largest
/// balance the payment ledger can hold.
fn pool_share(surplus: u128) -> u128 {
    let quotient = surplus / FEE_SPLIT_DENOMINATOR;
    let remainder = surplus % FEE_SPLIT_DENOMINATOR;
    quotient * POOL_SPLIT_NUMERATOR + remainder * POOL_SPLIT_NUMERATOR / FEE_SPLIT_DENOMINATOR
}

// ─── Tests ───────────────────────────────────────────────────────────
