//! # Crowdfunding Oracle
//!
//! The escrow's view of the external crowdfunding aggregator. The
//! oracle records, per address, how much capital was committed through
//! the aggregator; capital recorded against the escrow's own address is
//! the portion committed directly to the project's funding target.

use std::collections::HashMap;

use parking_lot::RwLock;

use deal_core::Address;

/// Read surface of the crowdfunding aggregator.
pub trait CrowdFundingOracle: Send + Sync {
    /// Capital recorded by the aggregator for `holder`.
    fn balance_of(&self, holder: &Address) -> u128;

    /// Where the crowdfunding-pool share of a disbursement is sent.
    fn pool_address(&self) -> Address;

    /// The payment token the aggregator denominates in.
    fn token(&self) -> Address;
}

/// In-memory oracle used by tests and the CLI simulator.
///
/// `credit()` stands in for the aggregator recording a commitment; the
/// escrow only ever reads.
#[derive(Debug)]
pub struct CrowdFiStub {
    pool: Address,
    token: Address,
    balances: RwLock<HashMap<Address, u128>>,
}

impl CrowdFiStub {
    /// Create a stub whose pool share is delivered to `pool`, in `token`.
    pub fn new(pool: Address, token: Address) -> Self {
        Self {
            pool,
            token,
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Record a commitment of `amount` against `holder`, saturating at
    /// `u128::MAX`.
    pub fn credit(&self, holder: &Address, amount: u128) {
        let mut balances = self.balances.write();
        let entry = balances.entry(holder.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
}

impl CrowdFundingOracle for CrowdFiStub {
    fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.read().get(holder).copied().unwrap_or(0)
    }

    fn pool_address(&self) -> Address {
        self.pool.clone()
    }

    fn token(&self) -> Address {
        self.token.clone()
    }
}
