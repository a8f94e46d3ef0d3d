//! # Payment Ledger
//!
//! Balance bookkeeping for a single fungible payment token. Amounts are
//! `u128` base units; decimal scaling is the position ledger's concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deal_core::Address;

/// Errors from ledger operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// The holder's balance cannot cover the requested amount.
    #[error("insufficient balance for {holder}: have {have}, need {need}")]
    InsufficientBalance {
        /// The debited holder.
        holder: Address,
        /// Balance currently held.
        have: u128,
        /// Amount requested.
        need: u128,
    },

    /// Minting would overflow the total supply.
    #[error("mint of {amount} overflows total supply {supply}")]
    SupplyOverflow {
        /// Amount requested.
        amount: u128,
        /// Current total supply.
        supply: u128,
    },
}

/// An in-memory fungible-token ledger.
///
/// Absent holders have balance 0; a balance that reaches 0 is removed
/// from the map so the ledger never accumulates dead entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl PaymentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The balance held by `holder` (0 if absent).
    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Mint `amount` new units to `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow {
                amount,
                supply: self.total_supply,
            })?;
        self.total_supply = supply;
        // Per-holder balance cannot overflow if total supply did not.
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    /// Burn `amount` units from `from`.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` units from `from` to `to`.
    ///
    /// A zero-amount transfer is a no-op and always succeeds.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(from, amount)?;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        tracing::trace!(%from, %to, amount, "ledger transfer");
        Ok(())
    }

    fn debit(&mut self, from: &Address, amount: u128) -> Result<(), LedgerError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: from.clone(),
                have,
                need: amount,
            });
        }
        if have == amount {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), have - amount);
        }
        Ok(())
    }
}
