//! # Holding-Period Policy Constants
//!
//! The regulatory parameters of the transfer decision table, isolated
//! from the evaluation algorithm. These values encode Rule 144-style
//! resale windows and must not drift silently across upgrades.

use serde::{Deserialize, Serialize};

/// Seconds in one policy month: fixed 30-day months, floor division.
///
/// Asset age in months is `elapsed_seconds / MONTH_SECONDS`. Calendar
/// months are deliberately not used — a fixed month length keeps age
/// computation bit-exact regardless of issuance date.
pub const MONTH_SECONDS: u64 = 30 * 86_400;

/// The holding-period policy evaluated for transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPolicy {
    /// Country code whose investors are subject to holding periods.
    pub restricted_country: String,
    /// Months a verified-accredited investor must wait from issuance.
    pub verified_accredited_months: u64,
    /// Months every other investor in the restricted country must wait.
    pub default_months: u64,
    /// Seconds per policy month.
    pub month_seconds: u64,
}

impl Default for HoldingPolicy {
    fn default() -> Self {
        Self {
            restricted_country: "US".to_string(),
            verified_accredited_months: 6,
            default_months: 12,
            month_seconds: MONTH_SECONDS,
        }
    }
}

impl HoldingPolicy {
    /// Whole policy months in `elapsed_secs` (integer floor).
    pub fn age_months(&self, elapsed_secs: u64) -> u64 {
        elapsed_secs / self.month_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let p = HoldingPolicy::default();
        assert_eq!(p.restricted_country, "US");
        assert_eq!(p.verified_accredited_months, 6);
        assert_eq!(p.default_months, 12);
        assert_eq!(p.month_seconds, 2_592_000);
    }

    #[test]
    fn test_age_months_floors() {
        let p = HoldingPolicy::default();
        assert_eq!(p.age_months(0), 0);
        assert_eq!(p.age_months(MONTH_SECONDS - 1), 0);
        assert_eq!(p.age_months(MONTH_SECONDS), 1);
        assert_eq!(p.age_months(6 * MONTH_SECONDS - 1), 5);
        assert_eq!(p.age_months(6 * MONTH_SECONDS), 6);
    }
}
