//! Core coverage domain types.
//!
//! Defines the policy entity, the pool accounting records, and the
//! identifier aliases shared between the usecases and the ports boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────
// Identifier aliases consumed by ports and usecases
// ────────────────────────────────────────────

/// Identity of an account (depositor, holder, proposer, arbitrator).
pub type AccountId = String;

/// Prediction-market identifier a policy is keyed to.
pub type MarketId = String;

/// Opaque commitment to a market outcome.
pub type OutcomeHash = String;

/// Unique policy identifier.
pub type PolicyId = Uuid;

// ────────────────────────────────────────────
// Pool accounting records
// ────────────────────────────────────────────

/// Aggregate accounting state of the liquidity pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolState {
    /// Total assets held by the pool.
    pub total_liquidity: Decimal,
    /// Liquidity not committed to outstanding coverage.
    pub available_liquidity: Decimal,
    /// Cumulative premiums collected.
    pub total_premiums: Decimal,
    /// Cumulative claims paid out.
    pub total_claims: Decimal,
    /// Total pool-ownership shares outstanding.
    pub total_shares: Decimal,
    /// Whether deposits, withdrawals, and premium intake are accepted.
    pub active: bool,
}

impl PoolState {
    /// An empty, active pool.
    pub fn empty() -> Self {
        Self {
            total_liquidity: Decimal::ZERO,
            available_liquidity: Decimal::ZERO,
            total_premiums: Decimal::ZERO,
            total_claims: Decimal::ZERO,
            total_shares: Decimal::ZERO,
            active: true,
        }
    }

    /// Liquidity committed to outstanding coverage.
    pub fn locked(&self) -> Decimal {
        self.total_liquidity - self.available_liquidity
    }
}

/// A liquidity provider's stake in the pool.
///
/// Created on first deposit and never deleted; a position with zero
/// shares signals inactivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPosition {
    /// Shares currently held.
    pub shares: Decimal,
    /// Cumulative gross amount deposited.
    pub deposited_amount: Decimal,
    /// Timestamp of the last deposit or withdrawal.
    pub last_update_time: DateTime<Utc>,
}

// ────────────────────────────────────────────
// Policy entity
// ────────────────────────────────────────────

/// Lifecycle status of a policy. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Coverage in force.
    Active,
    /// Indemnity paid out. Terminal.
    Claimed,
    /// Coverage lapsed past its deadline. Terminal.
    Expired,
    /// Cancelled before taking effect. Terminal.
    Cancelled,
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A partial-indemnity coverage policy keyed to a prediction market.
///
/// Coverage terms are immutable after creation; only `status` and
/// `resolved_outcome_hash` change, and only through the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy ID.
    pub id: PolicyId,
    /// Account the policy was issued to.
    pub holder: AccountId,
    /// Prediction market the policy is keyed to.
    pub market_id: MarketId,
    /// Maximum indemnity this policy can pay.
    pub coverage_amount: Decimal,
    /// Premium paid at issuance.
    pub premium: Decimal,
    /// Issuance timestamp.
    pub start_time: DateTime<Utc>,
    /// Coverage deadline; claims are rejected after this instant.
    pub expiry_time: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: PolicyStatus,
    /// Outcome hash the claim settled against, once claimed.
    pub resolved_outcome_hash: Option<OutcomeHash>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_pool_state() {
        let state = PoolState::empty();
        assert!(state.active);
        assert_eq!(state.total_liquidity, Decimal::ZERO);
        assert_eq!(state.locked(), Decimal::ZERO);
    }

    #[test]
    fn test_locked_is_total_minus_available() {
        let state = PoolState {
            total_liquidity: dec!(1000),
            available_liquidity: dec!(700),
            total_premiums: Decimal::ZERO,
            total_claims: Decimal::ZERO,
            total_shares: dec!(1000),
            active: true,
        };
        assert_eq!(state.locked(), dec!(300));
    }

    #[test]
    fn test_policy_status_display() {
        assert_eq!(format!("{}", PolicyStatus::Active), "ACTIVE");
        assert_eq!(format!("{}", PolicyStatus::Claimed), "CLAIMED");
    }
}
