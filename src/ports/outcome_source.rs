//! Outcome Source Port - Oracle Consumer Interface
//!
//! The view of the resolution oracle the policy registry consumes. The
//! in-crate `ResolutionOracle` implements it; tests substitute mocks.

use crate::domain::policy::MarketId;
use crate::domain::resolution::MarketOutcome;

/// Read-only access to finalized market outcomes.
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeSource {
    /// Whether the market's outcome has been finalized.
    fn is_resolved(&self, market_id: &MarketId) -> bool;

    /// The finalized outcome, if any.
    fn outcome(&self, market_id: &MarketId) -> Option<MarketOutcome>;
}
