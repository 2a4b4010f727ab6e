//! Per-market outcome resolution state machine.
//!
//! `None → Proposed → {Resolved via timeout | Disputed → Resolved via
//! arbitration}`. The `None` state is absence from the oracle's market map.
//! Transitions are guarded on the type itself; an invalid transition is a
//! typed error, never silently ignored. Time-window checks live in the
//! oracle, which owns the dispute-window parameter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;
use crate::domain::policy::{AccountId, MarketId, OutcomeHash};

/// A bonded outcome proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Account that posted the proposal.
    pub proposer: AccountId,
    /// Proposed outcome commitment.
    pub outcome_hash: OutcomeHash,
    /// When the proposal was posted; the dispute window opens here.
    pub proposed_at: DateTime<Utc>,
    /// Bond escrowed by the proposer.
    pub bond: Decimal,
}

/// A bonded counter-proposal. By rule the dispute bond equals the
/// proposal's bond (symmetric stake).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Account that raised the dispute.
    pub disputer: AccountId,
    /// Counter outcome commitment; differs from the proposed hash.
    pub counter_hash: OutcomeHash,
    /// When the dispute was raised.
    pub disputed_at: DateTime<Utc>,
    /// Bond escrowed by the disputer.
    pub bond: Decimal,
}

/// A finalized market outcome. Created exactly once per market id and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOutcome {
    /// The finalized outcome commitment.
    pub outcome_hash: OutcomeHash,
    /// When the outcome was finalized.
    pub resolved_at: DateTime<Utc>,
}

/// Resolution state of a single market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketResolution {
    /// A proposal is open; the dispute window is running.
    Proposed(Proposal),
    /// The proposal was challenged; awaiting arbitration.
    Disputed {
        proposal: Proposal,
        dispute: Dispute,
    },
    /// Outcome finalized. Terminal.
    Resolved(MarketOutcome),
}

impl MarketResolution {
    /// The open proposal, if any.
    pub fn proposal(&self) -> Option<&Proposal> {
        match self {
            Self::Proposed(p) | Self::Disputed { proposal: p, .. } => Some(p),
            Self::Resolved(_) => None,
        }
    }

    /// The open dispute, if any.
    pub fn dispute(&self) -> Option<&Dispute> {
        match self {
            Self::Disputed { dispute, .. } => Some(dispute),
            _ => None,
        }
    }

    /// The finalized outcome, if resolved.
    pub fn outcome(&self) -> Option<&MarketOutcome> {
        match self {
            Self::Resolved(o) => Some(o),
            _ => None,
        }
    }

    /// Transition `Proposed → Disputed`.
    ///
    /// Rejects a dispute whose counter-hash matches the proposal, and any
    /// transition out of a non-`Proposed` state.
    pub fn into_disputed(
        self,
        market_id: &MarketId,
        dispute: Dispute,
    ) -> Result<Self, EngineError> {
        match self {
            Self::Proposed(proposal) => {
                if dispute.counter_hash == proposal.outcome_hash {
                    return Err(EngineError::IdenticalOutcome);
                }
                Ok(Self::Disputed { proposal, dispute })
            }
            Self::Disputed { .. } => Err(EngineError::NotProposed(market_id.clone())),
            Self::Resolved(_) => Err(EngineError::AlreadyResolved(market_id.clone())),
        }
    }

    /// Transition `Proposed → Resolved` on an uncontested timeout. The
    /// finalized hash is the proposed hash.
    pub fn into_finalized(
        self,
        market_id: &MarketId,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        match self {
            Self::Proposed(proposal) => Ok(Self::Resolved(MarketOutcome {
                outcome_hash: proposal.outcome_hash,
                resolved_at: now,
            })),
            Self::Disputed { .. } => Err(EngineError::NotProposed(market_id.clone())),
            Self::Resolved(_) => Err(EngineError::AlreadyResolved(market_id.clone())),
        }
    }

    /// Transition `Disputed → Resolved` by arbitration.
    ///
    /// `final_hash` must equal exactly one of the two submitted hashes.
    pub fn into_arbitrated(
        self,
        market_id: &MarketId,
        final_hash: &OutcomeHash,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        match self {
            Self::Disputed { proposal, dispute } => {
                if *final_hash != proposal.outcome_hash
                    && *final_hash != dispute.counter_hash
                {
                    return Err(EngineError::InvalidOutcome(final_hash.clone()));
                }
                Ok(Self::Resolved(MarketOutcome {
                    outcome_hash: final_hash.clone(),
                    resolved_at: now,
                }))
            }
            Self::Proposed(_) => Err(EngineError::NotDisputed(market_id.clone())),
            Self::Resolved(_) => Err(EngineError::AlreadyResolved(market_id.clone())),
        }
    }
}
