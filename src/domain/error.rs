//! Typed failure taxonomy for the coverage engine.
//!
//! Every fallible operation returns `EngineError`. Each variant carries a
//! descriptive message and classifies into one of five `ErrorKind` buckets
//! so callers can branch on the failure class without matching every
//! variant.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::policy::{AccountId, MarketId, OutcomeHash, PolicyId};

/// Failure classes. Every `EngineError` variant maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Zero or out-of-range amounts, durations, scores, or outcome hashes.
    InputValidation,
    /// Wrong caller identity for a privileged entry point.
    Authorization,
    /// Operation is not valid in the current state.
    StateConflict,
    /// Insufficient shares, liquidity, or headroom under a cap.
    ResourceExhaustion,
    /// Deadline or window constraint violated.
    TemporalViolation,
}

/// Failure reported by the asset-custody collaborator.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CustodyError(pub String);

/// Failure reported by the ownership-certificate collaborator.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CertificateError(pub String);

/// All failures the engine can produce.
///
/// Failures are detected synchronously and abort the enclosing operation
/// with zero partial state change. Retrying is a caller responsibility.
#[derive(Debug, Error)]
pub enum EngineError {
    // ── Input validation ────────────────────────────────────
    #[error("amount must be positive")]
    ZeroAmount,

    #[error("coverage {amount} outside allowed range [{min}, {max}]")]
    CoverageOutOfRange {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("duration {secs}s outside allowed range [{min}s, {max}s]")]
    DurationOutOfRange { secs: u64, min: u64, max: u64 },

    #[error("risk score {0} bps exceeds 10000")]
    RiskScoreOutOfRange(u32),

    #[error("utilization {0} bps exceeds 10000")]
    UtilizationOutOfRange(u32),

    #[error("premium {supplied} below required premium {required}")]
    PremiumTooLow { supplied: Decimal, required: Decimal },

    #[error("premium {supplied} below sustainability floor {floor}")]
    PremiumInsufficient { supplied: Decimal, floor: Decimal },

    #[error("counter-outcome matches the proposed outcome")]
    IdenticalOutcome,

    #[error("outcome {0} matches neither submitted side")]
    InvalidOutcome(OutcomeHash),

    // ── Authorization ───────────────────────────────────────
    #[error("caller {caller} lacks the {role} role")]
    Unauthorized { caller: AccountId, role: String },

    #[error("caller {0} does not hold the policy certificate")]
    NotCertificateHolder(AccountId),

    // ── State conflicts ─────────────────────────────────────
    #[error("pool is paused")]
    PoolPaused,

    #[error("market {0} already has an open proposal")]
    AlreadyProposed(MarketId),

    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    #[error("market {0} has no open proposal")]
    NotProposed(MarketId),

    #[error("market {0} is not under dispute")]
    NotDisputed(MarketId),

    #[error("unknown policy {0}")]
    UnknownPolicy(PolicyId),

    #[error("policy {0} is not active")]
    PolicyNotActive(PolicyId),

    #[error("arbitrator quorum not met ({have} of {need})")]
    ArbitrationUnavailable { have: usize, need: usize },

    #[error("reentrant call rejected")]
    ReentrantCall,

    // ── Resource exhaustion ─────────────────────────────────
    #[error("deposit too small to mint a whole share")]
    SharesTooSmall,

    #[error("insufficient shares: have {have}, need {need}")]
    InsufficientShares { have: Decimal, need: Decimal },

    #[error("withdrawal of {amount} exceeds unlocked liquidity {available}")]
    LiquidityLocked { amount: Decimal, available: Decimal },

    #[error("claim of {amount} exceeds available liquidity {available}")]
    InsufficientLiquidity { amount: Decimal, available: Decimal },

    #[error("coverage would breach the per-{scope} concentration limit")]
    ConcentrationLimit { scope: &'static str },

    #[error("coverage would push pool utilization past the cap")]
    UtilizationExceeded,

    // ── Temporal violations ─────────────────────────────────
    #[error("policy {0} has expired")]
    PolicyExpired(PolicyId),

    #[error("policy {0} has not yet expired")]
    PolicyNotExpired(PolicyId),

    #[error("market {0} outcome is not resolved")]
    MarketNotResolved(MarketId),

    #[error("dispute window for market {0} has closed")]
    DisputeWindowClosed(MarketId),

    #[error("dispute window for market {0} is still open")]
    DisputeWindowOpen(MarketId),

    // ── Collaborator failures ───────────────────────────────
    #[error("custody transfer failed: {0}")]
    Custody(#[from] CustodyError),

    #[error("certificate operation failed: {0}")]
    Certificate(#[from] CertificateError),
}

impl EngineError {
    /// Classify this error into its taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount
            | Self::CoverageOutOfRange { .. }
            | Self::DurationOutOfRange { .. }
            | Self::RiskScoreOutOfRange(_)
            | Self::UtilizationOutOfRange(_)
            | Self::PremiumTooLow { .. }
            | Self::PremiumInsufficient { .. }
            | Self::IdenticalOutcome
            | Self::InvalidOutcome(_) => ErrorKind::InputValidation,

            Self::Unauthorized { .. } | Self::NotCertificateHolder(_) => {
                ErrorKind::Authorization
            }

            Self::PoolPaused
            | Self::AlreadyProposed(_)
            | Self::AlreadyResolved(_)
            | Self::NotProposed(_)
            | Self::NotDisputed(_)
            | Self::UnknownPolicy(_)
            | Self::PolicyNotActive(_)
            | Self::ArbitrationUnavailable { .. }
            | Self::ReentrantCall => ErrorKind::StateConflict,

            Self::SharesTooSmall
            | Self::InsufficientShares { .. }
            | Self::LiquidityLocked { .. }
            | Self::InsufficientLiquidity { .. }
            | Self::ConcentrationLimit { .. }
            | Self::UtilizationExceeded
            | Self::Custody(_) => ErrorKind::ResourceExhaustion,

            Self::PolicyExpired(_)
            | Self::PolicyNotExpired(_)
            | Self::MarketNotResolved(_)
            | Self::DisputeWindowClosed(_)
            | Self::DisputeWindowOpen(_) => ErrorKind::TemporalViolation,

            Self::Certificate(_) => ErrorKind::StateConflict,
        }
    }
}
