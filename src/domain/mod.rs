//! Domain layer - Core business logic and models.
//!
//! Pure pricing math, entity types, the resolution state machine, the
//! error taxonomy, and the access/guard primitives. No IO here
//! (hexagonal architecture inner ring); everything is testable in
//! isolation.

pub mod access;
pub mod error;
pub mod guard;
pub mod policy;
pub mod premium;
pub mod resolution;

// Re-export core types for convenience
pub use access::{AccessTable, Role};
pub use error::{EngineError, ErrorKind};
pub use guard::CallGuard;
pub use policy::{
    AccountId, MarketId, OutcomeHash, Policy, PolicyId, PolicyStatus, PoolState,
    ProviderPosition,
};
pub use premium::{PremiumEngine, PremiumParams};
pub use resolution::{Dispute, MarketOutcome, MarketResolution, Proposal};
