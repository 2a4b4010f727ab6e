//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the engine's core workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `LiquidityPool`: Share-based capital accounting and custody flows
//! - `PolicyRegistry`: Policy issuance, claims, and expiry
//! - `ResolutionOracle`: Bonded propose/dispute/arbitrate protocol

pub mod liquidity_pool;
pub mod policy_registry;
pub mod resolution_oracle;

pub use liquidity_pool::LiquidityPool;
pub use policy_registry::PolicyRegistry;
pub use resolution_oracle::ResolutionOracle;
