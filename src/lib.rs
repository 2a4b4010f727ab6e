//! Polycover — Risk-Pooling Insurance Engine for Prediction Markets
//!
//! Provider capital is pooled against policy payouts on market
//! outcomes. Premiums are priced from pool utilization and per-market
//! risk; claims settle against outcomes established by a bonded
//! propose/dispute/arbitrate oracle.
//!
//! Layered hexagonally: `domain` holds pure types and math, `ports`
//! the custody/certificate/outcome seams, `usecases` the stateful
//! pool, registry, and oracle components, `config` the TOML surface.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
