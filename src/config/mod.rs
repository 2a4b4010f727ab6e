//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates the engine parameters from `engine.toml`. All
//! rates, caps, bounds, and window lengths are externalized here -
//! nothing is hardcoded in the domain layer. Serde defaults match the
//! protocol constants, so an empty file yields a working configuration.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::premium::PremiumParams;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
  /// Liquidity pool parameters.
  #[serde(default)]
  pub pool: PoolConfig,
  /// Policy issuance parameters.
  #[serde(default)]
  pub policy: PolicyConfig,
  /// Premium and payout pricing parameters.
  #[serde(default)]
  pub premium: PremiumConfig,
  /// Outcome resolution parameters.
  #[serde(default)]
  pub oracle: OracleConfig,
}

/// Liquidity pool parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
  /// Maximum pool utilization in basis points (8000 = 80%).
  #[serde(default = "default_utilization_cap")]
  pub utilization_cap_bps: u32,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      utilization_cap_bps: default_utilization_cap(),
    }
  }
}

/// Policy issuance parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
  /// Minimum coverage per policy.
  #[serde(default = "default_min_coverage")]
  pub min_coverage: Decimal,
  /// Maximum coverage per policy.
  #[serde(default = "default_max_coverage")]
  pub max_coverage: Decimal,
  /// Minimum policy duration in seconds.
  #[serde(default = "default_min_duration")]
  pub min_duration_secs: u64,
  /// Maximum policy duration in seconds.
  #[serde(default = "default_max_duration")]
  pub max_duration_secs: u64,
  /// Per-market exposure cap in basis points of current pool liquidity.
  #[serde(default = "default_market_concentration")]
  pub market_concentration_bps: u32,
  /// Per-holder exposure cap in basis points of current pool liquidity.
  #[serde(default = "default_holder_concentration")]
  pub holder_concentration_bps: u32,
  /// Risk score assumed for markets with no assigned score.
  #[serde(default = "default_risk")]
  pub default_risk_bps: u32,
}

impl Default for PolicyConfig {
  fn default() -> Self {
    Self {
      min_coverage: default_min_coverage(),
      max_coverage: default_max_coverage(),
      min_duration_secs: default_min_duration(),
      max_duration_secs: default_max_duration(),
      market_concentration_bps: default_market_concentration(),
      holder_concentration_bps: default_holder_concentration(),
      default_risk_bps: default_risk(),
    }
  }
}

/// Premium and payout pricing parameters, in basis points.
#[derive(Debug, Clone, Deserialize)]
pub struct PremiumConfig {
  /// Base premium rate at zero utilization.
  #[serde(default = "default_base_rate")]
  pub base_rate_bps: u32,
  /// Lower clamp on the effective premium rate.
  #[serde(default = "default_min_rate")]
  pub min_rate_bps: u32,
  /// Upper clamp on the effective premium rate.
  #[serde(default = "default_max_rate")]
  pub max_rate_bps: u32,
  /// Payout fraction at maximum risk.
  #[serde(default = "default_payout_min")]
  pub payout_min_bps: u32,
  /// Payout fraction at zero risk.
  #[serde(default = "default_payout_max")]
  pub payout_max_bps: u32,
  /// Minimum premium as a fraction of the potential payout.
  #[serde(default = "default_sufficiency")]
  pub sufficiency_bps: u32,
}

impl Default for PremiumConfig {
  fn default() -> Self {
    Self {
      base_rate_bps: default_base_rate(),
      min_rate_bps: default_min_rate(),
      max_rate_bps: default_max_rate(),
      payout_min_bps: default_payout_min(),
      payout_max_bps: default_payout_max(),
      sufficiency_bps: default_sufficiency(),
    }
  }
}

impl From<&PremiumConfig> for PremiumParams {
  fn from(config: &PremiumConfig) -> Self {
    Self {
      base_rate_bps: config.base_rate_bps,
      min_rate_bps: config.min_rate_bps,
      max_rate_bps: config.max_rate_bps,
      payout_min_bps: config.payout_min_bps,
      payout_max_bps: config.payout_max_bps,
      sufficiency_bps: config.sufficiency_bps,
    }
  }
}

/// Outcome resolution parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
  /// Fixed minimum proposal bond.
  #[serde(default = "default_min_bond")]
  pub min_bond: Decimal,
  /// Bond as basis points of the proposer-declared exposure (1000 = 10%).
  #[serde(default = "default_bond_rate")]
  pub bond_rate_bps: u32,
  /// Length of the dispute window in seconds (86400 = 24 h).
  #[serde(default = "default_dispute_window")]
  pub dispute_window_secs: u64,
  /// Minimum number of registered arbitrators required to arbitrate.
  #[serde(default = "default_min_arbitrators")]
  pub min_arbitrators: usize,
}

impl Default for OracleConfig {
  fn default() -> Self {
    Self {
      min_bond: default_min_bond(),
      bond_rate_bps: default_bond_rate(),
      dispute_window_secs: default_dispute_window(),
      min_arbitrators: default_min_arbitrators(),
    }
  }
}

// Default value functions for serde

fn default_utilization_cap() -> u32 {
  8_000
}

fn default_min_coverage() -> Decimal {
  dec!(10)
}

fn default_max_coverage() -> Decimal {
  dec!(1_000_000)
}

fn default_min_duration() -> u64 {
  86_400 // 1 day
}

fn default_max_duration() -> u64 {
  31_536_000 // 365 days
}

fn default_market_concentration() -> u32 {
  2_000
}

fn default_holder_concentration() -> u32 {
  1_000
}

fn default_risk() -> u32 {
  5_000
}

fn default_base_rate() -> u32 {
  500
}

fn default_min_rate() -> u32 {
  300
}

fn default_max_rate() -> u32 {
  2_000
}

fn default_payout_min() -> u32 {
  4_000
}

fn default_payout_max() -> u32 {
  6_000
}

fn default_sufficiency() -> u32 {
  3_000
}

fn default_min_bond() -> Decimal {
  dec!(100)
}

fn default_bond_rate() -> u32 {
  1_000
}

fn default_dispute_window() -> u64 {
  86_400
}

fn default_min_arbitrators() -> usize {
  3
}
