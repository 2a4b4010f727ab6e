//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `engine.toml`, validating all parameters, and
//! providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::EngineConfig;
use crate::domain::premium::BASIS_BPS;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns a detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<EngineConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: EngineConfig =
    toml::from_str(&content).with_context(|| "Failed to parse engine.toml")?;

  validate_config(&config)?;

  info!(
    utilization_cap_bps = config.pool.utilization_cap_bps,
    base_rate_bps = config.premium.base_rate_bps,
    dispute_window_secs = config.oracle.dispute_window_secs,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Basis-point values within [0, 10000]
/// - Coherent min/max bounds
/// - Positive window lengths and bonds
pub fn validate_config(config: &EngineConfig) -> Result<()> {
  // Pool validation
  anyhow::ensure!(
    config.pool.utilization_cap_bps > 0 && config.pool.utilization_cap_bps <= BASIS_BPS,
    "utilization_cap_bps must be in (0, 10000], got {}",
    config.pool.utilization_cap_bps
  );

  // Policy validation
  anyhow::ensure!(
    config.policy.min_coverage > Decimal::ZERO,
    "min_coverage must be positive, got {}",
    config.policy.min_coverage
  );
  anyhow::ensure!(
    config.policy.min_coverage <= config.policy.max_coverage,
    "min_coverage {} exceeds max_coverage {}",
    config.policy.min_coverage,
    config.policy.max_coverage
  );
  anyhow::ensure!(
    config.policy.min_duration_secs > 0
      && config.policy.min_duration_secs <= config.policy.max_duration_secs,
    "duration bounds must satisfy 0 < min <= max, got [{}, {}]",
    config.policy.min_duration_secs,
    config.policy.max_duration_secs
  );
  anyhow::ensure!(
    config.policy.market_concentration_bps <= BASIS_BPS
      && config.policy.holder_concentration_bps <= BASIS_BPS,
    "concentration caps must not exceed 10000 bps"
  );
  anyhow::ensure!(
    config.policy.default_risk_bps <= BASIS_BPS,
    "default_risk_bps must not exceed 10000, got {}",
    config.policy.default_risk_bps
  );

  // Premium validation
  anyhow::ensure!(
    config.premium.min_rate_bps <= config.premium.max_rate_bps
      && config.premium.max_rate_bps <= BASIS_BPS,
    "premium rate clamp must satisfy min <= max <= 10000, got [{}, {}]",
    config.premium.min_rate_bps,
    config.premium.max_rate_bps
  );
  anyhow::ensure!(
    config.premium.payout_min_bps <= config.premium.payout_max_bps
      && config.premium.payout_max_bps <= BASIS_BPS,
    "payout band must satisfy min <= max <= 10000, got [{}, {}]",
    config.premium.payout_min_bps,
    config.premium.payout_max_bps
  );
  anyhow::ensure!(
    config.premium.sufficiency_bps <= BASIS_BPS,
    "sufficiency_bps must not exceed 10000, got {}",
    config.premium.sufficiency_bps
  );

  // Oracle validation
  anyhow::ensure!(
    config.oracle.min_bond > Decimal::ZERO,
    "min_bond must be positive, got {}",
    config.oracle.min_bond
  );
  anyhow::ensure!(
    config.oracle.bond_rate_bps > 0 && config.oracle.bond_rate_bps <= BASIS_BPS,
    "bond_rate_bps must be in (0, 10000], got {}",
    config.oracle.bond_rate_bps
  );
  anyhow::ensure!(
    config.oracle.dispute_window_secs > 0,
    "dispute_window_secs must be positive"
  );
  anyhow::ensure!(
    config.oracle.min_arbitrators >= 1,
    "min_arbitrators must be at least 1"
  );

  Ok(())
}
