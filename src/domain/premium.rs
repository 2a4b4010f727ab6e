//! Premium and payout pricing.
//!
//! Pure, deterministic functions: premiums scale with pool utilization,
//! payouts scale inversely with the market's risk score, and coverage is
//! always partial indemnity, never full. All rates are expressed in basis
//! points against `BASIS = 10000`.

use rust_decimal::Decimal;

use crate::domain::error::EngineError;

/// One hundred percent, in basis points.
pub const BASIS_BPS: u32 = 10_000;

/// Pricing parameters, in basis points of coverage.
#[derive(Debug, Clone)]
pub struct PremiumParams {
    /// Base premium rate at zero utilization.
    pub base_rate_bps: u32,
    /// Lower clamp on the effective premium rate.
    pub min_rate_bps: u32,
    /// Upper clamp on the effective premium rate.
    pub max_rate_bps: u32,
    /// Payout fraction at maximum risk.
    pub payout_min_bps: u32,
    /// Payout fraction at zero risk.
    pub payout_max_bps: u32,
    /// Minimum premium as a fraction of the payout (sustainability floor).
    pub sufficiency_bps: u32,
}

impl Default for PremiumParams {
    fn default() -> Self {
        Self {
            base_rate_bps: 500,
            min_rate_bps: 300,
            max_rate_bps: 2_000,
            payout_min_bps: 4_000,
            payout_max_bps: 6_000,
            sufficiency_bps: 3_000,
        }
    }
}

/// Deterministic, side-effect-free premium and payout calculator.
#[derive(Debug, Clone, Default)]
pub struct PremiumEngine {
    params: PremiumParams,
}

impl PremiumEngine {
    /// Create an engine with the given pricing parameters.
    pub fn new(params: PremiumParams) -> Self {
        Self { params }
    }

    /// Price a premium for `coverage` at the current pool utilization.
    ///
    /// Base rate scaled by `1 + utilization² / BASIS²`, clamped into
    /// `[min_rate, max_rate]` of coverage.
    pub fn price(
        &self,
        coverage: Decimal,
        utilization_bps: u32,
    ) -> Result<Decimal, EngineError> {
        if coverage <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }
        if utilization_bps > BASIS_BPS {
            return Err(EngineError::UtilizationOutOfRange(utilization_bps));
        }

        let basis = Decimal::from(BASIS_BPS);
        let u = Decimal::from(utilization_bps);
        let multiplier = Decimal::ONE + (u * u) / (basis * basis);
        let raw = coverage * Decimal::from(self.params.base_rate_bps) / basis * multiplier;

        let floor = coverage * Decimal::from(self.params.min_rate_bps) / basis;
        let ceiling = coverage * Decimal::from(self.params.max_rate_bps) / basis;
        Ok(raw.clamp(floor, ceiling))
    }

    /// Indemnity paid for `coverage` given the market's risk score.
    ///
    /// Linear map of risk ∈ [0, 10000] onto the payout band: higher risk
    /// pays a smaller fraction of coverage.
    pub fn payout(
        &self,
        coverage: Decimal,
        risk_score_bps: u32,
    ) -> Result<Decimal, EngineError> {
        if coverage <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }
        if risk_score_bps > BASIS_BPS {
            return Err(EngineError::RiskScoreOutOfRange(risk_score_bps));
        }

        let span = self.params.payout_max_bps - self.params.payout_min_bps;
        let payout_bps = self.params.payout_max_bps - risk_score_bps * span / BASIS_BPS;
        Ok(coverage * Decimal::from(payout_bps) / Decimal::from(BASIS_BPS))
    }

    /// Whether `premium` clears the sustainability floor: at least
    /// `sufficiency_bps` of the payout this policy could owe.
    pub fn is_sufficient(
        &self,
        premium: Decimal,
        coverage: Decimal,
        risk_score_bps: u32,
    ) -> Result<bool, EngineError> {
        let floor = self.sufficiency_floor(coverage, risk_score_bps)?;
        Ok(premium >= floor)
    }

    /// The minimum acceptable premium for `coverage` at the given risk.
    pub fn sufficiency_floor(
        &self,
        coverage: Decimal,
        risk_score_bps: u32,
    ) -> Result<Decimal, EngineError> {
        let payout = self.payout(coverage, risk_score_bps)?;
        Ok(payout * Decimal::from(self.params.sufficiency_bps) / Decimal::from(BASIS_BPS))
    }

    /// Value of one pool share: 1 when the pool has no shares (first
    /// depositor gets 1:1), otherwise `total_liquidity / total_shares`.
    pub fn share_value(total_liquidity: Decimal, total_shares: Decimal) -> Decimal {
        if total_shares.is_zero() {
            Decimal::ONE
        } else {
            total_liquidity / total_shares
        }
    }
}
