//! Policy Registry - Coverage Issuance, Claims, and Expiry
//!
//! Orchestrates the pool, the premium engine, and the outcome oracle:
//! prices and issues policies under concentration and utilization limits,
//! settles claims once a market outcome is finalized, and expires lapsed
//! coverage. The registry is the pool's single privileged writer, and
//! exposure counters are mutated only inside its guarded entry points.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::PolicyConfig;
use crate::domain::access::{AccessTable, Role};
use crate::domain::error::EngineError;
use crate::domain::guard::CallGuard;
use crate::domain::policy::{
    AccountId, MarketId, Policy, PolicyId, PolicyStatus,
};
use crate::domain::premium::{BASIS_BPS, PremiumEngine};
use crate::ports::certificate::CertificateIssuer;
use crate::ports::custody::AssetCustody;
use crate::ports::outcome_source::OutcomeSource;
use crate::usecases::liquidity_pool::LiquidityPool;

/// The policy registry. Owns the liquidity pool and the certificate port.
pub struct PolicyRegistry<C: AssetCustody, T: CertificateIssuer> {
    /// Identity this registry presents to the pool's role table.
    identity: AccountId,
    pool: LiquidityPool<C>,
    certificates: T,
    premium_engine: PremiumEngine,
    params: PolicyConfig,
    access: AccessTable,
    policies: HashMap<PolicyId, Policy>,
    holder_policies: HashMap<AccountId, Vec<PolicyId>>,
    market_exposure: HashMap<MarketId, Decimal>,
    holder_exposure: HashMap<AccountId, Decimal>,
    market_risk: HashMap<MarketId, u32>,
    guard: CallGuard,
}

impl<C: AssetCustody, T: CertificateIssuer> PolicyRegistry<C, T> {
    /// Create a registry around an existing pool.
    ///
    /// `identity` must match the Registry grant the pool was built with.
    pub fn new(
        identity: AccountId,
        owner: AccountId,
        pool: LiquidityPool<C>,
        certificates: T,
        premium_engine: PremiumEngine,
        params: PolicyConfig,
    ) -> Self {
        Self {
            identity,
            pool,
            certificates,
            premium_engine,
            params,
            access: AccessTable::with_owner(owner),
            policies: HashMap::new(),
            holder_policies: HashMap::new(),
            market_exposure: HashMap::new(),
            holder_exposure: HashMap::new(),
            market_risk: HashMap::new(),
            guard: CallGuard::default(),
        }
    }

    // ── Policy lifecycle ────────────────────────────────────

    /// Price-check and issue a policy to `holder`.
    ///
    /// Concentration caps are re-derived from the pool's current total
    /// liquidity at call time, never cached. The supplied premium must
    /// clear both the utilization-scaled price and the sustainability
    /// floor for the market's risk score.
    pub fn create_policy(
        &mut self,
        holder: &AccountId,
        market_id: &MarketId,
        coverage: Decimal,
        premium: Decimal,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<PolicyId, EngineError> {
        let _permit = self.guard.enter()?;

        if coverage < self.params.min_coverage || coverage > self.params.max_coverage {
            return Err(EngineError::CoverageOutOfRange {
                amount: coverage,
                min: self.params.min_coverage,
                max: self.params.max_coverage,
            });
        }
        if duration_secs < self.params.min_duration_secs
            || duration_secs > self.params.max_duration_secs
        {
            return Err(EngineError::DurationOutOfRange {
                secs: duration_secs,
                min: self.params.min_duration_secs,
                max: self.params.max_duration_secs,
            });
        }

        let total_liquidity = self.pool.pool_info().total_liquidity;
        let basis = Decimal::from(BASIS_BPS);
        let market_cap =
            total_liquidity * Decimal::from(self.params.market_concentration_bps) / basis;
        let holder_cap =
            total_liquidity * Decimal::from(self.params.holder_concentration_bps) / basis;

        let market_committed = self.market_exposure(market_id) + coverage;
        if market_committed > market_cap {
            return Err(EngineError::ConcentrationLimit { scope: "market" });
        }
        let holder_committed = self.holder_exposure(holder) + coverage;
        if holder_committed > holder_cap {
            return Err(EngineError::ConcentrationLimit { scope: "holder" });
        }

        if !self.pool.can_cover(coverage) {
            return Err(EngineError::UtilizationExceeded);
        }

        let required = self
            .premium_engine
            .price(coverage, self.pool.utilization_bps())?;
        if premium < required {
            return Err(EngineError::PremiumTooLow {
                supplied: premium,
                required,
            });
        }

        let risk = self.market_risk_bps(market_id);
        if !self.premium_engine.is_sufficient(premium, coverage, risk)? {
            let floor = self.premium_engine.sufficiency_floor(coverage, risk)?;
            return Err(EngineError::PremiumInsufficient {
                supplied: premium,
                floor,
            });
        }

        let policy_id = PolicyId::new_v4();

        // Fallible external steps come first so a collaborator failure
        // aborts before any engine state mutates.
        self.certificates.issue(policy_id, holder)?;
        self.pool
            .collect_premium(&self.identity, policy_id, holder, premium)?;
        self.pool
            .lock_coverage(&self.identity, policy_id, coverage)?;

        let policy = Policy {
            id: policy_id,
            holder: holder.clone(),
            market_id: market_id.clone(),
            coverage_amount: coverage,
            premium,
            start_time: now,
            expiry_time: now + TimeDelta::seconds(duration_secs as i64),
            status: PolicyStatus::Active,
            resolved_outcome_hash: None,
        };
        self.policies.insert(policy_id, policy);
        self.holder_policies
            .entry(holder.clone())
            .or_default()
            .push(policy_id);
        *self.market_exposure.entry(market_id.clone()).or_default() += coverage;
        *self.holder_exposure.entry(holder.clone()).or_default() += coverage;

        info!(
            policy_id = %policy_id,
            holder = %holder,
            market_id = %market_id,
            coverage = %coverage,
            premium = %premium,
            "Policy issued"
        );
        Ok(policy_id)
    }

    /// Settle an active policy against the finalized market outcome.
    ///
    /// The caller must hold the policy's certificate; the market must be
    /// resolved and the policy not yet expired.
    pub fn claim_policy(
        &mut self,
        caller: &AccountId,
        policy_id: PolicyId,
        oracle: &impl OutcomeSource,
        now: DateTime<Utc>,
    ) -> Result<Decimal, EngineError> {
        let _permit = self.guard.enter()?;

        let (holder, market_id, coverage, status, expiry_time) = {
            let policy = self
                .policies
                .get(&policy_id)
                .ok_or(EngineError::UnknownPolicy(policy_id))?;
            (
                policy.holder.clone(),
                policy.market_id.clone(),
                policy.coverage_amount,
                policy.status,
                policy.expiry_time,
            )
        };

        if self.certificates.holder_of(policy_id)? != *caller {
            return Err(EngineError::NotCertificateHolder(caller.clone()));
        }
        if status != PolicyStatus::Active {
            return Err(EngineError::PolicyNotActive(policy_id));
        }
        if now > expiry_time {
            return Err(EngineError::PolicyExpired(policy_id));
        }
        if !oracle.is_resolved(&market_id) {
            return Err(EngineError::MarketNotResolved(market_id));
        }
        let outcome = oracle
            .outcome(&market_id)
            .ok_or_else(|| EngineError::MarketNotResolved(market_id.clone()))?;

        let risk = self.market_risk_bps(&market_id);
        let payout = self.premium_engine.payout(coverage, risk)?;

        self.pool
            .pay_claim(&self.identity, policy_id, caller, payout, coverage)?;

        if let Some(policy) = self.policies.get_mut(&policy_id) {
            policy.status = PolicyStatus::Claimed;
            policy.resolved_outcome_hash = Some(outcome.outcome_hash.clone());
        }
        Self::reduce_exposure(&mut self.market_exposure, &market_id, coverage);
        Self::reduce_exposure(&mut self.holder_exposure, &holder, coverage);

        info!(
            policy_id = %policy_id,
            market_id = %market_id,
            payout = %payout,
            outcome = %outcome.outcome_hash,
            "Policy claimed"
        );
        Ok(payout)
    }

    /// Expire a lapsed policy and release its coverage commitment.
    /// Callable by anyone once the deadline has passed.
    pub fn expire_policy(
        &mut self,
        policy_id: PolicyId,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;

        let (holder, market_id, coverage) = {
            let policy = self
                .policies
                .get(&policy_id)
                .ok_or(EngineError::UnknownPolicy(policy_id))?;
            if policy.status != PolicyStatus::Active {
                return Err(EngineError::PolicyNotActive(policy_id));
            }
            if now <= policy.expiry_time {
                return Err(EngineError::PolicyNotExpired(policy_id));
            }
            (
                policy.holder.clone(),
                policy.market_id.clone(),
                policy.coverage_amount,
            )
        };

        self.pool
            .release_coverage(&self.identity, policy_id, coverage)?;

        if let Some(policy) = self.policies.get_mut(&policy_id) {
            policy.status = PolicyStatus::Expired;
        }
        Self::reduce_exposure(&mut self.market_exposure, &market_id, coverage);
        Self::reduce_exposure(&mut self.holder_exposure, &holder, coverage);

        info!(policy_id = %policy_id, market_id = %market_id, "Policy expired");
        Ok(())
    }

    // ── Administrative ──────────────────────────────────────

    /// Assign a market's risk score in basis points.
    pub fn update_market_risk(
        &mut self,
        caller: &AccountId,
        market_id: &MarketId,
        score_bps: u32,
    ) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        if score_bps > BASIS_BPS {
            return Err(EngineError::RiskScoreOutOfRange(score_bps));
        }
        self.market_risk.insert(market_id.clone(), score_bps);
        info!(market_id = %market_id, risk_bps = score_bps, "Market risk updated");
        Ok(())
    }

    // ── Read views ──────────────────────────────────────────

    /// Quote the premium currently required for `coverage`.
    pub fn quote_premium(&self, coverage: Decimal) -> Result<Decimal, EngineError> {
        self.premium_engine
            .price(coverage, self.pool.utilization_bps())
    }

    /// Look up a policy.
    pub fn policy(&self, policy_id: PolicyId) -> Option<&Policy> {
        self.policies.get(&policy_id)
    }

    /// All policy ids ever issued to `holder`.
    pub fn policies_of(&self, holder: &AccountId) -> &[PolicyId] {
        self.holder_policies
            .get(holder)
            .map_or(&[], Vec::as_slice)
    }

    /// Outstanding committed coverage on a market.
    pub fn market_exposure(&self, market_id: &MarketId) -> Decimal {
        self.market_exposure
            .get(market_id)
            .copied()
            .unwrap_or_default()
    }

    /// Outstanding committed coverage held by one account.
    pub fn holder_exposure(&self, holder: &AccountId) -> Decimal {
        self.holder_exposure.get(holder).copied().unwrap_or_default()
    }

    /// The risk score used for a market, falling back to the default.
    pub fn market_risk_bps(&self, market_id: &MarketId) -> u32 {
        self.market_risk
            .get(market_id)
            .copied()
            .unwrap_or(self.params.default_risk_bps)
    }

    /// Read access to the owned pool.
    pub fn pool(&self) -> &LiquidityPool<C> {
        &self.pool
    }

    /// Mutable access to the owned pool, for provider deposits and
    /// withdrawals and pool administration.
    pub fn pool_mut(&mut self) -> &mut LiquidityPool<C> {
        &mut self.pool
    }

    fn reduce_exposure(
        map: &mut HashMap<String, Decimal>,
        key: &str,
        amount: Decimal,
    ) {
        if let Some(exposure) = map.get_mut(key) {
            if *exposure < amount {
                warn!(key, exposure = %exposure, amount = %amount,
                    "Exposure decrement exceeds counter; clamping to zero");
            }
            *exposure = (*exposure - amount).max(Decimal::ZERO);
        }
    }
}
