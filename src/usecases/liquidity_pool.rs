//! Liquidity Pool - Share-Based Risk Capital Accounting
//!
//! Providers deposit assets for proportional pool shares; premiums flow in
//! and claims flow out against the same share base. Coverage commitments
//! lock liquidity so withdrawals can never strand an outstanding policy.
//!
//! Privileged mutations (premium intake, coverage locks, claim payouts)
//! are restricted to the Registry role; the policy registry is the pool's
//! single privileged writer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::domain::access::{AccessTable, Role};
use crate::domain::error::EngineError;
use crate::domain::guard::CallGuard;
use crate::domain::policy::{AccountId, PolicyId, PoolState, ProviderPosition};
use crate::domain::premium::{BASIS_BPS, PremiumEngine};
use crate::ports::custody::AssetCustody;

/// The shared risk-capital pool.
pub struct LiquidityPool<C: AssetCustody> {
    state: PoolState,
    providers: HashMap<AccountId, ProviderPosition>,
    access: AccessTable,
    custody: C,
    /// Escrow account the custody collaborator holds pool assets under.
    pool_account: AccountId,
    /// Maximum utilization in basis points (boundary inclusive).
    utilization_cap_bps: u32,
    guard: CallGuard,
}

impl<C: AssetCustody> LiquidityPool<C> {
    /// Create an empty, active pool.
    ///
    /// `registry` is the identity granted the Registry role; it is the only
    /// caller allowed to collect premiums, lock coverage, and pay claims.
    pub fn new(
        custody: C,
        pool_account: AccountId,
        owner: AccountId,
        registry: AccountId,
        config: &PoolConfig,
    ) -> Self {
        let mut access = AccessTable::with_owner(owner);
        access.grant(Role::Registry, registry);
        Self {
            state: PoolState::empty(),
            providers: HashMap::new(),
            access,
            custody,
            pool_account,
            utilization_cap_bps: config.utilization_cap_bps,
            guard: CallGuard::default(),
        }
    }

    // ── Provider entry points ───────────────────────────────

    /// Deposit `amount` and mint shares at the current share value.
    ///
    /// Shares are whole units; a deposit smaller than one share value is
    /// rejected rather than rounded away.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, EngineError> {
        let _permit = self.guard.enter()?;
        if !self.state.active {
            return Err(EngineError::PoolPaused);
        }
        if amount <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }

        let share_value =
            PremiumEngine::share_value(self.state.total_liquidity, self.state.total_shares);
        let shares = (amount / share_value).floor();
        if shares.is_zero() {
            return Err(EngineError::SharesTooSmall);
        }

        self.custody
            .transfer_delegated(caller, &self.pool_account, amount)?;

        let position = self
            .providers
            .entry(caller.clone())
            .or_insert_with(|| ProviderPosition {
                shares: Decimal::ZERO,
                deposited_amount: Decimal::ZERO,
                last_update_time: now,
            });
        position.shares += shares;
        position.deposited_amount += amount;
        position.last_update_time = now;

        self.state.total_shares += shares;
        self.state.total_liquidity += amount;
        self.state.available_liquidity += amount;

        info!(
            provider = %caller,
            amount = %amount,
            shares = %shares,
            total_liquidity = %self.state.total_liquidity,
            "Deposit accepted"
        );
        Ok(shares)
    }

    /// Burn `shares` and pay out their current value.
    ///
    /// Rejected if the value exceeds unlocked liquidity; coverage
    /// commitments are never stranded by a withdrawal.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        shares: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, EngineError> {
        let _permit = self.guard.enter()?;
        if !self.state.active {
            return Err(EngineError::PoolPaused);
        }
        if shares <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }

        let held = self.providers.get(caller).map_or(Decimal::ZERO, |p| p.shares);
        if held < shares {
            return Err(EngineError::InsufficientShares {
                have: held,
                need: shares,
            });
        }

        // Multiply before dividing: pricing the quotient first rounds at
        // 28 digits and can land one ulp past available liquidity,
        // rejecting a legitimate full withdrawal. `total_shares` is
        // nonzero here since the caller holds at least `shares`.
        let amount = shares * self.state.total_liquidity / self.state.total_shares;
        if amount > self.state.available_liquidity {
            return Err(EngineError::LiquidityLocked {
                amount,
                available: self.state.available_liquidity,
            });
        }

        self.custody.transfer(&self.pool_account, caller, amount)?;

        if let Some(position) = self.providers.get_mut(caller) {
            position.shares -= shares;
            position.last_update_time = now;
        }
        self.state.total_shares -= shares;
        self.state.total_liquidity -= amount;
        self.state.available_liquidity -= amount;

        info!(
            provider = %caller,
            shares = %shares,
            amount = %amount,
            "Withdrawal paid"
        );
        Ok(amount)
    }

    // ── Registry-restricted entry points ────────────────────

    /// Pull a policy premium from `from` into the pool.
    pub fn collect_premium(
        &mut self,
        caller: &AccountId,
        ref_id: PolicyId,
        from: &AccountId,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Registry, caller)?;
        if !self.state.active {
            return Err(EngineError::PoolPaused);
        }
        if amount <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }

        self.custody
            .transfer_delegated(from, &self.pool_account, amount)?;

        self.state.total_liquidity += amount;
        self.state.available_liquidity += amount;
        self.state.total_premiums += amount;

        info!(policy_id = %ref_id, premium = %amount, "Premium collected");
        Ok(())
    }

    /// Commit `amount` of liquidity to an outstanding policy.
    pub fn lock_coverage(
        &mut self,
        caller: &AccountId,
        ref_id: PolicyId,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Registry, caller)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }
        if amount > self.state.available_liquidity {
            return Err(EngineError::InsufficientLiquidity {
                amount,
                available: self.state.available_liquidity,
            });
        }
        self.state.available_liquidity -= amount;
        debug!(policy_id = %ref_id, amount = %amount, "Coverage locked");
        Ok(())
    }

    /// Release a coverage commitment back to available liquidity.
    pub fn release_coverage(
        &mut self,
        caller: &AccountId,
        ref_id: PolicyId,
        amount: Decimal,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Registry, caller)?;
        let released = amount.min(self.state.locked());
        if released < amount {
            warn!(policy_id = %ref_id, amount = %amount, locked = %self.state.locked(),
                "Release exceeds locked liquidity; clamping");
        }
        self.state.available_liquidity += released;
        debug!(policy_id = %ref_id, amount = %released, "Coverage released");
        Ok(())
    }

    /// Pay a claim to `beneficiary`, releasing the policy's remaining
    /// coverage commitment in the same step.
    ///
    /// Callable while the pool is paused: a paused pool still owes its
    /// already-incurred obligations.
    pub fn pay_claim(
        &mut self,
        caller: &AccountId,
        ref_id: PolicyId,
        beneficiary: &AccountId,
        amount: Decimal,
        coverage_release: Decimal,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Registry, caller)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::ZeroAmount);
        }

        let release = coverage_release.min(self.state.locked());
        let effective_available = self.state.available_liquidity + release;
        if amount > effective_available {
            return Err(EngineError::InsufficientLiquidity {
                amount,
                available: effective_available,
            });
        }

        self.custody
            .transfer(&self.pool_account, beneficiary, amount)?;

        self.state.available_liquidity = effective_available - amount;
        self.state.total_liquidity -= amount;
        self.state.total_claims += amount;

        info!(
            policy_id = %ref_id,
            beneficiary = %beneficiary,
            payout = %amount,
            total_claims = %self.state.total_claims,
            "Claim paid"
        );
        Ok(())
    }

    // ── Administrative entry points ─────────────────────────

    /// Pause deposits, withdrawals, and premium intake. Claims stay open.
    pub fn pause(&mut self, caller: &AccountId) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        self.state.active = false;
        warn!(by = %caller, "Pool paused");
        Ok(())
    }

    /// Resume normal operation.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        self.state.active = true;
        info!(by = %caller, "Pool unpaused");
        Ok(())
    }

    // ── Read views ──────────────────────────────────────────

    /// Whether the pool can take on `coverage` of new commitment:
    /// within available liquidity and at most the utilization cap
    /// (boundary inclusive).
    pub fn can_cover(&self, coverage: Decimal) -> bool {
        if coverage > self.state.available_liquidity {
            return false;
        }
        let projected = self.state.locked() + coverage;
        projected * Decimal::from(BASIS_BPS)
            <= self.state.total_liquidity * Decimal::from(self.utilization_cap_bps)
    }

    /// Current utilization in basis points; 0 for an empty pool.
    pub fn utilization_bps(&self) -> u32 {
        if self.state.total_liquidity.is_zero() {
            return 0;
        }
        let bps = self.state.locked() * Decimal::from(BASIS_BPS) / self.state.total_liquidity;
        bps.floor().to_u32().unwrap_or(BASIS_BPS).min(BASIS_BPS)
    }

    /// Snapshot of the aggregate pool state.
    pub fn pool_info(&self) -> PoolState {
        self.state.clone()
    }

    /// A provider's position, if one was ever created.
    pub fn provider_info(&self, provider: &AccountId) -> Option<&ProviderPosition> {
        self.providers.get(provider)
    }
}
