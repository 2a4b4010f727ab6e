//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that domain components maintain
//! mathematical invariants across random inputs.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use polycover::config::PoolConfig;
use polycover::domain::error::CustodyError;
use polycover::domain::policy::{AccountId, PolicyId};
use polycover::domain::premium::{BASIS_BPS, PremiumEngine};
use polycover::ports::custody::AssetCustody;
use polycover::usecases::LiquidityPool;

/// Custody stub that approves every transfer; these properties are
/// about the pool's internal accounting, not the ledger.
#[derive(Clone, Copy)]
struct AcceptAll;

impl AssetCustody for AcceptAll {
    fn transfer(
        &self,
        _from: &AccountId,
        _to: &AccountId,
        _amount: Decimal,
    ) -> Result<(), CustodyError> {
        Ok(())
    }

    fn transfer_delegated(
        &self,
        _owner: &AccountId,
        _to: &AccountId,
        _amount: Decimal,
    ) -> Result<(), CustodyError> {
        Ok(())
    }
}

// ── Premium Pricing Properties ──────────────────────────────

proptest! {
    /// The effective premium rate stays inside the [3%, 20%] clamp for
    /// every coverage amount and utilization level.
    #[test]
    fn premium_rate_always_within_clamp(
        coverage in 1u64..1_000_000,
        utilization in 0u32..=BASIS_BPS,
    ) {
        let engine = PremiumEngine::default();
        let coverage = Decimal::from(coverage);
        let premium = engine.price(coverage, utilization).unwrap();
        let rate = premium / coverage;
        prop_assert!(rate >= dec!(0.03), "rate below floor: {rate}");
        prop_assert!(rate <= dec!(0.20), "rate above ceiling: {rate}");
    }

    /// Premiums never decrease as utilization rises.
    #[test]
    fn premium_monotone_in_utilization(
        coverage in 1u64..1_000_000,
        u1 in 0u32..=BASIS_BPS,
        u2 in 0u32..=BASIS_BPS,
    ) {
        let (lo, hi) = (u1.min(u2), u1.max(u2));
        let engine = PremiumEngine::default();
        let coverage = Decimal::from(coverage);
        let p_lo = engine.price(coverage, lo).unwrap();
        let p_hi = engine.price(coverage, hi).unwrap();
        prop_assert!(
            p_hi >= p_lo,
            "price must be monotone: u({lo})={p_lo} > u({hi})={p_hi}"
        );
    }

    /// Pricing scales linearly in coverage at fixed utilization.
    #[test]
    fn premium_linear_in_coverage(
        coverage in 1u64..500_000,
        utilization in 0u32..=BASIS_BPS,
    ) {
        let engine = PremiumEngine::default();
        let single = engine.price(Decimal::from(coverage), utilization).unwrap();
        let double = engine.price(Decimal::from(2 * coverage), utilization).unwrap();
        prop_assert_eq!(double, single * dec!(2));
    }
}

// ── Payout Band Properties ──────────────────────────────────

proptest! {
    /// Indemnity is always partial: inside [40%, 60%] of coverage,
    /// never full coverage.
    #[test]
    fn payout_always_inside_band(
        coverage in 1u64..1_000_000,
        risk in 0u32..=BASIS_BPS,
    ) {
        let engine = PremiumEngine::default();
        let coverage = Decimal::from(coverage);
        let payout = engine.payout(coverage, risk).unwrap();
        prop_assert!(payout >= coverage * dec!(0.40));
        prop_assert!(payout <= coverage * dec!(0.60));
        prop_assert!(payout < coverage, "indemnity must stay partial");
    }

    /// Riskier markets never pay more than safer ones.
    #[test]
    fn payout_antitone_in_risk(
        coverage in 1u64..1_000_000,
        r1 in 0u32..=BASIS_BPS,
        r2 in 0u32..=BASIS_BPS,
    ) {
        let (lo, hi) = (r1.min(r2), r1.max(r2));
        let engine = PremiumEngine::default();
        let coverage = Decimal::from(coverage);
        let pay_lo = engine.payout(coverage, lo).unwrap();
        let pay_hi = engine.payout(coverage, hi).unwrap();
        prop_assert!(
            pay_hi <= pay_lo,
            "payout must fall with risk: r({lo})={pay_lo} < r({hi})={pay_hi}"
        );
    }

    /// The sufficiency floor is exactly 30% of the payout, so a premium
    /// of the floor itself always passes and a hair under never does.
    #[test]
    fn sufficiency_floor_is_a_sharp_boundary(
        coverage in 1u64..1_000_000,
        risk in 0u32..=BASIS_BPS,
    ) {
        let engine = PremiumEngine::default();
        let coverage = Decimal::from(coverage);
        let floor = engine.sufficiency_floor(coverage, risk).unwrap();
        prop_assert_eq!(
            floor,
            engine.payout(coverage, risk).unwrap() * dec!(0.30)
        );
        prop_assert!(engine.is_sufficient(floor, coverage, risk).unwrap());
        prop_assert!(
            !engine
                .is_sufficient(floor - dec!(0.0001), coverage, risk)
                .unwrap()
        );
    }
}

// ── Share Accounting Properties ─────────────────────────────

proptest! {
    /// Share value is 1 for an empty pool and total/shares otherwise;
    /// minting at the current value never changes it.
    #[test]
    fn minting_at_current_value_preserves_share_value(
        liquidity in 1u64..10_000_000,
        shares in 1u64..10_000_000,
        deposit_shares in 1u64..1_000_000,
    ) {
        let liquidity = Decimal::from(liquidity);
        let shares = Decimal::from(shares);
        let value = PremiumEngine::share_value(liquidity, shares);

        let minted = Decimal::from(deposit_shares);
        let value_after =
            PremiumEngine::share_value(liquidity + minted * value, shares + minted);
        let diff = (value_after - value).abs();
        prop_assert!(
            diff < dec!(0.000000001),
            "share value drifted from {value} to {value_after}"
        );
    }

    /// Premium intake without minting strictly raises share value;
    /// claims without burning strictly lower it.
    #[test]
    fn premium_raises_and_claim_lowers_share_value(
        liquidity in 1_000u64..10_000_000,
        shares in 1u64..1_000_000,
        flow in 1u64..1_000,
    ) {
        let liquidity = Decimal::from(liquidity);
        let shares = Decimal::from(shares);
        let flow = Decimal::from(flow);
        let value = PremiumEngine::share_value(liquidity, shares);

        let after_premium = PremiumEngine::share_value(liquidity + flow, shares);
        prop_assert!(after_premium > value);

        let after_claim = PremiumEngine::share_value(liquidity - flow.min(liquidity - Decimal::ONE), shares);
        prop_assert!(after_claim <= value);
    }
}

// ── Pool Conservation Properties ────────────────────────────

proptest! {
    /// Across any history of multi-provider deposits, withdrawals, and
    /// premium intake, the sum of all provider positions equals the
    /// pool's `total_shares` after every step — including steps that
    /// were rejected.
    #[test]
    fn provider_shares_sum_to_total_across_histories(
        ops in prop::collection::vec(
            (0usize..4, 0u8..3, 1u64..10_000_000),
            1..50,
        ),
    ) {
        let providers = ["p0", "p1", "p2", "p3"];
        let mut pool = LiquidityPool::new(
            AcceptAll,
            "pool-escrow".to_string(),
            "admin".to_string(),
            "registry".to_string(),
            &PoolConfig::default(),
        );
        let now = Utc::now();

        for (who, kind, raw) in ops {
            let caller = providers[who].to_string();
            // Cent-scale amounts keep share values non-terminating often.
            let amount = Decimal::from(raw) / dec!(100);
            let _ = match kind {
                0 => pool.deposit(&caller, amount, now).map(|_| ()),
                1 => pool
                    .withdraw(&caller, amount.floor().max(Decimal::ONE), now)
                    .map(|_| ()),
                _ => pool.collect_premium(
                    &"registry".to_string(),
                    PolicyId::new_v4(),
                    &caller,
                    amount,
                ),
            };

            let minted: Decimal = providers
                .iter()
                .filter_map(|p| pool.provider_info(&(*p).to_string()))
                .map(|position| position.shares)
                .sum();
            prop_assert_eq!(minted, pool.pool_info().total_shares);
        }
    }
}

// ── Bond Arithmetic Properties ──────────────────────────────

proptest! {
    /// The arbitration split conserves the escrowed stake: the winner's
    /// payout plus the treasury cut equals both bonds exactly.
    #[test]
    fn bond_split_conserves_escrow(bond_units in 1u64..10_000_000) {
        let bond = Decimal::from(bond_units) / dec!(100);
        let winner_half = bond / Decimal::TWO;
        let treasury_half = bond - winner_half;
        let winner_payout = bond + winner_half;
        prop_assert_eq!(winner_payout + treasury_half, bond * dec!(2));
        // The winner always nets a strict profit over their stake.
        prop_assert!(winner_payout > bond);
    }
}
