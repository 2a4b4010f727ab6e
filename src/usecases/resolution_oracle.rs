//! Resolution Oracle - Bonded Propose/Dispute/Arbitrate Protocol
//!
//! Resolves off-chain facts with economic security. A resolver posts a
//! bonded outcome proposal; anyone may challenge it inside a fixed window
//! by posting an equal bond; a quorum of arbitrators settles challenged
//! markets. Equal stakes plus 50/50 bond-splitting make both baseless
//! proposals and baseless disputes costly: the winner's net gain (half
//! the loser's stake) is the incentive to dispute only when confident.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::OracleConfig;
use crate::domain::access::{AccessTable, Role};
use crate::domain::error::EngineError;
use crate::domain::guard::CallGuard;
use crate::domain::policy::{AccountId, MarketId, OutcomeHash};
use crate::domain::premium::BASIS_BPS;
use crate::domain::resolution::{Dispute, MarketOutcome, MarketResolution, Proposal};
use crate::ports::custody::AssetCustody;
use crate::ports::outcome_source::OutcomeSource;

/// The outcome-resolution protocol instance.
pub struct ResolutionOracle<C: AssetCustody> {
    markets: HashMap<MarketId, MarketResolution>,
    access: AccessTable,
    custody: C,
    /// Account bonds are escrowed under while a market is open.
    escrow_account: AccountId,
    /// Destination of the losing side's forfeited half-bond.
    treasury_account: AccountId,
    params: OracleConfig,
    guard: CallGuard,
}

impl<C: AssetCustody> ResolutionOracle<C> {
    /// Create an oracle with empty resolver and arbitrator sets.
    pub fn new(
        custody: C,
        escrow_account: AccountId,
        treasury_account: AccountId,
        owner: AccountId,
        params: OracleConfig,
    ) -> Self {
        Self {
            markets: HashMap::new(),
            access: AccessTable::with_owner(owner),
            custody,
            escrow_account,
            treasury_account,
            params,
            guard: CallGuard::default(),
        }
    }

    /// Bond required for a proposal declaring `exposure` at stake.
    pub fn required_bond(&self, exposure: Decimal) -> Decimal {
        let scaled = exposure * Decimal::from(self.params.bond_rate_bps)
            / Decimal::from(BASIS_BPS);
        scaled.max(self.params.min_bond)
    }

    // ── Protocol entry points ───────────────────────────────

    /// Post a bonded outcome proposal and open the dispute window.
    pub fn propose(
        &mut self,
        caller: &AccountId,
        market_id: &MarketId,
        outcome_hash: OutcomeHash,
        exposure: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Resolver, caller)?;

        match self.markets.get(market_id) {
            None => {}
            Some(MarketResolution::Resolved(_)) => {
                return Err(EngineError::AlreadyResolved(market_id.clone()));
            }
            Some(_) => return Err(EngineError::AlreadyProposed(market_id.clone())),
        }

        let bond = self.required_bond(exposure);
        self.custody
            .transfer_delegated(caller, &self.escrow_account, bond)?;

        self.markets.insert(
            market_id.clone(),
            MarketResolution::Proposed(Proposal {
                proposer: caller.clone(),
                outcome_hash: outcome_hash.clone(),
                proposed_at: now,
                bond,
            }),
        );

        info!(
            market_id = %market_id,
            proposer = %caller,
            outcome = %outcome_hash,
            bond = %bond,
            "Outcome proposed"
        );
        Ok(())
    }

    /// Challenge an open proposal with an equal bond.
    pub fn dispute(
        &mut self,
        caller: &AccountId,
        market_id: &MarketId,
        counter_hash: OutcomeHash,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let _permit = self.guard.enter()?;

        let state = self
            .markets
            .get(market_id)
            .ok_or_else(|| EngineError::NotProposed(market_id.clone()))?;
        let proposal = match state {
            MarketResolution::Proposed(p) => p,
            MarketResolution::Disputed { .. } => {
                return Err(EngineError::NotProposed(market_id.clone()));
            }
            MarketResolution::Resolved(_) => {
                return Err(EngineError::AlreadyResolved(market_id.clone()));
            }
        };
        if now > self.window_deadline(proposal) {
            return Err(EngineError::DisputeWindowClosed(market_id.clone()));
        }
        if counter_hash == proposal.outcome_hash {
            return Err(EngineError::IdenticalOutcome);
        }

        // Symmetric stake: the disputer matches the proposer's bond.
        let bond = proposal.bond;
        self.custody
            .transfer_delegated(caller, &self.escrow_account, bond)?;

        let state = self
            .markets
            .remove(market_id)
            .ok_or_else(|| EngineError::NotProposed(market_id.clone()))?;
        let disputed = state.into_disputed(
            market_id,
            Dispute {
                disputer: caller.clone(),
                counter_hash: counter_hash.clone(),
                disputed_at: now,
                bond,
            },
        )?;
        self.markets.insert(market_id.clone(), disputed);

        warn!(
            market_id = %market_id,
            disputer = %caller,
            counter_outcome = %counter_hash,
            bond = %bond,
            "Proposal disputed"
        );
        Ok(())
    }

    /// Finalize an uncontested proposal after its window elapses.
    /// Callable by anyone; returns the proposer's bond.
    pub fn finalize(
        &mut self,
        market_id: &MarketId,
        now: DateTime<Utc>,
    ) -> Result<MarketOutcome, EngineError> {
        let _permit = self.guard.enter()?;

        let (proposer, bond) = {
            let state = self
                .markets
                .get(market_id)
                .ok_or_else(|| EngineError::NotProposed(market_id.clone()))?;
            let proposal = match state {
                MarketResolution::Proposed(p) => p,
                MarketResolution::Disputed { .. } => {
                    return Err(EngineError::NotProposed(market_id.clone()));
                }
                MarketResolution::Resolved(_) => {
                    return Err(EngineError::AlreadyResolved(market_id.clone()));
                }
            };
            if now <= self.window_deadline(proposal) {
                return Err(EngineError::DisputeWindowOpen(market_id.clone()));
            }
            (proposal.proposer.clone(), proposal.bond)
        };

        self.custody
            .transfer(&self.escrow_account, &proposer, bond)?;

        let state = self
            .markets
            .remove(market_id)
            .ok_or_else(|| EngineError::NotProposed(market_id.clone()))?;
        let resolved = state.into_finalized(market_id, now)?;
        let outcome = resolved
            .outcome()
            .cloned()
            .ok_or_else(|| EngineError::NotProposed(market_id.clone()))?;
        self.markets.insert(market_id.clone(), resolved);

        info!(
            market_id = %market_id,
            outcome = %outcome.outcome_hash,
            "Market finalized without dispute"
        );
        Ok(outcome)
    }

    /// Arbitrate a disputed market.
    ///
    /// `final_hash` must equal one of the two submitted hashes. The
    /// winning side receives its own bond plus half the loser's bond;
    /// the remaining half goes to the treasury.
    pub fn resolve_dispute(
        &mut self,
        caller: &AccountId,
        market_id: &MarketId,
        final_hash: &OutcomeHash,
        now: DateTime<Utc>,
    ) -> Result<MarketOutcome, EngineError> {
        let _permit = self.guard.enter()?;
        self.access.require(Role::Arbitrator, caller)?;
        let have = self.access.count(Role::Arbitrator);
        if have < self.params.min_arbitrators {
            return Err(EngineError::ArbitrationUnavailable {
                have,
                need: self.params.min_arbitrators,
            });
        }

        let (winner, winner_bond, loser_bond) = {
            let state = self
                .markets
                .get(market_id)
                .ok_or_else(|| EngineError::NotDisputed(market_id.clone()))?;
            let (proposal, dispute) = match state {
                MarketResolution::Disputed { proposal, dispute } => (proposal, dispute),
                MarketResolution::Resolved(_) => {
                    return Err(EngineError::AlreadyResolved(market_id.clone()));
                }
                MarketResolution::Proposed(_) => {
                    return Err(EngineError::NotDisputed(market_id.clone()));
                }
            };
            if *final_hash == proposal.outcome_hash {
                (proposal.proposer.clone(), proposal.bond, dispute.bond)
            } else if *final_hash == dispute.counter_hash {
                (dispute.disputer.clone(), dispute.bond, proposal.bond)
            } else {
                return Err(EngineError::InvalidOutcome(final_hash.clone()));
            }
        };

        let winner_half = loser_bond / Decimal::TWO;
        let treasury_half = loser_bond - winner_half;
        self.custody
            .transfer(&self.escrow_account, &winner, winner_bond + winner_half)?;
        self.custody
            .transfer(&self.escrow_account, &self.treasury_account, treasury_half)?;

        let state = self
            .markets
            .remove(market_id)
            .ok_or_else(|| EngineError::NotDisputed(market_id.clone()))?;
        let resolved = state.into_arbitrated(market_id, final_hash, now)?;
        let outcome = resolved
            .outcome()
            .cloned()
            .ok_or_else(|| EngineError::NotDisputed(market_id.clone()))?;
        self.markets.insert(market_id.clone(), resolved);

        info!(
            market_id = %market_id,
            winner = %winner,
            outcome = %outcome.outcome_hash,
            winner_payout = %(winner_bond + winner_half),
            treasury_cut = %treasury_half,
            "Dispute arbitrated"
        );
        Ok(outcome)
    }

    // ── Administrative entry points ─────────────────────────

    /// Authorize an account to post proposals.
    pub fn add_resolver(
        &mut self,
        caller: &AccountId,
        resolver: AccountId,
    ) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        info!(resolver = %resolver, "Resolver added");
        self.access.grant(Role::Resolver, resolver);
        Ok(())
    }

    /// Revoke proposal rights.
    pub fn remove_resolver(
        &mut self,
        caller: &AccountId,
        resolver: &AccountId,
    ) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        self.access.revoke(Role::Resolver, resolver);
        info!(resolver = %resolver, "Resolver removed");
        Ok(())
    }

    /// Seat an arbitrator.
    pub fn add_arbitrator(
        &mut self,
        caller: &AccountId,
        arbitrator: AccountId,
    ) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        info!(arbitrator = %arbitrator, "Arbitrator added");
        self.access.grant(Role::Arbitrator, arbitrator);
        Ok(())
    }

    /// Unseat an arbitrator.
    pub fn remove_arbitrator(
        &mut self,
        caller: &AccountId,
        arbitrator: &AccountId,
    ) -> Result<(), EngineError> {
        self.access.require(Role::Owner, caller)?;
        self.access.revoke(Role::Arbitrator, arbitrator);
        info!(arbitrator = %arbitrator, "Arbitrator removed");
        Ok(())
    }

    // ── Read views ──────────────────────────────────────────

    /// The open proposal for a market, if any.
    pub fn proposal(&self, market_id: &MarketId) -> Option<&Proposal> {
        self.markets.get(market_id).and_then(MarketResolution::proposal)
    }

    /// The open dispute for a market, if any.
    pub fn dispute_info(&self, market_id: &MarketId) -> Option<&Dispute> {
        self.markets.get(market_id).and_then(MarketResolution::dispute)
    }

    /// Full resolution state for a market, if any activity exists.
    pub fn resolution_state(&self, market_id: &MarketId) -> Option<&MarketResolution> {
        self.markets.get(market_id)
    }

    fn window_deadline(&self, proposal: &Proposal) -> DateTime<Utc> {
        proposal.proposed_at + TimeDelta::seconds(self.params.dispute_window_secs as i64)
    }
}

impl<C: AssetCustody> OutcomeSource for ResolutionOracle<C> {
    fn is_resolved(&self, market_id: &MarketId) -> bool {
        matches!(
            self.markets.get(market_id),
            Some(MarketResolution::Resolved(_))
        )
    }

    fn outcome(&self, market_id: &MarketId) -> Option<MarketOutcome> {
        self.markets
            .get(market_id)
            .and_then(MarketResolution::outcome)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::ports::custody::MockAssetCustody;
    use rust_decimal_macros::dec;

    fn oracle() -> ResolutionOracle<MockAssetCustody> {
        let mut custody = MockAssetCustody::new();
        custody.expect_transfer_delegated().returning(|_, _, _| Ok(()));
        custody.expect_transfer().returning(|_, _, _| Ok(()));
        let mut oracle = ResolutionOracle::new(
            custody,
            "oracle-escrow".to_string(),
            "treasury".to_string(),
            "admin".to_string(),
            OracleConfig::default(),
        );
        let admin = "admin".to_string();
        oracle.add_resolver(&admin, "resolver".to_string()).unwrap();
        for arb in ["arb1", "arb2", "arb3"] {
            oracle.add_arbitrator(&admin, arb.to_string()).unwrap();
        }
        oracle
    }

    fn market() -> MarketId {
        "market-1".to_string()
    }

    #[test]
    fn test_required_bond_floor_and_rate() {
        let oracle = oracle();
        // 10% of exposure once above the fixed minimum.
        assert_eq!(oracle.required_bond(dec!(1_000_000)), dec!(100_000));
        // Small exposures fall back to the minimum bond.
        assert_eq!(oracle.required_bond(dec!(50)), dec!(100));
    }

    #[test]
    fn test_propose_requires_resolver_role() {
        let mut oracle = oracle();
        let err = oracle
            .propose(
                &"mallory".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1000),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_double_propose_rejected() {
        let mut oracle = oracle();
        let resolver = "resolver".to_string();
        let now = Utc::now();
        oracle
            .propose(&resolver, &market(), "0xaa".to_string(), dec!(1000), now)
            .unwrap();
        let err = oracle
            .propose(&resolver, &market(), "0xbb".to_string(), dec!(1000), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyProposed(_)));
    }

    #[test]
    fn test_finalize_after_window() {
        let mut oracle = oracle();
        let resolver = "resolver".to_string();
        let now = Utc::now();
        oracle
            .propose(&resolver, &market(), "0xaa".to_string(), dec!(1000), now)
            .unwrap();

        // Window still open.
        let err = oracle.finalize(&market(), now).unwrap_err();
        assert!(matches!(err, EngineError::DisputeWindowOpen(_)));
        assert_eq!(err.kind(), ErrorKind::TemporalViolation);

        let later = now + TimeDelta::hours(25);
        let outcome = oracle.finalize(&market(), later).unwrap();
        assert_eq!(outcome.outcome_hash, "0xaa");
        assert!(oracle.is_resolved(&market()));
    }

    #[test]
    fn test_dispute_inside_window_only() {
        let mut oracle = oracle();
        let resolver = "resolver".to_string();
        let now = Utc::now();
        oracle
            .propose(&resolver, &market(), "0xaa".to_string(), dec!(1000), now)
            .unwrap();

        let late = now + TimeDelta::hours(25);
        let err = oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), late)
            .unwrap_err();
        assert!(matches!(err, EngineError::DisputeWindowClosed(_)));

        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();
        assert!(oracle.dispute_info(&market()).is_some());
        // Disputer's bond matches the proposer's.
        assert_eq!(oracle.dispute_info(&market()).unwrap().bond, dec!(100));
    }

    #[test]
    fn test_dispute_identical_hash_rejected() {
        let mut oracle = oracle();
        let now = Utc::now();
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1000),
                now,
            )
            .unwrap();
        let err = oracle
            .dispute(&"bob".to_string(), &market(), "0xaa".to_string(), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::IdenticalOutcome));
    }

    #[test]
    fn test_arbitration_requires_quorum() {
        let mut custody = MockAssetCustody::new();
        custody.expect_transfer_delegated().returning(|_, _, _| Ok(()));
        custody.expect_transfer().returning(|_, _, _| Ok(()));
        let mut oracle = ResolutionOracle::new(
            custody,
            "oracle-escrow".to_string(),
            "treasury".to_string(),
            "admin".to_string(),
            OracleConfig::default(),
        );
        let admin = "admin".to_string();
        oracle.add_resolver(&admin, "resolver".to_string()).unwrap();
        oracle.add_arbitrator(&admin, "arb1".to_string()).unwrap();

        let now = Utc::now();
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1000),
                now,
            )
            .unwrap();
        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();

        let err = oracle
            .resolve_dispute(&"arb1".to_string(), &market(), &"0xaa".to_string(), now)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::ArbitrationUnavailable { have: 1, need: 3 }
        ));
    }

    #[test]
    fn test_arbitration_rejects_third_hash() {
        let mut oracle = oracle();
        let now = Utc::now();
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1000),
                now,
            )
            .unwrap();
        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();
        let err = oracle
            .resolve_dispute(&"arb1".to_string(), &market(), &"0xcc".to_string(), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOutcome(_)));
    }

    #[test]
    fn test_resolved_market_is_immutable() {
        let mut oracle = oracle();
        let resolver = "resolver".to_string();
        let now = Utc::now();
        oracle
            .propose(&resolver, &market(), "0xaa".to_string(), dec!(1000), now)
            .unwrap();
        let later = now + TimeDelta::hours(25);
        oracle.finalize(&market(), later).unwrap();

        let err = oracle
            .propose(&resolver, &market(), "0xbb".to_string(), dec!(1000), later)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyResolved(_)));
        let err = oracle.finalize(&market(), later).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyResolved(_)));
        let err = oracle
            .resolve_dispute(&"arb1".to_string(), &market(), &"0xaa".to_string(), later)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyResolved(_)));
    }

    #[test]
    fn test_bond_split_pays_winner_and_treasury() {
        // Track transfers out of escrow precisely.
        let mut custody = MockAssetCustody::new();
        custody.expect_transfer_delegated().returning(|_, _, _| Ok(()));
        custody
            .expect_transfer()
            .withf(|_, to, amount| *to == "resolver" && *amount == dec!(150_000))
            .times(1)
            .returning(|_, _, _| Ok(()));
        custody
            .expect_transfer()
            .withf(|_, to, amount| *to == "treasury" && *amount == dec!(50_000))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut oracle = ResolutionOracle::new(
            custody,
            "oracle-escrow".to_string(),
            "treasury".to_string(),
            "admin".to_string(),
            OracleConfig::default(),
        );
        let admin = "admin".to_string();
        oracle.add_resolver(&admin, "resolver".to_string()).unwrap();
        for arb in ["arb1", "arb2", "arb3"] {
            oracle.add_arbitrator(&admin, arb.to_string()).unwrap();
        }

        let now = Utc::now();
        // 10% of 1,000,000 exposure -> 100,000 bond each side.
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1_000_000),
                now,
            )
            .unwrap();
        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();

        let outcome = oracle
            .resolve_dispute(&"arb1".to_string(), &market(), &"0xaa".to_string(), now)
            .unwrap();
        assert_eq!(outcome.outcome_hash, "0xaa");
        assert!(oracle.is_resolved(&market()));
    }

    #[test]
    fn test_bond_split_when_disputer_wins() {
        let mut custody = MockAssetCustody::new();
        custody.expect_transfer_delegated().returning(|_, _, _| Ok(()));
        custody
            .expect_transfer()
            .withf(|_, to, amount| *to == "bob" && *amount == dec!(150_000))
            .times(1)
            .returning(|_, _, _| Ok(()));
        custody
            .expect_transfer()
            .withf(|_, to, amount| *to == "treasury" && *amount == dec!(50_000))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut oracle = ResolutionOracle::new(
            custody,
            "oracle-escrow".to_string(),
            "treasury".to_string(),
            "admin".to_string(),
            OracleConfig::default(),
        );
        let admin = "admin".to_string();
        oracle.add_resolver(&admin, "resolver".to_string()).unwrap();
        for arb in ["arb1", "arb2", "arb3"] {
            oracle.add_arbitrator(&admin, arb.to_string()).unwrap();
        }

        let now = Utc::now();
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1_000_000),
                now,
            )
            .unwrap();
        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();

        let outcome = oracle
            .resolve_dispute(&"arb2".to_string(), &market(), &"0xbb".to_string(), now)
            .unwrap();
        assert_eq!(outcome.outcome_hash, "0xbb");
    }

    #[test]
    fn test_remove_arbitrator_breaks_quorum() {
        let mut oracle = oracle();
        let admin = "admin".to_string();
        let now = Utc::now();
        oracle
            .propose(
                &"resolver".to_string(),
                &market(),
                "0xaa".to_string(),
                dec!(1000),
                now,
            )
            .unwrap();
        oracle
            .dispute(&"bob".to_string(), &market(), "0xbb".to_string(), now)
            .unwrap();
        oracle.remove_arbitrator(&admin, &"arb3".to_string()).unwrap();

        let err = oracle
            .resolve_dispute(&"arb1".to_string(), &market(), &"0xaa".to_string(), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::ArbitrationUnavailable { .. }));
    }
}
