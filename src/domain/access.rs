//! Role-based capability table for privileged entry points.
//!
//! Each component consults an explicit grant table per call instead of
//! baking caller checks into the call graph. Grants are mutated only
//! through Owner-gated administrative operations.

use std::collections::{HashMap, HashSet};

use crate::domain::error::EngineError;
use crate::domain::policy::AccountId;

/// Capabilities a caller can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Administrative identity: pause/unpause, grant management.
    Owner,
    /// The policy registry: sole caller of privileged pool mutations.
    Registry,
    /// Authorized outcome proposer.
    Resolver,
    /// Dispute arbitrator.
    Arbitrator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Registry => write!(f, "registry"),
            Self::Resolver => write!(f, "resolver"),
            Self::Arbitrator => write!(f, "arbitrator"),
        }
    }
}

/// Explicit role → accounts grant table.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    grants: HashMap<Role, HashSet<AccountId>>,
}

impl AccessTable {
    /// A table with a single Owner grant.
    pub fn with_owner(owner: AccountId) -> Self {
        let mut table = Self::default();
        table.grant(Role::Owner, owner);
        table
    }

    /// Grant `role` to `account`.
    pub fn grant(&mut self, role: Role, account: AccountId) {
        self.grants.entry(role).or_default().insert(account);
    }

    /// Revoke `role` from `account`. Revoking an absent grant is a no-op.
    pub fn revoke(&mut self, role: Role, account: &AccountId) {
        if let Some(accounts) = self.grants.get_mut(&role) {
            accounts.remove(account);
        }
    }

    /// Whether `account` holds `role`.
    pub fn holds(&self, role: Role, account: &AccountId) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|accounts| accounts.contains(account))
    }

    /// Number of accounts holding `role`.
    pub fn count(&self, role: Role) -> usize {
        self.grants.get(&role).map_or(0, HashSet::len)
    }

    /// Reject the call unless `caller` holds `role`.
    pub fn require(&self, role: Role, caller: &AccountId) -> Result<(), EngineError> {
        if self.holds(role, caller) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized {
                caller: caller.clone(),
                role: role.to_string(),
            })
        }
    }
}
