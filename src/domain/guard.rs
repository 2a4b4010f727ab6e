//! Non-reentrant call guard.
//!
//! Every balance-mutating entry point acquires the component's guard for
//! its duration. A second in-flight invocation is rejected outright, never
//! blocked; the permit releases on every exit path, including failure.

use std::sync::{Mutex, MutexGuard};

use crate::domain::error::EngineError;

/// Scoped mutex guarding a component's mutating entry points.
#[derive(Debug, Default)]
pub struct CallGuard {
    lock: Mutex<()>,
}

/// Proof of entry; dropping it releases the guard.
#[must_use]
pub struct CallPermit<'a>(#[allow(dead_code)] MutexGuard<'a, ()>);

impl CallGuard {
    /// Acquire the guard, rejecting with `ReentrantCall` if it is held.
    pub fn enter(&self) -> Result<CallPermit<'_>, EngineError> {
        self.lock
            .try_lock()
            .map(CallPermit)
            .map_err(|_| EngineError::ReentrantCall)
    }
}
