//! Active header strategy registry
//!
//! Holds the one encoding strategy a store instance writes with. The
//! registry is an owned value shared through `Arc`, not a process-wide
//! static, so two stores in one process can run different strategies.
//!
//! Switching strategies is an explicit `unregister` followed by `register`.
//! Both take the write lock only for the transition; encode and decode read
//! the slot once at the start of the call and never hold the lock while
//! working, so an in-flight call finishes with the strategy it started with.
//!
//! Uses parking_lot::RwLock to avoid lock poisoning.

use crate::error::{HeaderCodecError, Result};
use crate::strategy::EncodingStrategy;
use parking_lot::RwLock;
use tracing::info;

/// Slot holding the active encoding strategy.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    active: RwLock<Option<EncodingStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `strategy` already registered
    pub fn with_strategy(strategy: EncodingStrategy) -> Self {
        Self {
            active: RwLock::new(Some(strategy)),
        }
    }

    /// Make `strategy` the active strategy.
    ///
    /// # Errors
    ///
    /// `AlreadyRegistered` if a strategy is active, even the same one.
    pub fn register(&self, strategy: EncodingStrategy) -> Result<()> {
        let mut active = self.active.write();
        if let Some(current) = *active {
            return Err(HeaderCodecError::AlreadyRegistered { active: current });
        }
        *active = Some(strategy);
        info!(target: "strata::codec", strategy = %strategy, "Header encoding strategy registered");
        Ok(())
    }

    /// Clear the active strategy, returning what was active.
    pub fn unregister(&self) -> Option<EncodingStrategy> {
        let previous = self.active.write().take();
        if let Some(strategy) = previous {
            info!(target: "strata::codec", strategy = %strategy, "Header encoding strategy unregistered");
        }
        previous
    }

    /// The active strategy, if any
    pub fn current(&self) -> Option<EncodingStrategy> {
        *self.active.read()
    }

    /// The active strategy, or `NoStrategyRegistered`
    pub fn require(&self) -> Result<EncodingStrategy> {
        self.current().ok_or(HeaderCodecError::NoStrategyRegistered)
    }
}
