//! Shared resource pools and tiered ability bundles.
//!
//! A pool is one finite counter on a combatant backing several selectable
//! abilities of increasing cost tier. Tier K costs K points, not 1, and each
//! tier is individually gated by a secondary attribute check. Bundles bind
//! the tier abilities to their pool so menus and eligibility logic can
//! enumerate "everything drawn from this pool" in one place.

use crate::ability::{AbilityId, UsePredicate};
use crate::error::{CombatError, ErrorSeverity};
use crate::state::Combatant;

/// Unique identifier for a shared resource pool definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolId(pub u16);

impl core::fmt::Display for PoolId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pool:{}", self.0)
    }
}

/// Errors raised by pool consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolError {
    /// The counter cannot cover the requested cost. Callers treat this as
    /// "the ability silently did not fire"; no state was mutated.
    #[error("pool {pool} has {available} points, {requested} requested")]
    InsufficientResource {
        pool: PoolId,
        requested: u32,
        available: u32,
    },

    /// The combatant has no balance for this pool at all.
    #[error("combatant has no balance for {0}")]
    UnknownPool(PoolId),
}

impl CombatError for PoolError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientResource { .. } => ErrorSeverity::Recoverable,
            Self::UnknownPool(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientResource { .. } => "POOL_INSUFFICIENT_RESOURCE",
            Self::UnknownPool(_) => "POOL_UNKNOWN",
        }
    }
}

/// One finite counter on a combatant.
///
/// Invariant: `current <= max`. Consumption is atomic relative to a single
/// ability use; a failed consumption leaves the counter untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    current: u32,
    max: u32,
}

impl ResourcePool {
    /// Creates a full pool.
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Creates a pool at a specific level, clamped to the maximum.
    pub fn at(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Atomic check-and-consume. On failure the counter is unchanged.
    pub fn try_consume(&mut self, amount: u32, pool: PoolId) -> Result<u32, PoolError> {
        if self.current < amount {
            return Err(PoolError::InsufficientResource {
                pool,
                requested: amount,
                available: self.current,
            });
        }
        self.current -= amount;
        Ok(self.current)
    }

    /// Unconditional consumption used for end-of-action reconciliation.
    ///
    /// Floors at zero rather than failing; the action already resolved, so
    /// the cost is charged against whatever remains.
    pub fn force_consume(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Restores the counter to its maximum (rest boundary, host-driven).
    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Per-combatant pool balances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePools {
    entries: Vec<(PoolId, ResourcePool)>,
}

impl ResourcePools {
    /// Registers a balance for a pool (builder pattern). Replaces any
    /// existing balance for the same pool.
    #[must_use]
    pub fn with(mut self, id: PoolId, pool: ResourcePool) -> Self {
        self.insert(id, pool);
        self
    }

    pub fn insert(&mut self, id: PoolId, pool: ResourcePool) {
        if let Some(entry) = self.entries.iter_mut().find(|(pool_id, _)| *pool_id == id) {
            entry.1 = pool;
        } else {
            self.entries.push((id, pool));
        }
    }

    pub fn get(&self, id: PoolId) -> Option<&ResourcePool> {
        self.entries
            .iter()
            .find(|(pool_id, _)| *pool_id == id)
            .map(|(_, pool)| pool)
    }

    pub fn get_mut(&mut self, id: PoolId) -> Option<&mut ResourcePool> {
        self.entries
            .iter_mut()
            .find(|(pool_id, _)| *pool_id == id)
            .map(|(_, pool)| pool)
    }

    /// Current counter value, 0 for pools the combatant has no balance in.
    pub fn counter(&self, id: PoolId) -> u32 {
        self.get(id).map_or(0, ResourcePool::current)
    }
}

/// Binds the tiered abilities drawn from one pool.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBundle {
    pub pool: PoolId,
    /// Tier abilities in ascending tier order.
    pub abilities: Vec<AbilityId>,
}

/// Registry of pool-backed ability bundles plus consumption entry points.
#[derive(Clone, Debug, Default)]
pub struct ResourcePoolManager {
    bundles: Vec<AbilityBundle>,
}

impl ResourcePoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bundle. A pool registered twice keeps the last bundle.
    pub fn register_bundle(&mut self, bundle: AbilityBundle) {
        if let Some(existing) = self.bundles.iter_mut().find(|b| b.pool == bundle.pool) {
            *existing = bundle;
        } else {
            self.bundles.push(bundle);
        }
    }

    /// All abilities drawn from the given pool, ascending tier order.
    pub fn abilities_from(&self, pool: PoolId) -> &[AbilityId] {
        self.bundles
            .iter()
            .find(|b| b.pool == pool)
            .map_or(&[], |b| b.abilities.as_slice())
    }

    /// Pure eligibility predicate: both the pool counter and the gate
    /// attribute must cover the predicate's minimums.
    pub fn is_eligible(combatant: &Combatant, predicate: &UsePredicate) -> bool {
        combatant.pools.counter(predicate.pool) >= predicate.min_counter
            && combatant.attribute(predicate.gate) >= predicate.min_gate
    }

    /// Consumes `tier` points from the combatant's pool balance.
    ///
    /// The precondition is re-checked at the moment of consumption; on
    /// failure nothing is mutated and the caller must treat the ability as
    /// having silently not fired.
    pub fn consume(combatant: &mut Combatant, pool: PoolId, tier: u32) -> Result<u32, PoolError> {
        let balance = combatant
            .pools
            .get_mut(pool)
            .ok_or(PoolError::UnknownPool(pool))?;
        balance.try_consume(tier, pool)
    }
}
