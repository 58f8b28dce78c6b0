//! Traits describing the host engine's side of the boundary.
//!
//! Oracles expose read-only battle queries and immutable content records.
//! The [`CombatEnv`] aggregate bundles them so entry points can access
//! everything they need without hard coupling to a concrete host. The one
//! mutable collaborator, [`EffectSink`], is passed separately because it
//! receives derived effects back into the host.

mod error;

pub use error::OracleError;

use crate::ability::{Ability, AbilityId, DieByRankTable};
use crate::effect::EffectInstance;
use crate::pool::PoolId;
use crate::state::{ConditionDefinition, ConditionId, EntityId};

/// Read-only battle queries supplied by the host engine.
pub trait BattleOracle {
    /// Whether the entity is in the currently-valid character set.
    fn is_valid_character(&self, id: EntityId) -> bool;

    /// Read-only probe: would this reaction attack actually connect right
    /// now? `ability` is None for the baseline physical reactive attack.
    ///
    /// Must not mutate combat state.
    fn is_valid_reaction_attack(
        &self,
        attacker: EntityId,
        ability: Option<&Ability>,
        target: EntityId,
    ) -> bool;
}

/// Immutable content records supplied by the registry.
pub trait ContentOracle {
    fn ability(&self, id: AbilityId) -> Option<&Ability>;

    fn condition(&self, id: ConditionId) -> Option<&ConditionDefinition>;

    /// Die progression used to scale derived trigger effects by class rank.
    fn strike_die_by_rank(&self) -> &DieByRankTable;
}

/// Receives applied effects and bookkeeping notifications back into the
/// host engine.
pub trait EffectSink {
    /// Applies a materialized effect to a target. The instance is never
    /// terminated when it reaches the sink.
    fn apply_effect(&mut self, effect: &EffectInstance, target: EntityId);

    /// A combatant's pool balance changed (mirrors the host's UI callback).
    fn pool_changed(&mut self, entity: EntityId, pool: PoolId, remaining: u32) {
        let _ = (entity, pool, remaining);
    }
}

/// Aggregates the read-only oracles required by the resolution core.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    battle: Option<&'a dyn BattleOracle>,
    content: Option<&'a dyn ContentOracle>,
}

impl<'a> CombatEnv<'a> {
    pub fn new(battle: Option<&'a dyn BattleOracle>, content: Option<&'a dyn ContentOracle>) -> Self {
        Self { battle, content }
    }

    pub fn with_all(battle: &'a dyn BattleOracle, content: &'a dyn ContentOracle) -> Self {
        Self::new(Some(battle), Some(content))
    }

    pub fn empty() -> Self {
        Self {
            battle: None,
            content: None,
        }
    }

    /// Returns the battle oracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::BattleNotAvailable` if no battle oracle was provided.
    pub fn battle(&self) -> Result<&'a dyn BattleOracle, OracleError> {
        self.battle.ok_or(OracleError::BattleNotAvailable)
    }

    /// Returns the content oracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ContentNotAvailable` if no content oracle was provided.
    pub fn content(&self) -> Result<&'a dyn ContentOracle, OracleError> {
        self.content.ok_or(OracleError::ContentNotAvailable)
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("battle", &self.battle.is_some())
            .field("content", &self.content.is_some())
            .finish()
    }
}
