//! Deterministic turn-based combat resolution primitives.
//!
//! `combat-core` implements three interlocking mechanics on top of a host
//! combat engine: reaction negotiation (substituting ready abilities for the
//! baseline reactive attack), a condition-stack trigger engine (threshold
//! stacking debuffs firing derived effects), and shared tiered resource
//! pools. The host supplies battle queries and content records through the
//! oracle traits in [`env`]; everything here is pure with respect to those
//! boundaries and usable from both live engines and offline tools.
pub mod ability;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod pool;
pub mod reaction;
pub mod state;
pub mod trigger;
pub use ability::{
    Ability, AbilityId, ActivationWindow, ConditionForm, ConditionOperation, CostPolicy,
    DamageForm, DamageType, DieByRankTable, DieType, EffectDescription, ParticleParameters,
    ParticleRef, TargetSpec, UsePredicate,
};
pub use config::CoreTuning;
pub use effect::EffectInstance;
pub use env::{BattleOracle, CombatEnv, ContentOracle, EffectSink, OracleError};
pub use error::{CombatError, ErrorContext, ErrorSeverity};
pub use pool::{AbilityBundle, PoolError, PoolId, ResourcePool, ResourcePoolManager, ResourcePools};
pub use reaction::{ActionModifier, ReactionError, ReactionRequest, ResolvedReaction};
pub use state::{
    ActiveCondition, ActiveConditions, AttributeKind, BattleState, ClassKind, Combatant,
    ConditionDefinition, ConditionId, EntityId, Faction, FeatureKind, LifeState, TurnOccurence,
};
pub use trigger::{
    AttackMode, AuxStacking, CharacterAction, CombatHook, RollOutcome, StackingStrikeHook,
    StrikeClass, StrikeFilter, TriggerDispatcher, TriggerError,
};
