//! Battle-scoped combatant state: identity, attributes, conditions.
//!
//! The host engine owns persistence and lifecycle; these types are the
//! facets the resolution core reads and mutates in place.

mod combatant;
mod condition;

pub use combatant::{
    AttributeKind, BattleState, ClassKind, Combatant, EntityId, Faction, FeatureKind, LifeState,
};
pub use condition::{
    ActiveCondition, ActiveConditions, ConditionDefinition, ConditionId, TurnOccurence,
};
