//! Combatant state facets read and mutated by the resolution core.
//!
//! Combatants are created and destroyed by the host engine; this core only
//! touches the condition, resource, attribute, and feature facets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ability::AbilityId;
use crate::pool::ResourcePools;
use crate::state::condition::ActiveConditions;

/// Unique identifier for any combatant tracked in the battle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allegiance of a combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    #[default]
    Party,
    Hostile,
    Neutral,
}

/// Life state of a combatant.
///
/// Anything other than `Alive` is terminal for targeting purposes: reaction
/// requests against such a target are withdrawn and stack triggers skip it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeState {
    #[default]
    Alive,
    Unconscious,
    Dying,
    Dead,
}

impl LifeState {
    /// Returns true if the combatant can no longer be meaningfully targeted.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Alive)
    }
}

/// Named integer attributes tracked per combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKind {
    ProficiencyBonus,
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

/// Character classes whose levels gate abilities and scale derived effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassKind {
    Warrior,
    Adept,
    Mage,
    Rogue,
}

/// Structured feature flags granted to combatants.
///
/// Features that alter core behavior are explicit enum variants rather than
/// display-name comparisons, so eligibility checks never parse strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureKind {
    /// Unlocks the enhanced reaction menu: instantaneous abilities may be
    /// substituted for the baseline reactive attack.
    ReactiveSpellcasting,

    /// Strike damage scales with the die-by-rank progression table.
    ImprovedStrikes,
}

/// A combat participant as seen by the resolution core.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: EntityId,
    /// Display name used by reaction description formatting.
    pub name: String,
    pub faction: Faction,
    pub life: LifeState,

    attributes: BTreeMap<AttributeKind, i32>,
    class_levels: BTreeMap<ClassKind, u32>,
    features: BTreeSet<FeatureKind>,

    /// Instantaneous abilities currently ready for use (the candidate set
    /// enumerated when a reaction window opens).
    pub ready_abilities: Vec<AbilityId>,

    pub conditions: ActiveConditions,
    pub pools: ResourcePools,
}

impl Combatant {
    /// Creates a living combatant with empty facets.
    pub fn new(id: EntityId, name: impl Into<String>, faction: Faction) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            life: LifeState::Alive,
            attributes: BTreeMap::new(),
            class_levels: BTreeMap::new(),
            features: BTreeSet::new(),
            ready_abilities: Vec::new(),
            conditions: ActiveConditions::empty(),
            pools: ResourcePools::default(),
        }
    }

    /// Looks up an attribute value, defaulting to 0 when unset.
    pub fn attribute(&self, kind: AttributeKind) -> i32 {
        self.attributes.get(&kind).copied().unwrap_or(0)
    }

    /// Sets an attribute value (builder pattern).
    #[must_use]
    pub fn with_attribute(mut self, kind: AttributeKind, value: i32) -> Self {
        self.attributes.insert(kind, value);
        self
    }

    pub fn set_attribute(&mut self, kind: AttributeKind, value: i32) {
        self.attributes.insert(kind, value);
    }

    /// Looks up a class level, defaulting to 0 for classes the combatant
    /// has no levels in.
    pub fn class_level(&self, class: ClassKind) -> u32 {
        self.class_levels.get(&class).copied().unwrap_or(0)
    }

    /// Sets a class level (builder pattern).
    #[must_use]
    pub fn with_class_level(mut self, class: ClassKind, level: u32) -> Self {
        self.class_levels.insert(class, level);
        self
    }

    pub fn has_feature(&self, feature: FeatureKind) -> bool {
        self.features.contains(&feature)
    }

    /// Grants a feature flag (builder pattern).
    #[must_use]
    pub fn with_feature(mut self, feature: FeatureKind) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn grant_feature(&mut self, feature: FeatureKind) {
        self.features.insert(feature);
    }

    /// Returns true if the combatant is dead, dying, or unconscious.
    pub fn is_terminal(&self) -> bool {
        self.life.is_terminal()
    }
}

/// Mutable battle-scoped combatant collection.
///
/// The host engine owns combatant lifecycle; this collection is the facet
/// handed to the resolution core's entry points.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    combatants: Vec<Combatant>,
}

impl BattleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combatant. Replaces any existing combatant with the same id.
    pub fn insert(&mut self, combatant: Combatant) {
        if let Some(existing) = self.combatants.iter_mut().find(|c| c.id == combatant.id) {
            *existing = combatant;
        } else {
            self.combatants.push(combatant);
        }
    }

    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}
