//! Stacking condition instances tracked per combatant.
//!
//! Unlike simple status flags, conditions here are *instances*: a definition
//! that allows multiple instances may coexist several times on one target,
//! and threshold triggers evict a fixed number of instances at once.
//!
//! # Eviction Order
//!
//! Instances of one definition are evicted smallest remaining duration
//! first. Ties keep their relative insertion order (stable sort); insertion
//! age is never used as an independent sort key.

use arrayvec::ArrayVec;

use crate::config::CoreTuning;
use crate::state::combatant::{EntityId, Faction};

/// Unique identifier for a condition definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionId(pub u32);

impl core::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "condition:{}", self.0)
    }
}

/// Immutable description of a condition, supplied by the content registry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionDefinition {
    pub id: ConditionId,
    pub name: String,

    /// Detrimental conditions count as debuffs for dispel and AI purposes.
    pub detrimental: bool,

    /// Suppress the "condition removed" notification when an instance of
    /// this definition expires or is evicted.
    pub silent_when_removed: bool,

    /// Whether several instances of this definition may coexist on one
    /// target. When false, re-application refreshes the existing instance.
    pub allow_multiple_instances: bool,
}

/// Point in the turn cycle at which a condition's duration ticks down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnOccurence {
    #[default]
    EndOfTurn,
    StartOfTurn,
}

/// A single active condition instance on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveCondition {
    pub definition: ConditionId,

    /// Rounds left before the instance expires.
    pub remaining_rounds: u32,

    /// Entity that applied the instance.
    pub source: EntityId,
    pub source_faction: Faction,

    /// Copied from the definition at application time so expiry handling
    /// does not need a registry lookup.
    pub silent_when_removed: bool,

    /// When in the turn cycle the duration ticks.
    pub expires: TurnOccurence,

    /// Insertion ordinal, unique within one combatant's tracker.
    pub serial: u32,
}

/// Ordered multiset of active condition instances on one combatant.
///
/// Entries are kept in insertion order; eviction queries sort by remaining
/// duration with a stable sort so same-duration instances keep their
/// relative order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveConditions {
    entries: ArrayVec<ActiveCondition, { CoreTuning::MAX_ACTIVE_CONDITIONS }>,
    next_serial: u32,
}

impl ActiveConditions {
    /// Creates an empty tracker.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Applies one instance of the given definition.
    ///
    /// Definitions that disallow multiple instances refresh the existing
    /// instance to the longer duration instead of stacking. Returns false
    /// only when the tracker is full.
    pub fn apply(
        &mut self,
        definition: &ConditionDefinition,
        remaining_rounds: u32,
        source: EntityId,
        source_faction: Faction,
    ) -> bool {
        if !definition.allow_multiple_instances {
            if let Some(existing) = self
                .entries
                .iter_mut()
                .find(|c| c.definition == definition.id)
            {
                existing.remaining_rounds = existing.remaining_rounds.max(remaining_rounds);
                return true;
            }
        }

        if self.entries.is_full() {
            return false;
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.entries.push(ActiveCondition {
            definition: definition.id,
            remaining_rounds,
            source,
            source_faction,
            silent_when_removed: definition.silent_when_removed,
            expires: TurnOccurence::EndOfTurn,
            serial,
        });
        true
    }

    /// Number of active instances of the given definition.
    pub fn count_of(&self, definition: ConditionId) -> usize {
        self.entries
            .iter()
            .filter(|c| c.definition == definition)
            .count()
    }

    /// Returns true if at least one instance of the definition is active.
    pub fn has(&self, definition: ConditionId) -> bool {
        self.entries.iter().any(|c| c.definition == definition)
    }

    /// Iterates over the instances of one definition in insertion order.
    pub fn instances_of(
        &self,
        definition: ConditionId,
    ) -> impl Iterator<Item = &ActiveCondition> + '_ {
        self.entries
            .iter()
            .filter(move |c| c.definition == definition)
    }

    /// Returns true if any instance of the definition is on its final round.
    pub fn any_at_final_round(&self, definition: ConditionId) -> bool {
        self.instances_of(definition)
            .any(|c| c.remaining_rounds <= 1)
    }

    /// Removes up to `limit` instances of the definition, smallest remaining
    /// duration first, and returns them in eviction order.
    ///
    /// Ties are broken by insertion order (stable), never re-sorted by age.
    pub fn evict_smallest(&mut self, definition: ConditionId, limit: usize) -> Vec<ActiveCondition> {
        let mut picked: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, c)| c.definition == definition)
            .map(|(index, _)| index)
            .collect();

        // Stable sort: equal durations keep insertion order.
        picked.sort_by_key(|&index| self.entries[index].remaining_rounds);
        picked.truncate(limit);

        // Remove back-to-front so earlier indices stay valid.
        picked.sort_unstable();
        let mut removed: Vec<ActiveCondition> = picked
            .iter()
            .rev()
            .map(|&index| self.entries.remove(index))
            .collect();
        removed.sort_by_key(|c| (c.remaining_rounds, c.serial));
        removed
    }

    /// Removes a specific instance by serial. Returns the removed instance.
    pub fn remove_serial(&mut self, serial: u32) -> Option<ActiveCondition> {
        let index = self.entries.iter().position(|c| c.serial == serial)?;
        Some(self.entries.remove(index))
    }

    /// Ticks down end-of-turn durations and drops expired instances.
    ///
    /// Returns the expired instances that should produce a "condition
    /// removed" notification; instances marked silent are dropped without
    /// being reported.
    pub fn tick_turn_end(&mut self) -> Vec<ActiveCondition> {
        let mut notify = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &mut self.entries[index];
            if entry.expires != TurnOccurence::EndOfTurn {
                index += 1;
                continue;
            }
            entry.remaining_rounds = entry.remaining_rounds.saturating_sub(1);
            if entry.remaining_rounds == 0 {
                let removed = self.entries.remove(index);
                if !removed.silent_when_removed {
                    notify.push(removed);
                }
            } else {
                index += 1;
            }
        }
        notify
    }

    /// Iterates over all active instances in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCondition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
