//! In-memory content registry backing the resolution core's content oracle.
//!
//! Records are registered once at startup and never mutated afterwards; the
//! oracle hands out shared references for the lifetime of the battle.

use combat_core::{
    Ability, AbilityId, ConditionDefinition, ConditionId, ContentOracle, DieByRankTable,
};

/// Owns every ability and condition record plus the strike die progression.
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    abilities: Vec<Ability>,
    conditions: Vec<ConditionDefinition>,
    strike_table: DieByRankTable,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ability record. Re-registering an id replaces the
    /// previous record.
    pub fn register_ability(&mut self, ability: Ability) {
        if let Some(existing) = self.abilities.iter_mut().find(|a| a.id == ability.id) {
            *existing = ability;
        } else {
            self.abilities.push(ability);
        }
    }

    /// Registers a condition definition. Re-registering an id replaces the
    /// previous definition.
    pub fn register_condition(&mut self, condition: ConditionDefinition) {
        if let Some(existing) = self.conditions.iter_mut().find(|c| c.id == condition.id) {
            *existing = condition;
        } else {
            self.conditions.push(condition);
        }
    }

    pub fn set_strike_table(&mut self, table: DieByRankTable) {
        self.strike_table = table;
    }
}

impl ContentOracle for ContentRegistry {
    fn ability(&self, id: AbilityId) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.id == id)
    }

    fn condition(&self, id: ConditionId) -> Option<&ConditionDefinition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    fn strike_die_by_rank(&self) -> &DieByRankTable {
        &self.strike_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActivationWindow, CostPolicy, EffectDescription};

    fn ability(id: u32, name: &str) -> Ability {
        Ability {
            id: AbilityId(id),
            name: name.to_string(),
            activation: ActivationWindow::Action,
            cost: CostPolicy::None,
            effect: EffectDescription::none(),
            use_predicate: None,
        }
    }

    #[test]
    fn re_registration_replaces_the_record() {
        let mut registry = ContentRegistry::new();
        registry.register_ability(ability(1, "Spark Lash"));
        registry.register_ability(ability(1, "Renamed"));

        assert_eq!(registry.ability(AbilityId(1)).unwrap().name, "Renamed");
        assert!(registry.ability(AbilityId(2)).is_none());
    }
}
