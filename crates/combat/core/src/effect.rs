//! Materialized effect instances.
//!
//! An [`EffectInstance`] is an ability's effect description bound to an
//! acting combatant at a moment in time. Reaction selections and derived
//! trigger effects both work on instances so they can rewrite damage forms
//! and particle references without touching the immutable ability record.

use crate::ability::{Ability, AbilityId, ConditionForm, DamageForm, ParticleParameters, TargetSpec};
use crate::state::EntityId;

/// A live, possibly in-flight effect bound to an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectInstance {
    pub source_ability: AbilityId,
    pub actor: EntityId,
    pub damage: Option<DamageForm>,
    pub condition: Option<ConditionForm>,
    pub targets: TargetSpec,
    pub particles: ParticleParameters,
    terminated: bool,
}

impl EffectInstance {
    /// Binds an ability's effect description to an acting combatant.
    pub fn instantiate(ability: &Ability, actor: EntityId) -> Self {
        Self {
            source_ability: ability.id,
            actor,
            damage: ability.effect.damage,
            condition: ability.effect.condition,
            targets: ability.effect.targets,
            particles: ability.effect.particles,
            terminated: false,
        }
    }

    /// Number of target entries this instance expects.
    pub const fn expected_targets(&self) -> u32 {
        self.targets.capacity
    }

    /// First damage form, mutable, for trigger-time scaling.
    pub fn damage_form_mut(&mut self) -> Option<&mut DamageForm> {
        self.damage.as_mut()
    }

    /// Swaps the target particle reference to the condition-start variant so
    /// the applied effect carries condition-linked visuals.
    pub fn use_condition_start_particles(&mut self) {
        self.particles.target = self.particles.condition_start;
    }

    /// Cancels the instance. Idempotent; a terminated instance must never
    /// be applied.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }
}
