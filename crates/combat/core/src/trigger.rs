//! Condition-stack trigger engine.
//!
//! Hooks observe attack resolution and end-of-action boundaries. The one
//! shipped hook shape, [`StackingStrikeHook`], applies a stacking condition
//! on qualifying hits and, once a target's stack count reaches the tuned
//! threshold, evicts the threshold's worth of instances and fires a derived
//! effect scaled by the attacker's class rank.
//!
//! Hooks are closed variants of [`CombatHook`]; the dispatcher matches on
//! the variant rather than calling through a dynamic registry, so adding a
//! hook shape is a source change, never a runtime lookup.

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::ability::AbilityId;
use crate::config::CoreTuning;
use crate::effect::EffectInstance;
use crate::env::{CombatEnv, ContentOracle, EffectSink, OracleError};
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{AttributeKind, BattleState, ClassKind, ConditionId, EntityId};

/// Errors raised by trigger evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    /// The derived effect cannot fire: the actor has no rank in the hook's
    /// class, the ability record is missing, or it carries no damage form.
    /// Stack evictions still happened; only the effect is skipped.
    #[error("derived effect {ability} cannot fire")]
    DegenerateEffect { ability: AbilityId },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl CombatError for TriggerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DegenerateEffect { .. } => ErrorSeverity::Internal,
            Self::Oracle(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DegenerateEffect { .. } => "TRIGGER_DEGENERATE_EFFECT",
            Self::Oracle(inner) => inner.error_code(),
        }
    }
}

/// Outcome of an attack roll as reported by the host engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollOutcome {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl RollOutcome {
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Success | Self::CriticalSuccess)
    }
}

/// Delivery category of a single strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrikeClass {
    Unarmed,
    MeleeWeapon,
    RangedWeapon,
    Spell,
}

impl StrikeClass {
    pub const fn as_filter(self) -> StrikeFilter {
        match self {
            Self::Unarmed => StrikeFilter::UNARMED,
            Self::MeleeWeapon => StrikeFilter::MELEE_WEAPON,
            Self::RangedWeapon => StrikeFilter::RANGED_WEAPON,
            Self::Spell => StrikeFilter::SPELL,
        }
    }
}

bitflags! {
    /// Which strike classes a hook reacts to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StrikeFilter: u8 {
        const UNARMED = 1 << 0;
        const MELEE_WEAPON = 1 << 1;
        const RANGED_WEAPON = 1 << 2;
        const SPELL = 1 << 3;
    }
}

/// How one resolved strike was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackMode {
    pub strike: StrikeClass,
}

/// A completed action, reported by the host engine at the end-of-action
/// boundary. Target entries may repeat for multi-strike actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterAction {
    pub actor: EntityId,
    pub ability: Option<AbilityId>,
    pub targets: Vec<EntityId>,
}

/// Secondary stacking rule unlocked at a class rank: targets carrying the
/// linked condition on its final round receive an extra stack of the hook's
/// primary condition at end of action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxStacking {
    pub condition: ConditionId,
    pub min_class_level: u32,
}

/// The stacking-strike hook shape.
///
/// Qualifying hits apply `primary`; reaching the stack threshold evicts the
/// threshold's worth of instances and fires `derived`, scaled by the
/// attacker's rank in `class`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackingStrikeHook {
    pub class: ClassKind,
    pub primary: ConditionId,
    pub derived: AbilityId,
    pub strikes: StrikeFilter,
    pub aux: Option<AuxStacking>,
}

/// Closed set of hook shapes the dispatcher understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatHook {
    StackingStrike(StackingStrikeHook),
}

/// Evaluates registered hooks at attack and end-of-action boundaries.
#[derive(Clone, Debug, Default)]
pub struct TriggerDispatcher {
    hooks: Vec<CombatHook>,
    tuning: CoreTuning,
}

impl TriggerDispatcher {
    pub fn new(tuning: CoreTuning) -> Self {
        Self {
            hooks: Vec::new(),
            tuning,
        }
    }

    pub fn register(&mut self, hook: CombatHook) {
        self.hooks.push(hook);
    }

    pub fn hooks(&self) -> &[CombatHook] {
        &self.hooks
    }

    pub fn tuning(&self) -> &CoreTuning {
        &self.tuning
    }

    /// Observes one resolved attack. Qualifying hits apply a stack of each
    /// matching hook's primary condition to the struck target.
    ///
    /// # Errors
    ///
    /// Returns an error only when the content oracle is missing; a full
    /// condition tracker or an unregistered condition drops the stack with
    /// a debug log instead.
    pub fn after_attack_hit(
        &self,
        state: &mut BattleState,
        env: &CombatEnv<'_>,
        attacker: EntityId,
        target: EntityId,
        outcome: RollOutcome,
        mode: AttackMode,
    ) -> Result<(), TriggerError> {
        if !outcome.is_hit() {
            return Ok(());
        }
        let content = env.content()?;

        for hook in &self.hooks {
            let CombatHook::StackingStrike(hook) = hook;
            if !hook.strikes.contains(mode.strike.as_filter()) {
                continue;
            }

            let Some(source) = state.combatant(attacker) else {
                continue;
            };
            if source.class_level(hook.class) == 0 {
                continue;
            }
            let source_faction = source.faction;

            let Some(definition) = content.condition(hook.primary) else {
                debug!(condition = %hook.primary, "condition definition not registered");
                continue;
            };

            let Some(struck) = state.combatant_mut(target) else {
                continue;
            };
            if struck.is_terminal() {
                continue;
            }
            if !struck.conditions.apply(
                definition,
                self.tuning.condition_rounds,
                attacker,
                source_faction,
            ) {
                debug!(target = %target, condition = %hook.primary, "condition tracker full, stack dropped");
            }
        }
        Ok(())
    }

    /// End-of-action boundary. Runs, in order: pool cost reconciliation for
    /// the action's ability, each hook's auxiliary stacking rule, then each
    /// hook's threshold evaluation over the action's targets.
    ///
    /// Threshold evaluation always evicts the threshold's worth of stacks;
    /// a degenerate derived effect is logged and skipped, never surfaced.
    ///
    /// # Errors
    ///
    /// Returns an error only when the content oracle is missing.
    pub fn on_after_action(
        &self,
        state: &mut BattleState,
        env: &CombatEnv<'_>,
        sink: &mut dyn EffectSink,
        action: &CharacterAction,
    ) -> Result<(), TriggerError> {
        let content = env.content()?;

        self.reconcile_pool_cost(state, content, sink, action);

        for hook in &self.hooks {
            let CombatHook::StackingStrike(hook) = hook;
            self.apply_aux_stacks(state, content, action, hook);
            self.evaluate_thresholds(state, content, sink, action, hook);
        }
        Ok(())
    }

    /// Charges the action ability's pool cost against the actor's balance,
    /// flooring at zero. The action already resolved, so the cost is
    /// collected from whatever remains rather than failing.
    fn reconcile_pool_cost(
        &self,
        state: &mut BattleState,
        content: &dyn ContentOracle,
        sink: &mut dyn EffectSink,
        action: &CharacterAction,
    ) {
        let Some(ability_id) = action.ability else {
            return;
        };
        let Some(ability) = content.ability(ability_id) else {
            return;
        };
        let (Some(pool), Some(tier)) = (ability.cost.pool(), ability.cost.tier()) else {
            return;
        };
        let Some(actor) = state.combatant_mut(action.actor) else {
            return;
        };
        let Some(balance) = actor.pools.get_mut(pool) else {
            debug!(actor = %action.actor, %pool, "no balance to reconcile pool cost against");
            return;
        };

        let remaining = balance.force_consume(tier);
        sink.pool_changed(action.actor, pool, remaining);
    }

    /// Applies the hook's auxiliary stacking rule: targets carrying the
    /// linked condition on its final round receive one extra primary stack.
    ///
    /// Qualification is decided on a snapshot of the target list before any
    /// stack is added, so one grant never enables another.
    fn apply_aux_stacks(
        &self,
        state: &mut BattleState,
        content: &dyn ContentOracle,
        action: &CharacterAction,
        hook: &StackingStrikeHook,
    ) {
        let Some(aux) = hook.aux else {
            return;
        };
        let Some(actor) = state.combatant(action.actor) else {
            return;
        };
        if actor.class_level(hook.class) < aux.min_class_level {
            return;
        }
        let actor_faction = actor.faction;

        let Some(definition) = content.condition(hook.primary) else {
            debug!(condition = %hook.primary, "condition definition not registered");
            return;
        };

        let qualifying: Vec<EntityId> = unique_targets(action)
            .into_iter()
            .filter(|&id| {
                state.combatant(id).is_some_and(|target| {
                    !target.is_terminal() && target.conditions.any_at_final_round(aux.condition)
                })
            })
            .collect();

        for target_id in qualifying {
            let Some(target) = state.combatant_mut(target_id) else {
                continue;
            };
            if !target.conditions.apply(
                definition,
                self.tuning.condition_rounds,
                action.actor,
                actor_faction,
            ) {
                debug!(target = %target_id, "condition tracker full, auxiliary stack dropped");
            }
        }
    }

    /// Fires the hook's derived effect on every action target whose primary
    /// stack count reached the threshold.
    fn evaluate_thresholds(
        &self,
        state: &mut BattleState,
        content: &dyn ContentOracle,
        sink: &mut dyn EffectSink,
        action: &CharacterAction,
        hook: &StackingStrikeHook,
    ) {
        let threshold = self.tuning.stack_threshold;
        let Some(actor) = state.combatant(action.actor) else {
            return;
        };
        let class_level = actor.class_level(hook.class);
        let proficiency = actor.attribute(AttributeKind::ProficiencyBonus);

        for target_id in unique_targets(action) {
            let Some(target) = state.combatant_mut(target_id) else {
                continue;
            };
            if target.is_terminal() {
                continue;
            }
            if (target.conditions.count_of(hook.primary) as u32) < threshold {
                continue;
            }

            // The trigger consumes its stacks whether or not the derived
            // effect can fire.
            let evicted = target.conditions.evict_smallest(hook.primary, threshold as usize);
            trace!(target = %target_id, condition = %hook.primary, count = evicted.len(), "stacks evicted");

            match build_derived_effect(content, hook, action.actor, class_level, proficiency) {
                Ok(instance) => sink.apply_effect(&instance, target_id),
                Err(err) => {
                    debug!(target = %target_id, %err, "derived effect skipped");
                }
            }
        }
    }
}

/// Materializes and scales the hook's derived effect for one firing.
///
/// The damage die follows the die-by-rank table at the actor's class rank
/// and the flat bonus is half the actor's proficiency bonus, rounded down.
fn build_derived_effect(
    content: &dyn ContentOracle,
    hook: &StackingStrikeHook,
    actor: EntityId,
    class_level: u32,
    proficiency: i32,
) -> Result<EffectInstance, TriggerError> {
    let degenerate = TriggerError::DegenerateEffect {
        ability: hook.derived,
    };

    if class_level == 0 {
        return Err(degenerate);
    }
    let ability = content.ability(hook.derived).ok_or(degenerate)?;
    let die = content
        .strike_die_by_rank()
        .die_for_rank(class_level)
        .ok_or(degenerate)?;

    let mut instance = EffectInstance::instantiate(ability, actor);
    let Some(form) = instance.damage_form_mut() else {
        return Err(degenerate);
    };
    form.die = die;
    form.bonus_damage = proficiency / 2;
    instance.use_condition_start_particles();
    Ok(instance)
}

/// Target list with duplicate entries collapsed, in first-seen order.
fn unique_targets(action: &CharacterAction) -> Vec<EntityId> {
    let mut seen: Vec<EntityId> = Vec::with_capacity(action.targets.len());
    for &target in &action.targets {
        if !seen.contains(&target) {
            seen.push(target);
        }
    }
    seen
}
