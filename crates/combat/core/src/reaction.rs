//! Reaction negotiation.
//!
//! When the host engine offers a combatant a reaction, it creates a
//! [`ReactionRequest`] with one forced target and the baseline response
//! selected. [`ReactionRequest::build_candidates`] then computes the legal
//! menu of alternative responses, and the decision-maker (human or AI) may
//! reselect any number of times through
//! [`ReactionRequest::select_sub_option`] while the engine waits. The core
//! never blocks; it is re-entered with new input each time the selection
//! changes.
//!
//! Sub-option 0 is always the baseline reactive attack. Options 1..N are
//! the combatant's ready instantaneous abilities that survive the engine's
//! read-only attack probe, in enumeration order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ability::AbilityId;
use crate::effect::EffectInstance;
use crate::env::CombatEnv;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{BattleState, EntityId, FeatureKind};

/// Errors raised while negotiating a reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionError {
    /// The index is not a key of the availability map. The request is left
    /// unchanged; re-prompt the decision-maker.
    #[error("sub-option {option} is not available")]
    InvalidSelection { option: usize },

    /// The forced target became invalid after the menu was built. The
    /// request has been invalidated and should be discarded.
    #[error("reaction target is no longer valid")]
    StaleRequest,
}

impl CombatError for ReactionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidSelection { .. } => ErrorSeverity::Recoverable,
            Self::StaleRequest => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSelection { .. } => "REACTION_INVALID_SELECTION",
            Self::StaleRequest => "REACTION_STALE_REQUEST",
        }
    }
}

/// Per-target attack adjustment carried alongside each target entry.
///
/// Duplicated target entries reuse the original's modifier: the mechanics
/// choose *how* to respond to one attacker, never redirect to new ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionModifier {
    pub attack_roll_bonus: i32,
}

/// What the current selection resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolvedReaction {
    /// The baseline reactive attack with the combatant's weapon.
    Baseline,

    /// A materialized ability effect.
    Ability(EffectInstance),
}

/// Ephemeral negotiation state for one offered reaction.
///
/// Created when the engine offers a reaction, mutated on each reselection,
/// discarded once the reaction resolves, is withdrawn, or is invalidated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionRequest {
    actor: EntityId,
    targets: Vec<EntityId>,
    modifiers: Vec<ActionModifier>,
    availability: BTreeMap<usize, bool>,
    candidates: Vec<AbilityId>,
    selected: usize,
    resolved: ResolvedReaction,
}

impl ReactionRequest {
    /// Creates a request in its initial state: one forced target and the
    /// baseline response selected.
    pub fn new(actor: EntityId, target: EntityId, modifier: ActionModifier) -> Self {
        let mut availability = BTreeMap::new();
        availability.insert(0, true);
        Self {
            actor,
            targets: vec![target],
            modifiers: vec![modifier],
            availability,
            candidates: Vec::new(),
            selected: 0,
            resolved: ResolvedReaction::Baseline,
        }
    }

    /// The responding combatant.
    pub fn actor(&self) -> EntityId {
        self.actor
    }

    /// The forced target the reaction answers.
    pub fn primary_target(&self) -> EntityId {
        self.targets[0]
    }

    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    pub fn modifiers(&self) -> &[ActionModifier] {
        &self.modifiers
    }

    /// Sub-option index to legal-availability flag. Index 0 is always
    /// present.
    pub fn availability(&self) -> &BTreeMap<usize, bool> {
        &self.availability
    }

    /// Candidate abilities backing sub-options 1..N, in menu order.
    pub fn candidates(&self) -> &[AbilityId] {
        &self.candidates
    }

    pub fn selected_sub_option(&self) -> usize {
        self.selected
    }

    pub fn resolved(&self) -> &ResolvedReaction {
        &self.resolved
    }

    /// Computes the legal menu of responses for the current battle state.
    ///
    /// Leaves only sub-option 0 when the responder does not qualify for
    /// enhanced reactions or when the environment cannot answer the
    /// required queries. Populates the availability map; never mutates
    /// combat state.
    pub fn build_candidates(&mut self, state: &BattleState, env: &CombatEnv<'_>) {
        self.terminate_in_flight();
        self.availability.clear();
        self.availability.insert(0, true);
        self.candidates.clear();

        self.enumerate_candidates(state, env);
        self.configure_baseline();
    }

    fn enumerate_candidates(&mut self, state: &BattleState, env: &CombatEnv<'_>) {
        let (Ok(battle), Ok(content)) = (env.battle(), env.content()) else {
            return;
        };
        let Some(responder) = state.combatant(self.actor) else {
            return;
        };
        if !responder.has_feature(FeatureKind::ReactiveSpellcasting) {
            return;
        }

        let target = self.primary_target();
        for &ability_id in &responder.ready_abilities {
            let Some(ability) = content.ability(ability_id) else {
                continue;
            };
            if !ability.activation.fits_reaction_window() {
                continue;
            }
            if !ability.can_use(responder) {
                continue;
            }
            if !battle.is_valid_reaction_attack(self.actor, Some(ability), target) {
                continue;
            }

            self.candidates.push(ability_id);
            self.availability.insert(self.candidates.len(), true);
        }
    }

    /// Selects a sub-option from the availability map and materializes its
    /// response.
    ///
    /// Any in-flight effect from a prior selection is terminated first, so
    /// no partial effect remains applied. Index 0 rebuilds the target list
    /// to exactly the forced target; indices above 0 materialize the
    /// corresponding ability and may extend the target list by duplicating
    /// the forced target up to the effect's natural capacity.
    ///
    /// # Errors
    ///
    /// - [`ReactionError::InvalidSelection`] if the index is not a key of
    ///   the availability map; the request is left unchanged.
    /// - [`ReactionError::StaleRequest`] if the forced target became
    ///   invalid; the request is invalidated and must be discarded.
    pub fn select_sub_option(
        &mut self,
        option: usize,
        state: &BattleState,
        env: &CombatEnv<'_>,
    ) -> Result<(), ReactionError> {
        if !self.availability.contains_key(&option) {
            return Err(ReactionError::InvalidSelection { option });
        }

        if !self.is_still_valid(state, env) {
            self.invalidate();
            return Err(ReactionError::StaleRequest);
        }

        self.terminate_in_flight();
        self.truncate_to_primary_target();

        if option == 0 {
            self.configure_baseline();
            return Ok(());
        }

        let Some(instance) = self.materialize_candidate(option, state, env) else {
            // The backing ability became unavailable since the menu was
            // built; degrade silently to the baseline response.
            self.configure_baseline();
            return Ok(());
        };

        if instance.targets.single_target && instance.expected_targets() > 0 {
            let target = self.primary_target();
            let modifier = self.modifiers[0];
            while (self.targets.len() as u32) < instance.expected_targets() {
                self.targets.push(target);
                self.modifiers.push(modifier);
            }
        }

        self.resolved = ResolvedReaction::Ability(instance);
        self.selected = option;
        Ok(())
    }

    /// True while the forced target remains in the engine's valid set and
    /// is not in a terminal state. The engine re-evaluates this on every
    /// tick of the reaction window.
    pub fn is_still_valid(&self, state: &BattleState, env: &CombatEnv<'_>) -> bool {
        let Ok(battle) = env.battle() else {
            return false;
        };
        let target = self.primary_target();
        battle.is_valid_character(target)
            && state
                .combatant(target)
                .is_some_and(|combatant| !combatant.is_terminal())
    }

    /// Withdraws the request, terminating any in-flight effect. Idempotent.
    pub fn invalidate(&mut self) {
        self.terminate_in_flight();
    }

    /// Offer text shown to the responding player.
    pub fn format_description(&self, state: &BattleState) -> String {
        let name = state
            .combatant(self.primary_target())
            .map_or("an unseen foe", |combatant| combatant.name.as_str());
        format!("{name} provokes a reaction from you.")
    }

    /// Label for the currently selected response.
    pub fn format_react_description(&self, env: &CombatEnv<'_>) -> String {
        match &self.resolved {
            ResolvedReaction::Baseline => "Attack".to_string(),
            ResolvedReaction::Ability(instance) => env
                .content()
                .ok()
                .and_then(|content| content.ability(instance.source_ability))
                .map_or_else(|| "Cast".to_string(), |ability| format!("Cast {}", ability.name)),
        }
    }

    fn terminate_in_flight(&mut self) {
        if let ResolvedReaction::Ability(instance) = &mut self.resolved {
            instance.terminate();
        }
    }

    fn truncate_to_primary_target(&mut self) {
        self.targets.truncate(1);
        self.modifiers.truncate(1);
    }

    fn configure_baseline(&mut self) {
        self.truncate_to_primary_target();
        self.modifiers[0] = ActionModifier::default();
        self.resolved = ResolvedReaction::Baseline;
        self.selected = 0;
    }

    fn materialize_candidate(
        &self,
        option: usize,
        state: &BattleState,
        env: &CombatEnv<'_>,
    ) -> Option<EffectInstance> {
        let ability_id = *self.candidates.get(option - 1)?;
        let content = env.content().ok()?;
        let responder = state.combatant(self.actor)?;

        let Some(ability) = content.ability(ability_id) else {
            debug!(actor = %self.actor, ability = %ability_id, "candidate ability vanished from registry");
            return None;
        };
        if !ability.can_use(responder) {
            debug!(actor = %self.actor, ability = %ability_id, "candidate no longer usable, degrading to baseline");
            return None;
        }

        Some(EffectInstance::instantiate(ability, self.actor))
    }
}
