//! End-to-end resolution scenarios for the Resonance discipline.
//!
//! These tests wire the real content registry, pool manager, and trigger
//! dispatcher together behind stub host oracles and drive full combat
//! sequences through the public entry points.

use combat_content::{ContentRegistry, resonance};
use combat_core::{
    Ability, AbilityId, ActionModifier, ActivationWindow, AttackMode, AttributeKind, BattleOracle,
    BattleState, Combatant, CombatEnv, ContentOracle, CoreTuning, CostPolicy, DamageForm,
    DamageType, DieType, EffectDescription, EffectInstance, EffectSink, EntityId, Faction,
    FeatureKind, LifeState, ParticleParameters, PoolId, ReactionError, ReactionRequest,
    ResolvedReaction, ResourcePoolManager, RollOutcome, StrikeClass, TargetSpec, TriggerDispatcher,
};

const ADEPT: EntityId = EntityId(1);
const BRUTE: EntityId = EntityId(2);

struct StubBattle {
    valid: Vec<EntityId>,
}

impl BattleOracle for StubBattle {
    fn is_valid_character(&self, id: EntityId) -> bool {
        self.valid.contains(&id)
    }

    fn is_valid_reaction_attack(
        &self,
        _attacker: EntityId,
        _ability: Option<&Ability>,
        _target: EntityId,
    ) -> bool {
        true
    }
}

#[derive(Default)]
struct RecordingSink {
    effects: Vec<(EffectInstance, EntityId)>,
    pool_events: Vec<(EntityId, PoolId, u32)>,
}

impl EffectSink for RecordingSink {
    fn apply_effect(&mut self, effect: &EffectInstance, target: EntityId) {
        self.effects.push((effect.clone(), target));
    }

    fn pool_changed(&mut self, entity: EntityId, pool: PoolId, remaining: u32) {
        self.pool_events.push((entity, pool, remaining));
    }
}

struct Harness {
    registry: ContentRegistry,
    pools: ResourcePoolManager,
    dispatcher: TriggerDispatcher,
    battle: StubBattle,
}

impl Harness {
    fn new() -> Self {
        let mut registry = ContentRegistry::new();
        let mut pools = ResourcePoolManager::new();
        let mut dispatcher = TriggerDispatcher::new(CoreTuning::new());
        resonance::install(&mut registry, &mut pools, &mut dispatcher);

        Self {
            registry,
            pools,
            dispatcher,
            battle: StubBattle {
                valid: vec![ADEPT, BRUTE],
            },
        }
    }

    fn env(&self) -> CombatEnv<'_> {
        CombatEnv::with_all(&self.battle, &self.registry)
    }

    fn melee_hit(&self, state: &mut BattleState, attacker: EntityId, target: EntityId) {
        self.dispatcher
            .after_attack_hit(
                state,
                &self.env(),
                attacker,
                target,
                RollOutcome::Success,
                AttackMode {
                    strike: StrikeClass::MeleeWeapon,
                },
            )
            .unwrap();
    }

    fn end_action(
        &self,
        state: &mut BattleState,
        sink: &mut RecordingSink,
        actor: EntityId,
        ability: Option<AbilityId>,
        targets: &[EntityId],
    ) {
        let action = combat_core::CharacterAction {
            actor,
            ability,
            targets: targets.to_vec(),
        };
        self.dispatcher
            .on_after_action(state, &self.env(), sink, &action)
            .unwrap();
    }
}

fn battle_with(adept: Combatant) -> BattleState {
    let mut state = BattleState::new();
    state.insert(adept);
    state.insert(Combatant::new(BRUTE, "Pit Brute", Faction::Hostile));
    state
}

fn resonance_stacks(state: &BattleState, id: EntityId) -> usize {
    state
        .combatant(id)
        .unwrap()
        .conditions
        .count_of(resonance::CONDITION_RESONANCE)
}

#[test]
fn three_hits_detonate_a_scaled_burst() {
    let harness = Harness::new();
    let mut state = battle_with(resonance::adept(ADEPT, "Sela", 6, 4));
    let mut sink = RecordingSink::default();

    // Two hits leave the target primed but quiet.
    harness.melee_hit(&mut state, ADEPT, BRUTE);
    harness.melee_hit(&mut state, ADEPT, BRUTE);
    harness.end_action(&mut state, &mut sink, ADEPT, None, &[BRUTE]);
    assert!(sink.effects.is_empty());
    assert_eq!(resonance_stacks(&state, BRUTE), 2);

    // The third hit crosses the threshold at end of action.
    harness.melee_hit(&mut state, ADEPT, BRUTE);
    harness.end_action(&mut state, &mut sink, ADEPT, None, &[BRUTE]);

    assert_eq!(sink.effects.len(), 1);
    let (burst, struck) = &sink.effects[0];
    assert_eq!(*struck, BRUTE);
    assert_eq!(burst.source_ability, resonance::ABILITY_RESONANT_BURST);

    let form = burst.damage.unwrap();
    assert_eq!(form.die, DieType::D6); // rank 6 band
    assert_eq!(form.bonus_damage, 2); // proficiency 4, halved
    assert_eq!(burst.particles.target, resonance::PARTICLE_BURST_ON_CONDITION);

    // The detonation consumed all three stacks.
    assert_eq!(resonance_stacks(&state, BRUTE), 0);
}

#[test]
fn burst_die_follows_the_rank_bands() {
    for (rank, die) in [(3, DieType::D4), (5, DieType::D6), (11, DieType::D8)] {
        let harness = Harness::new();
        let mut state = battle_with(resonance::adept(ADEPT, "Sela", rank, 2));
        let mut sink = RecordingSink::default();

        for _ in 0..3 {
            harness.melee_hit(&mut state, ADEPT, BRUTE);
        }
        harness.end_action(&mut state, &mut sink, ADEPT, None, &[BRUTE]);

        assert_eq!(sink.effects.len(), 1);
        assert_eq!(sink.effects[0].0.damage.unwrap().die, die);
    }
}

#[test]
fn lapsing_echo_mark_grants_the_final_stack() {
    let harness = Harness::new();
    let mut state = battle_with(resonance::adept(ADEPT, "Sela", 6, 4));
    let mut sink = RecordingSink::default();

    harness.melee_hit(&mut state, ADEPT, BRUTE);
    harness.melee_hit(&mut state, ADEPT, BRUTE);

    // Mark the target with an echo on its final round.
    let echo = harness
        .registry
        .condition(resonance::CONDITION_FRACTURE_ECHO)
        .unwrap()
        .clone();
    state
        .combatant_mut(BRUTE)
        .unwrap()
        .conditions
        .apply(&echo, 1, ADEPT, Faction::Party);

    harness.end_action(&mut state, &mut sink, ADEPT, None, &[BRUTE]);

    // Echo conversion supplied the third stack and the burst fired.
    assert_eq!(sink.effects.len(), 1);
    assert_eq!(resonance_stacks(&state, BRUTE), 0);
}

#[test]
fn echo_conversion_is_locked_below_rank_six() {
    let harness = Harness::new();
    let mut state = battle_with(resonance::adept(ADEPT, "Sela", 5, 3));
    let mut sink = RecordingSink::default();

    harness.melee_hit(&mut state, ADEPT, BRUTE);
    harness.melee_hit(&mut state, ADEPT, BRUTE);

    let echo = harness
        .registry
        .condition(resonance::CONDITION_FRACTURE_ECHO)
        .unwrap()
        .clone();
    state
        .combatant_mut(BRUTE)
        .unwrap()
        .conditions
        .apply(&echo, 1, ADEPT, Faction::Party);

    harness.end_action(&mut state, &mut sink, ADEPT, None, &[BRUTE]);

    assert!(sink.effects.is_empty());
    assert_eq!(resonance_stacks(&state, BRUTE), 2);
}

#[test]
fn focus_cost_is_charged_exactly_once_at_end_of_action() {
    let harness = Harness::new();
    let mut state = battle_with(resonance::adept(ADEPT, "Sela", 6, 4));
    let mut sink = RecordingSink::default();

    let tier_two = resonance::focus_ability_id(2);
    harness.end_action(&mut state, &mut sink, ADEPT, Some(tier_two), &[BRUTE]);

    assert_eq!(sink.pool_events, vec![(ADEPT, resonance::FOCUS_POOL, 4)]);
    assert_eq!(
        state
            .combatant(ADEPT)
            .unwrap()
            .pools
            .counter(resonance::FOCUS_POOL),
        4
    );
}

#[test]
fn focus_cost_floors_at_zero_when_overdrawn() {
    let harness = Harness::new();
    // Rank 1 Adept has a single Focus point but can still be charged for a
    // tier-two action that resolved through other means.
    let mut state = battle_with(resonance::adept(ADEPT, "Sela", 1, 2));
    let mut sink = RecordingSink::default();

    let tier_two = resonance::focus_ability_id(2);
    harness.end_action(&mut state, &mut sink, ADEPT, Some(tier_two), &[BRUTE]);

    assert_eq!(sink.pool_events, vec![(ADEPT, resonance::FOCUS_POOL, 0)]);
}

// ===== reaction negotiation over discipline content =====

fn reactive_adept(rank: u32, proficiency: i32) -> Combatant {
    resonance::adept(ADEPT, "Sela", rank, proficiency)
        .with_feature(FeatureKind::ReactiveSpellcasting)
}

#[test]
fn reaction_menu_lists_only_affordable_tiers() {
    let harness = Harness::new();
    // Proficiency 2 gates tiers 1-2 even though the pool holds 6 points.
    let state = battle_with(reactive_adept(6, 2));
    let env = harness.env();

    let mut request = ReactionRequest::new(ADEPT, BRUTE, ActionModifier::default());
    request.build_candidates(&state, &env);

    let keys: Vec<usize> = request.availability().keys().copied().collect();
    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(
        request.candidates(),
        &[resonance::focus_ability_id(1), resonance::focus_ability_id(2)]
    );

    // Selecting tier 2 materializes that ability against the attacker.
    request.select_sub_option(2, &state, &env).unwrap();
    match request.resolved() {
        ResolvedReaction::Ability(instance) => {
            assert_eq!(instance.source_ability, resonance::focus_ability_id(2));
        }
        ResolvedReaction::Baseline => panic!("expected an ability selection"),
    }

    let err = request.select_sub_option(3, &state, &env).unwrap_err();
    assert_eq!(err, ReactionError::InvalidSelection { option: 3 });
}

#[test]
fn multi_beam_selection_repeats_the_attacker() {
    let mut harness = Harness::new();
    harness.registry.register_ability(Ability {
        id: AbilityId(400),
        name: "Splintering Ray".to_string(),
        activation: ActivationWindow::Action,
        cost: CostPolicy::None,
        effect: EffectDescription {
            damage: Some(DamageForm::new(DamageType::Radiant, 1, DieType::D6)),
            condition: None,
            targets: TargetSpec::repeating(3),
            particles: ParticleParameters::default(),
        },
        use_predicate: None,
    });

    let mut caster = reactive_adept(6, 4);
    caster.ready_abilities = vec![AbilityId(400)];
    let state = battle_with(caster);
    let env = harness.env();

    let mut request = ReactionRequest::new(ADEPT, BRUTE, ActionModifier::default());
    request.build_candidates(&state, &env);
    request.select_sub_option(1, &state, &env).unwrap();

    assert_eq!(request.targets(), &[BRUTE, BRUTE, BRUTE]);

    // Falling back to the baseline restores the single forced target.
    request.select_sub_option(0, &state, &env).unwrap();
    assert_eq!(request.targets(), &[BRUTE]);
}

#[test]
fn downed_attacker_stales_the_negotiation() {
    let harness = Harness::new();
    let mut state = battle_with(reactive_adept(6, 4));
    let env = harness.env();

    let mut request = ReactionRequest::new(ADEPT, BRUTE, ActionModifier::default());
    request.build_candidates(&state, &env);
    request.select_sub_option(1, &state, &env).unwrap();

    state.combatant_mut(BRUTE).unwrap().life = LifeState::Dying;
    assert!(!request.is_still_valid(&state, &env));

    let err = request.select_sub_option(1, &state, &env).unwrap_err();
    assert_eq!(err, ReactionError::StaleRequest);
    match request.resolved() {
        ResolvedReaction::Ability(instance) => assert!(instance.is_terminated()),
        ResolvedReaction::Baseline => panic!("expected the terminated ability effect"),
    }
}
