//! The Resonance discipline.
//!
//! An Adept subclass built around the stacking-strike mechanic: qualifying
//! melee and unarmed hits leave a Resonance stack on the target, and the
//! third stack detonates as a Resonant Burst scaled by the Adept's rank.
//! From rank 6 the discipline also marks victims with a Fracture Echo;
//! acting against a marked target whose mark is about to lapse converts the
//! lapse into one more Resonance stack.
//!
//! The discipline draws on the shared Focus pool: six ascending-tier
//! abilities, each costing its tier in Focus points and individually gated
//! on proficiency bonus.

use combat_core::{
    Ability, AbilityBundle, AbilityId, ActivationWindow, AttributeKind, AuxStacking, ClassKind,
    Combatant, CombatHook, ConditionDefinition, ConditionId, CostPolicy, DamageForm, DamageType,
    DieByRankTable, DieType, EffectDescription, EntityId, Faction, ParticleParameters, ParticleRef,
    PoolId, ResourcePool, ResourcePoolManager, StackingStrikeHook, StrikeFilter, TargetSpec,
    TriggerDispatcher, UsePredicate,
};

// ===== identifiers =====

pub const CONDITION_RESONANCE: ConditionId = ConditionId(101);
pub const CONDITION_FRACTURE_ECHO: ConditionId = ConditionId(102);

pub const ABILITY_RESONANT_BURST: AbilityId = AbilityId(201);
/// Tier N Focus ability has id `ABILITY_FOCUS_BASE + N`, N in 1..=6.
pub const ABILITY_FOCUS_BASE: u32 = 210;
pub const FOCUS_TIERS: u32 = 6;

pub const FOCUS_POOL: PoolId = PoolId(1);

pub const PARTICLE_BURST: ParticleRef = ParticleRef(301);
pub const PARTICLE_BURST_ON_CONDITION: ParticleRef = ParticleRef(302);

/// Rank at which the Fracture Echo stacking rule unlocks.
pub const ECHO_UNLOCK_RANK: u32 = 6;

/// Id of the tier-N Focus ability.
pub const fn focus_ability_id(tier: u32) -> AbilityId {
    AbilityId(ABILITY_FOCUS_BASE + tier)
}

/// Strike die progression shared by the discipline's derived effects.
pub fn strike_die_table() -> DieByRankTable {
    DieByRankTable::from_rows(&[
        (1, DieType::D4),
        (5, DieType::D6),
        (11, DieType::D8),
        (17, DieType::D10),
    ])
}

fn resonance_condition() -> ConditionDefinition {
    ConditionDefinition {
        id: CONDITION_RESONANCE,
        name: "Resonance".to_string(),
        detrimental: true,
        // Stacks churn constantly; expiry spam would drown the combat log.
        silent_when_removed: true,
        allow_multiple_instances: true,
    }
}

fn fracture_echo_condition() -> ConditionDefinition {
    ConditionDefinition {
        id: CONDITION_FRACTURE_ECHO,
        name: "Fracture Echo".to_string(),
        detrimental: true,
        silent_when_removed: false,
        allow_multiple_instances: false,
    }
}

fn resonant_burst() -> Ability {
    Ability {
        id: ABILITY_RESONANT_BURST,
        name: "Resonant Burst".to_string(),
        activation: ActivationWindow::NoCost,
        cost: CostPolicy::None,
        effect: EffectDescription {
            // Die size and flat bonus are rewritten per firing from the
            // attacker's rank and proficiency.
            damage: Some(DamageForm::new(DamageType::Psychic, 1, DieType::D4)),
            condition: None,
            targets: TargetSpec::single(),
            particles: ParticleParameters {
                target: PARTICLE_BURST,
                condition_start: PARTICLE_BURST_ON_CONDITION,
            },
        },
        use_predicate: None,
    }
}

/// The six Focus abilities in ascending tier order.
pub fn focus_abilities() -> Vec<Ability> {
    (1..=FOCUS_TIERS)
        .map(|tier| Ability {
            id: focus_ability_id(tier),
            name: format!("Focused Strike {tier}"),
            activation: ActivationWindow::Action,
            cost: CostPolicy::SharedPool {
                pool: FOCUS_POOL,
                tier,
            },
            effect: EffectDescription {
                damage: Some(DamageForm::new(DamageType::Psychic, tier, DieType::D6)),
                condition: None,
                targets: TargetSpec::single(),
                particles: ParticleParameters::default(),
            },
            use_predicate: Some(UsePredicate::tier_gated(
                FOCUS_POOL,
                AttributeKind::ProficiencyBonus,
                tier,
            )),
        })
        .collect()
}

/// The discipline's stacking-strike hook.
pub fn hook() -> StackingStrikeHook {
    StackingStrikeHook {
        class: ClassKind::Adept,
        primary: CONDITION_RESONANCE,
        derived: ABILITY_RESONANT_BURST,
        strikes: StrikeFilter::UNARMED | StrikeFilter::MELEE_WEAPON,
        aux: Some(AuxStacking {
            condition: CONDITION_FRACTURE_ECHO,
            min_class_level: ECHO_UNLOCK_RANK,
        }),
    }
}

/// Registers the discipline's content, pool bundle, and trigger hook.
pub fn install(
    registry: &mut crate::ContentRegistry,
    pools: &mut ResourcePoolManager,
    dispatcher: &mut TriggerDispatcher,
) {
    registry.register_condition(resonance_condition());
    registry.register_condition(fracture_echo_condition());
    registry.register_ability(resonant_burst());
    for ability in focus_abilities() {
        registry.register_ability(ability);
    }
    registry.set_strike_table(strike_die_table());

    pools.register_bundle(AbilityBundle {
        pool: FOCUS_POOL,
        abilities: (1..=FOCUS_TIERS).map(focus_ability_id).collect(),
    });

    dispatcher.register(CombatHook::StackingStrike(hook()));
}

/// Builds a combat-ready Adept of the discipline.
///
/// The Focus pool maximum equals the Adept rank, and every tier ability is
/// readied; per-use eligibility is enforced by the tier predicates.
pub fn adept(id: EntityId, name: impl Into<String>, rank: u32, proficiency: i32) -> Combatant {
    let mut combatant = Combatant::new(id, name, Faction::Party)
        .with_class_level(ClassKind::Adept, rank)
        .with_attribute(AttributeKind::ProficiencyBonus, proficiency);
    combatant.pools.insert(FOCUS_POOL, ResourcePool::full(rank));
    combatant.ready_abilities = (1..=FOCUS_TIERS).map(focus_ability_id).collect();
    combatant
}
