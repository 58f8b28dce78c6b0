//! Immutable ability records supplied by the content registry.
//!
//! An ability is a named capability with a cost policy, an effect
//! description, and optional eligibility predicates. Records are shared by
//! reference across every combatant that can use them and never change
//! after registration. Pooled abilities carry their tier as a structured
//! field; nothing in the core recovers a tier from a name.

use crate::pool::PoolId;
use crate::state::{AttributeKind, Combatant, ConditionId};

/// Unique identifier for an ability record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u32);

impl core::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// When an ability can be activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationWindow {
    Action,
    BonusAction,
    Reaction,
    /// Fired by the engine itself, never selected by a player.
    NoCost,
}

impl ActivationWindow {
    /// Instantaneous windows that qualify an ability for substitution into
    /// a reaction menu.
    pub const fn fits_reaction_window(self) -> bool {
        matches!(self, Self::Action | Self::BonusAction)
    }
}

/// How an ability is paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostPolicy {
    /// At-will; no resource involved.
    None,

    /// Limited uses refreshed on a rest boundary, tracked by the host.
    FixedUses(u32),

    /// Draws `tier` points from a shared pool.
    SharedPool { pool: PoolId, tier: u32 },
}

impl CostPolicy {
    /// The pool this policy draws from, if any.
    pub const fn pool(&self) -> Option<PoolId> {
        match self {
            Self::SharedPool { pool, .. } => Some(*pool),
            _ => None,
        }
    }

    /// The tier cost of this policy, if pooled.
    pub const fn tier(&self) -> Option<u32> {
        match self {
            Self::SharedPool { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}

/// Damage die sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl DieType {
    pub const fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
        }
    }
}

/// Damage categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Bludgeoning,
    Piercing,
    Slashing,
    Psychic,
    Necrotic,
    Radiant,
}

/// Dice expression for one damage component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageForm {
    pub damage_type: DamageType,
    pub dice_number: u32,
    pub die: DieType,
    /// Flat bonus added to the roll. Triggers rewrite this when scaling a
    /// derived effect by actor state.
    pub bonus_damage: i32,
}

impl DamageForm {
    pub const fn new(damage_type: DamageType, dice_number: u32, die: DieType) -> Self {
        Self {
            damage_type,
            dice_number,
            die,
            bonus_damage: 0,
        }
    }
}

/// What an effect does to a condition on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionOperation {
    Add,
    Remove,
}

/// Condition component of an effect description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionForm {
    pub condition: ConditionId,
    pub operation: ConditionOperation,
}

/// Targeting shape of an effect.
///
/// `capacity` is the natural target parameter: how many target entries the
/// materialized effect expects. A single-target effect with capacity above
/// one repeats against the same target (multi-beam style), it never
/// redirects to new targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSpec {
    pub capacity: u32,
    pub single_target: bool,
}

impl TargetSpec {
    /// One target, one entry.
    pub const fn single() -> Self {
        Self {
            capacity: 1,
            single_target: true,
        }
    }

    /// Single-target effect that repeats up to `capacity` times.
    pub const fn repeating(capacity: u32) -> Self {
        Self {
            capacity,
            single_target: true,
        }
    }

    /// Area effect touching up to `capacity` distinct targets.
    pub const fn area(capacity: u32) -> Self {
        Self {
            capacity,
            single_target: false,
        }
    }
}

/// Opaque handle to a visual effect asset owned by the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleRef(pub u32);

/// Visual parameters carried by an effect description.
///
/// The core never renders these; it only swaps which reference a derived
/// effect carries so the presentation layer shows condition-linked visuals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleParameters {
    pub target: ParticleRef,
    pub condition_start: ParticleRef,
}

/// Everything an ability does when it lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDescription {
    pub damage: Option<DamageForm>,
    pub condition: Option<ConditionForm>,
    pub targets: TargetSpec,
    pub particles: ParticleParameters,
}

impl EffectDescription {
    /// Effect with no components; useful as a builder seed.
    pub const fn none() -> Self {
        Self {
            damage: None,
            condition: None,
            targets: TargetSpec::single(),
            particles: ParticleParameters {
                target: ParticleRef(0),
                condition_start: ParticleRef(0),
            },
        }
    }
}

/// Secondary eligibility check for a pooled ability.
///
/// Both the pool counter and a gate attribute must each reach a minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsePredicate {
    pub pool: PoolId,
    pub min_counter: u32,
    pub gate: AttributeKind,
    pub min_gate: i32,
}

impl UsePredicate {
    /// The common tier gate: counter >= tier AND attribute >= tier.
    pub const fn tier_gated(pool: PoolId, gate: AttributeKind, tier: u32) -> Self {
        Self {
            pool,
            min_counter: tier,
            gate,
            min_gate: tier as i32,
        }
    }
}

/// A named capability shared by reference across combatants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub activation: ActivationWindow,
    pub cost: CostPolicy,
    pub effect: EffectDescription,
    pub use_predicate: Option<UsePredicate>,
}

impl Ability {
    /// Returns true if the combatant currently satisfies this ability's
    /// eligibility predicate. Abilities without a predicate are always
    /// usable at this boundary.
    pub fn can_use(&self, combatant: &Combatant) -> bool {
        match &self.use_predicate {
            Some(predicate) => crate::pool::ResourcePoolManager::is_eligible(combatant, predicate),
            None => true,
        }
    }
}

/// Die size progression keyed by class rank.
///
/// Rows cover contiguous rank ranges; lookup returns the row whose range
/// contains the rank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieByRankTable {
    rows: Vec<(u32, DieType)>,
}

impl DieByRankTable {
    /// Builds a table from (first rank, die) rows. Rows must be given in
    /// ascending rank order.
    pub fn from_rows(rows: &[(u32, DieType)]) -> Self {
        Self {
            rows: rows.to_vec(),
        }
    }

    /// Die size for a rank, or None for ranks below the first row.
    pub fn die_for_rank(&self, rank: u32) -> Option<DieType> {
        self.rows
            .iter()
            .rev()
            .find(|(first_rank, _)| rank >= *first_rank)
            .map(|(_, die)| *die)
    }
}
