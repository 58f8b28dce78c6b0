/// Tuning constants and tunable parameters for the resolution core.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreTuning {
    /// Number of stacked condition instances that fires the derived effect.
    pub stack_threshold: u32,

    /// Default duration, in rounds, of a condition applied by a qualifying hit.
    pub condition_rounds: u32,
}

impl CoreTuning {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of active condition instances on one combatant.
    pub const MAX_ACTIVE_CONDITIONS: usize = 32;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STACK_THRESHOLD: u32 = 3;
    /// One minute of combat at the conventional six-second round.
    pub const DEFAULT_CONDITION_ROUNDS: u32 = 10;

    pub fn new() -> Self {
        Self {
            stack_threshold: Self::DEFAULT_STACK_THRESHOLD,
            condition_rounds: Self::DEFAULT_CONDITION_ROUNDS,
        }
    }
}

impl Default for CoreTuning {
    fn default() -> Self {
        Self::new()
    }
}
