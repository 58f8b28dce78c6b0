//! Environment availability errors.

use crate::error::{CombatError, ErrorSeverity};

/// Raised when an entry point needs an oracle the host did not supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("battle oracle not available")]
    BattleNotAvailable,

    #[error("content oracle not available")]
    ContentNotAvailable,
}

impl CombatError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleNotAvailable => "ENV_BATTLE_NOT_AVAILABLE",
            Self::ContentNotAvailable => "ENV_CONTENT_NOT_AVAILABLE",
        }
    }
}
