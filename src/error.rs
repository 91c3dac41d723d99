//! Error taxonomy for the game engine.
//!
//! None of these are fatal: every failure maps to a defined screen transition
//! or a refused intent, and is surfaced to the presentation layer as a notice.

use crate::types::{BlamePhase, GameMode, Screen};
use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A category or its prompts could not be fetched
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    /// Round preparation produced no prompts after all fallbacks
    #[error("no prompts available for this round")]
    NoContentAvailable,

    #[error("need at least {required} players with a name, have {active}")]
    InvalidSetup { required: usize, active: usize },

    #[error("player name '{0}' is used more than once")]
    DuplicatePlayerName(String),

    /// Turn order was empty when a turn operation ran
    #[error("turn order is empty")]
    InconsistentTurnState,

    #[error("cannot {action} on the {screen:?} screen")]
    InvalidTransition { action: &'static str, screen: Screen },

    #[error("select at least one category")]
    NoCategorySelected,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("blame round is not in the {expected:?} phase")]
    WrongPhase { expected: BlamePhase },

    #[error("cannot {action} in {mode:?} mode")]
    WrongMode { action: &'static str, mode: GameMode },

    #[error("'{0}' is not in the turn order")]
    UnknownPlayer(String),

    #[error("'{0}' cannot blame themselves")]
    SelfBlame(String),

    #[error("no player with id '{0}'")]
    UnknownPlayerId(String),
}

impl GameError {
    /// Stable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            GameError::ContentUnavailable(_) => "CONTENT_UNAVAILABLE",
            GameError::NoContentAvailable => "NO_CONTENT_AVAILABLE",
            GameError::InvalidSetup { .. } => "INVALID_SETUP",
            GameError::DuplicatePlayerName(_) => "DUPLICATE_PLAYER_NAME",
            GameError::InconsistentTurnState => "INCONSISTENT_TURN_STATE",
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::NoCategorySelected => "NO_CATEGORY_SELECTED",
            GameError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            GameError::WrongPhase { .. } => "WRONG_PHASE",
            GameError::WrongMode { .. } => "WRONG_MODE",
            GameError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            GameError::SelfBlame(_) => "SELF_BLAME",
            GameError::UnknownPlayerId(_) => "UNKNOWN_PLAYER_ID",
        }
    }

    /// Validation problems the user can fix, as opposed to content or
    /// internal failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GameError::InvalidSetup { .. }
                | GameError::DuplicatePlayerName(_)
                | GameError::NoCategorySelected
                | GameError::SelfBlame(_)
        )
    }
}
