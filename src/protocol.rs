use crate::error::GameError;
use crate::state::blame::RoundSummary;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// User intents sent by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Intent {
    Start,
    Confirm,
    SelectTarget {
        name: String,
    },
    AcknowledgeReveal,
    Advance,
    GoBack,
    ChangeLanguage {
        code: LanguageCode,
    },
    Restart,
    /// Title/logo click: abandon whatever is in progress
    GoHome,
    // Setup
    AddPlayer {
        name: String,
    },
    RenamePlayer {
        player_id: PlayerId,
        name: String,
    },
    RemovePlayer {
        player_id: PlayerId,
    },
    SetMode {
        mode: GameMode,
    },
    SetRoundSize {
        category_count: usize,
        prompts_per_category: usize,
    },
    SetCategorySelection {
        enabled: bool,
    },
    ToggleCategory {
        category_id: CategoryId,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Validation,
    Error,
}

/// User-visible, non-fatal message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub code: String,
    pub msg: String,
}

impl Notice {
    pub fn info(code: &str, msg: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

impl From<&GameError> for Notice {
    fn from(err: &GameError) -> Self {
        Self {
            kind: if err.is_validation() {
                NoticeKind::Validation
            } else {
                NoticeKind::Error
            },
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// The active prompt with its category resolved for the active language
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptView {
    pub key: String,
    pub text: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_emoji: String,
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub emoji: String,
    pub prompt_count: usize,
    pub selected: bool,
}

/// Everything the presentation layer needs after a transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewState {
    pub screen: Screen,
    pub settings: GameSettings,
    pub roster: Vec<Player>,
    /// Categories offered on the pick screen (empty until the catalog loads)
    pub categories: Vec<CategoryView>,
    pub prompt: Option<PromptView>,
    pub turn_order: Vec<Player>,
    pub current_player_index: Option<usize>,
    pub blame_round: Option<BlameRoundState>,
    pub summary: Option<RoundSummary>,
    pub notice: Option<Notice>,
    /// Built-in prompts are in use because no content loaded
    pub degraded: bool,
}
