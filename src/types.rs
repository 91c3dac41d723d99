use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Opaque ID types for type safety
pub type CategoryId = String;
pub type PromptId = String;
pub type PlayerId = String;
pub type LanguageCode = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    #[default]
    Classic,
    NameBlame,
}

impl GameMode {
    /// Minimum number of active players needed to leave player setup
    pub fn min_players(self) -> usize {
        match self {
            GameMode::Classic => 0,
            GameMode::NameBlame => 3,
        }
    }
}

/// Top-level screen the flow controller is on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    Intro,
    CategoryPick,
    PlayerSetup,
    Loading,
    Playing,
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    /// Display name per language code
    #[serde(default)]
    pub name: HashMap<LanguageCode, String>,
    #[serde(default)]
    pub emoji: String,
}

impl Category {
    /// Resolve the display name: active language, then fallback language,
    /// then any translation, then the bare id.
    pub fn display_name(&self, language: &str, fallback_language: &str) -> &str {
        self.name
            .get(language)
            .or_else(|| self.name.get(fallback_language))
            .or_else(|| {
                // deterministic pick among the remaining translations
                let mut langs: Vec<_> = self.name.keys().collect();
                langs.sort();
                langs.first().and_then(|l| self.name.get(*l))
            })
            .map(String::as_str)
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    pub id: PromptId,
    pub category_id: CategoryId,
    /// Already localized for the language the catalog was loaded in
    pub text: String,
}

impl Prompt {
    /// Stable identity across categories (ids are only unique per category)
    pub fn key(&self) -> String {
        format!("{}/{}", self.category_id, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// A player only takes part once they have a non-blank name
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// One confirmed blame action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlameEntry {
    pub from: String,
    pub to: String,
    pub prompt_text: String,
    /// ISO8601 timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlamePhase {
    #[default]
    Selecting,
    Reveal,
}

/// Sub-state of the current prompt in NameBlame mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BlameRoundState {
    pub prompt_key: Option<String>,
    pub phase: BlamePhase,
    pub current_blamer: Option<String>,
    pub current_blamed: Option<String>,
    pub acted_this_prompt: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub category_count: usize,
    pub prompts_per_category: usize,
    pub mode: GameMode,
    pub language: LanguageCode,
    pub category_selection_enabled: bool,
    #[serde(default)]
    pub selected_categories: Vec<CategoryId>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            category_count: 5,
            prompts_per_category: 8,
            mode: GameMode::Classic,
            language: "en".to_string(),
            category_selection_enabled: false,
            selected_categories: Vec::new(),
        }
    }
}

impl GameSettings {
    /// Upper bound on the number of prompts a round can hold
    pub fn max_round_len(&self) -> usize {
        self.category_count.max(1) * self.prompts_per_category.max(1)
    }
}
