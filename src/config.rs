use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MIN_LOADING_MS: u64 = 2000;
const DEFAULT_FALLBACK_LANGUAGE: &str = "en";

/// Engine configuration, usually loaded from the environment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Floor for how long the loading screen stays up
    pub min_loading_duration: Duration,
    /// Language used when content is missing in the active language
    pub fallback_language: String,
    /// Substitute built-in prompts when no content could be loaded
    pub degraded_fallback: bool,
    /// Directory holding JSON content (categories.json + <lang>/<category>.json)
    pub content_dir: Option<PathBuf>,
    /// File backing the persistent key-value store
    pub store_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_loading_duration: Duration::from_millis(DEFAULT_MIN_LOADING_MS),
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            degraded_fallback: true,
            content_dir: None,
            store_path: None,
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let min_loading_duration = non_blank_var("BLAMEGAME_MIN_LOADING_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_MIN_LOADING_MS));

        let fallback_language = non_blank_var("BLAMEGAME_FALLBACK_LANGUAGE")
            .unwrap_or_else(|| DEFAULT_FALLBACK_LANGUAGE.to_string());

        let degraded_fallback = non_blank_var("BLAMEGAME_DEGRADED_FALLBACK")
            .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            min_loading_duration,
            fallback_language,
            degraded_fallback,
            content_dir: non_blank_var("BLAMEGAME_CONTENT_DIR").map(PathBuf::from),
            store_path: non_blank_var("BLAMEGAME_STORE_PATH").map(PathBuf::from),
        }
    }
}

const DEFAULT_SIMULATED_PLAYERS: &[&str] = &["Alice", "Bob", "Carol"];

/// Settings for the headless simulator binary
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Roster added when the store has no active players
    pub players: Vec<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            players: DEFAULT_SIMULATED_PLAYERS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl SimulatorConfig {
    /// Load from `BLAMEGAME_PLAYERS`, a comma-separated list of names
    pub fn from_env() -> Self {
        let players: Vec<String> = non_blank_var("BLAMEGAME_PLAYERS")
            .map(|value| {
                value
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if players.is_empty() {
            Self::default()
        } else {
            Self { players }
        }
    }
}
