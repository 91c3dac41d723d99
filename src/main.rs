use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blamegame::config::{EngineConfig, SimulatorConfig};
use blamegame::content::{ContentProvider, FsContentProvider, StaticContentProvider};
use blamegame::dispatch::handle_intent;
use blamegame::protocol::{Intent, ViewState};
use blamegame::state::Engine;
use blamegame::store::{JsonFileStore, KeyValueStore, MemoryStore};
use blamegame::types::{BlamePhase, GameMode, Player, Screen};

// Upper bound on intents for one simulated game
const MAX_STEPS: usize = 1000;

fn pick_target(order: &[Player], blamer: &str) -> Option<String> {
    let candidates: Vec<&Player> = order.iter().filter(|p| p.name != blamer).collect();
    candidates.choose(&mut rand::rng()).map(|p| p.name.clone())
}

/// Drive one NameBlame game from the intro to the summary
async fn play(engine: &Engine) -> Option<ViewState> {
    let mut view = handle_intent(Intent::Start, engine).await;

    for _ in 0..MAX_STEPS {
        if let Some(notice) = &view.notice {
            tracing::info!("[{}] {}", notice.code, notice.msg);
        }

        let intent = match view.screen {
            Screen::CategoryPick => match view.categories.iter().find(|c| !c.selected) {
                Some(category) if view.settings.selected_categories.len() < view.settings.category_count => {
                    Intent::ToggleCategory {
                        category_id: category.id.clone(),
                    }
                }
                _ => Intent::Confirm,
            },
            Screen::PlayerSetup => {
                if view.notice.is_some() {
                    tracing::error!("Player setup refused, giving up");
                    return None;
                }
                Intent::Confirm
            }
            Screen::Loading => {
                engine.settle().await;
                view = engine.view().await;
                continue;
            }
            Screen::Playing => match (&view.prompt, &view.blame_round) {
                (Some(prompt), Some(round)) if round.phase == BlamePhase::Selecting => {
                    let blamer = view
                        .current_player_index
                        .and_then(|i| view.turn_order.get(i))
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    let target = pick_target(&view.turn_order, &blamer)?;
                    tracing::info!("{}/{} \"{}\"", prompt.index + 1, prompt.total, prompt.text);
                    Intent::SelectTarget { name: target }
                }
                (_, Some(_)) => Intent::AcknowledgeReveal,
                _ => Intent::Advance,
            },
            Screen::Summary => return Some(view),
            Screen::Intro => {
                tracing::error!("Game returned to the intro screen");
                return None;
            }
        };

        view = handle_intent(intent, engine).await;
    }

    tracing::error!("Game did not finish within {} steps", MAX_STEPS);
    None
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blamegame=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blame game simulator...");

    let config = EngineConfig::from_env();
    let simulator = SimulatorConfig::from_env();

    let content: Arc<dyn ContentProvider> = match &config.content_dir {
        Some(dir) => Arc::new(FsContentProvider::new(dir.clone())),
        None => Arc::new(StaticContentProvider::sample()),
    };
    let store: Arc<dyn KeyValueStore> = match &config.store_path {
        Some(path) => Arc::new(JsonFileStore::open(path)),
        None => Arc::new(MemoryStore::new()),
    };

    let engine = Engine::new(content, store, config);

    handle_intent(
        Intent::SetMode {
            mode: GameMode::NameBlame,
        },
        &engine,
    )
    .await;
    if engine.active_players().await.is_empty() {
        for name in simulator.players {
            handle_intent(Intent::AddPlayer { name }, &engine).await;
        }
    }

    let Some(view) = play(&engine).await else {
        std::process::exit(1);
    };
    let Some(summary) = view.summary else {
        return;
    };

    tracing::info!("Prompts played: {}", summary.prompts_played);
    for entry in &summary.blame_counts {
        tracing::info!(
            "{}: blamed {} times ({:?})",
            entry.name,
            entry.count,
            entry.blamed_by
        );
    }
    tracing::info!("Most blamed: {}", summary.most_blamed.join(", "));
}
