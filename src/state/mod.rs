pub mod blame;
mod flow;
pub mod history;
mod player;
pub mod round;
pub mod round_builder;
pub mod turn;

use crate::config::EngineConfig;
use crate::content::{Catalog, ContentProvider};
use crate::protocol::{CategoryView, Notice, PromptView, ViewState};
use crate::store::{self, KeyValueStore};
use crate::types::*;
use blame::{BlameLog, RoundSummary};
use history::PlayedHistory;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use turn::TurnState;

/// Mutable game state, owned by the [`Engine`] and only changed through it
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) screen: Screen,
    pub(crate) settings: GameSettings,
    pub(crate) roster: Vec<Player>,
    pub(crate) history: PlayedHistory,
    pub(crate) blame_log: BlameLog,
    pub(crate) turn: Option<TurnState>,
    pub(crate) summary: Option<RoundSummary>,
    pub(crate) notice: Option<Notice>,
    pub(crate) degraded: bool,
    /// Bumped whenever a pending round build must be ignored
    pub(crate) load_epoch: u64,
    pub(crate) build_in_flight: bool,
}

/// Flow controller: sequences screens and owns all game state.
///
/// Game state is only reachable through the engine's operations:
///
/// ```compile_fail
/// # async fn rewrite(engine: blamegame::state::Engine) {
/// engine.session.write().await.screen = blamegame::types::Screen::Summary;
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    pub(crate) session: Arc<RwLock<Session>>,
    /// Catalog for the active language, loaded on first use
    catalog: Arc<RwLock<Option<Arc<Catalog>>>>,
    content: Arc<dyn ContentProvider>,
    store: Arc<dyn KeyValueStore>,
    config: Arc<EngineConfig>,
    pending_build: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Receives a fresh view after every transition
    view_broadcast: broadcast::Sender<ViewState>,
}

impl Engine {
    /// Create an engine, restoring settings, roster, history and the last
    /// blame log from the store
    pub fn new(
        content: Arc<dyn ContentProvider>,
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
    ) -> Self {
        let session = Session {
            screen: Screen::Intro,
            settings: store::load_or_default(store.as_ref(), store::SETTINGS_KEY),
            roster: store::load_or_default(store.as_ref(), store::PLAYERS_KEY),
            history: store::load_or_default(store.as_ref(), store::PLAYED_HISTORY_KEY),
            blame_log: store::load_or_default(store.as_ref(), store::BLAME_LOG_KEY),
            turn: None,
            summary: None,
            notice: None,
            degraded: false,
            load_epoch: 0,
            build_in_flight: false,
        };

        tracing::info!(
            "Engine ready: {} players, {} played prompts, content from {}",
            session.roster.len(),
            session.history.len(),
            content.name()
        );

        let (tx, _rx) = broadcast::channel(64);
        Self {
            session: Arc::new(RwLock::new(session)),
            catalog: Arc::new(RwLock::new(None)),
            content,
            store,
            config: Arc::new(config),
            pending_build: Arc::new(Mutex::new(None)),
            view_broadcast: tx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewState> {
        self.view_broadcast.subscribe()
    }

    pub async fn screen(&self) -> Screen {
        self.session.read().await.screen
    }

    /// Prompts of the running round in play order, if a round is running
    pub async fn round_prompts(&self) -> Option<Vec<Prompt>> {
        let session = self.session.read().await;
        session.turn.as_ref().map(|t| t.round().prompts().to_vec())
    }

    pub async fn history(&self) -> PlayedHistory {
        self.session.read().await.history.clone()
    }

    pub async fn blame_log(&self) -> BlameLog {
        self.session.read().await.blame_log.clone()
    }

    /// True while a round build started by `start`/`confirm` is pending
    pub async fn build_in_flight(&self) -> bool {
        self.session.read().await.build_in_flight
    }

    /// Catalog for `language`, fetched on first use and cached until the
    /// active language changes
    pub async fn ensure_catalog(&self, language: &str) -> Arc<Catalog> {
        if let Some(catalog) = self.catalog.read().await.as_ref() {
            if catalog.language == language {
                return catalog.clone();
            }
        }

        let catalog = Arc::new(
            crate::content::load_catalog(
                self.content.as_ref(),
                language,
                &self.config.fallback_language,
            )
            .await,
        );

        // only cache if the language is still the active one
        if self.session.read().await.settings.language == language {
            *self.catalog.write().await = Some(catalog.clone());
        }
        catalog
    }

    async fn cached_catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().await.clone()
    }

    async fn discard_catalog(&self) {
        *self.catalog.write().await = None;
    }

    pub(crate) fn persist_settings(&self, session: &Session) {
        store::save(self.store.as_ref(), store::SETTINGS_KEY, &session.settings);
    }

    pub(crate) fn persist_roster(&self, session: &Session) {
        store::save(self.store.as_ref(), store::PLAYERS_KEY, &session.roster);
    }

    pub(crate) fn persist_history(&self, session: &Session) {
        store::save(self.store.as_ref(), store::PLAYED_HISTORY_KEY, &session.history);
    }

    pub(crate) fn persist_blame_log(&self, session: &Session) {
        store::save(self.store.as_ref(), store::BLAME_LOG_KEY, &session.blame_log);
    }

    /// Surface an error to the presentation layer
    pub async fn report(&self, err: &crate::error::GameError) {
        self.session.write().await.notice = Some(Notice::from(err));
        self.publish().await;
    }

    pub async fn clear_notice(&self) {
        self.session.write().await.notice = None;
    }

    /// Snapshot for the presentation layer
    pub async fn view(&self) -> ViewState {
        let catalog = self.cached_catalog().await;
        let session = self.session.read().await;
        let language = session.settings.language.as_str();
        let fallback = self.config.fallback_language.as_str();

        let categories = catalog
            .as_ref()
            .filter(|c| c.language == language)
            .map(|catalog| {
                catalog
                    .eligible_categories()
                    .map(|c| CategoryView {
                        id: c.id.clone(),
                        name: c.display_name(language, fallback).to_string(),
                        emoji: c.emoji.clone(),
                        prompt_count: catalog.prompts(&c.id).len(),
                        selected: session.settings.selected_categories.contains(&c.id),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let playing = session.screen == Screen::Playing;
        let turn = session.turn.as_ref().filter(|_| playing);

        let prompt = turn.map(|turn| {
            let round = turn.round();
            let prompt = round.current();
            let category = round.category_of(prompt);
            PromptView {
                key: prompt.key(),
                text: prompt.text.clone(),
                category_id: prompt.category_id.clone(),
                category_name: category
                    .map(|c| c.display_name(language, fallback).to_string())
                    .unwrap_or_else(|| prompt.category_id.clone()),
                category_emoji: category.map(|c| c.emoji.clone()).unwrap_or_default(),
                index: round.cursor(),
                total: round.len(),
            }
        });

        ViewState {
            screen: session.screen,
            settings: session.settings.clone(),
            roster: session.roster.clone(),
            categories,
            prompt,
            turn_order: turn.map(|t| t.order().to_vec()).unwrap_or_default(),
            current_player_index: turn.and_then(|t| t.current_player_index()),
            blame_round: turn
                .filter(|t| t.mode() == GameMode::NameBlame)
                .map(|t| t.blame_state().clone()),
            summary: session
                .summary
                .clone()
                .filter(|_| session.screen == Screen::Summary),
            notice: session.notice.clone(),
            degraded: session.degraded,
        }
    }

    /// Send the current view to subscribers
    pub async fn publish(&self) {
        let view = self.view().await;
        // no subscribers is fine
        let _ = self.view_broadcast.send(view);
    }

    /// Wait for a pending round build, if any
    pub async fn settle(&self) {
        let handle = self.pending_build.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("Round build task failed: {}", e);
            }
        }
    }
}
