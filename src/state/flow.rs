//! Screen sequencing: intro -> (category pick) -> (player setup) -> loading ->
//! playing -> summary, plus the asynchronous round build behind `loading`.

use super::blame::{BlameLog, RoundSummary};
use super::history::PlayedHistory;
use super::player::{active_players, validate_roster};
use super::round::{Round, RoundPlan};
use super::round_builder;
use super::turn::{Advance, TurnState};
use super::{Engine, Session};
use crate::content::Catalog;
use crate::error::{GameError, GameResult};
use crate::protocol::Notice;
use crate::types::*;

fn build_with_thread_rng(
    catalog: &Catalog,
    settings: &GameSettings,
    history: &mut PlayedHistory,
) -> GameResult<RoundPlan> {
    let mut rng = rand::rng();
    round_builder::build_round(catalog, settings, history, &mut rng)
}

fn fallback_with_thread_rng(language: &str) -> RoundPlan {
    let mut rng = rand::rng();
    round_builder::fallback_plan(language, &mut rng)
}

/// Inputs of one round build, captured when loading is entered
struct BuildJob {
    epoch: u64,
    settings: GameSettings,
    history: PlayedHistory,
}

fn require_screen(session: &Session, screen: Screen, action: &'static str) -> GameResult<()> {
    if session.screen == screen {
        Ok(())
    } else {
        Err(GameError::InvalidTransition {
            action,
            screen: session.screen,
        })
    }
}

/// Settings can change anywhere except while a round is loading or running
fn require_settings_editable(session: &Session, action: &'static str) -> GameResult<()> {
    match session.screen {
        Screen::Loading | Screen::Playing => Err(GameError::InvalidTransition {
            action,
            screen: session.screen,
        }),
        _ => Ok(()),
    }
}

/// Turn state for the running round, or an error naming the current screen
fn playing_turn<'a>(
    turn: &'a mut Option<TurnState>,
    screen: Screen,
    action: &'static str,
) -> GameResult<&'a mut TurnState> {
    match turn.as_mut() {
        Some(turn) if screen == Screen::Playing => Ok(turn),
        _ => Err(GameError::InvalidTransition { action, screen }),
    }
}

impl Engine {
    /// Leave the intro screen
    pub async fn start(&self) -> GameResult<Screen> {
        let (next, job, language) = {
            let mut session = self.session.write().await;
            if session.build_in_flight {
                tracing::warn!("Ignoring start while a round is being prepared");
                return Ok(session.screen);
            }
            require_screen(&session, Screen::Intro, "start a game")?;

            session.summary = None;
            session.degraded = false;
            let next = match (session.settings.mode, session.settings.category_selection_enabled) {
                (_, true) => Screen::CategoryPick,
                (GameMode::NameBlame, false) => Screen::PlayerSetup,
                (GameMode::Classic, false) => Screen::Loading,
            };

            let job = if next == Screen::Loading {
                Some(Self::enter_loading(&mut session))
            } else {
                session.screen = next;
                None
            };
            (next, job, session.settings.language.clone())
        };

        tracing::info!("Start -> {:?}", next);
        if let Some(job) = job {
            self.spawn_build(job).await;
        } else if next == Screen::CategoryPick {
            self.ensure_catalog(&language).await;
        }
        self.publish().await;
        Ok(next)
    }

    /// Confirm the category pick or the player setup
    pub async fn confirm(&self) -> GameResult<Screen> {
        let (next, job) = {
            let mut guard = self.session.write().await;
            let session = &mut *guard;

            match session.screen {
                Screen::PlayerSetup => {
                    let players = validate_roster(&session.roster, session.settings.mode)?;
                    tracing::info!("Player setup confirmed with {} players", players.len());
                    (Screen::Loading, Some(Self::enter_loading(session)))
                }
                Screen::CategoryPick => {
                    if session.settings.selected_categories.is_empty() {
                        return Err(GameError::NoCategorySelected);
                    }
                    match session.settings.mode {
                        GameMode::Classic => (Screen::Loading, Some(Self::enter_loading(session))),
                        GameMode::NameBlame => {
                            session.screen = Screen::PlayerSetup;
                            (Screen::PlayerSetup, None)
                        }
                    }
                }
                screen => {
                    return Err(GameError::InvalidTransition {
                        action: "confirm",
                        screen,
                    })
                }
            }
        };

        if let Some(job) = job {
            self.spawn_build(job).await;
        }
        self.publish().await;
        Ok(next)
    }

    /// Switch to loading and snapshot what the build needs, so later intents
    /// (a language change, settings edits) cannot leak into this round
    fn enter_loading(session: &mut Session) -> BuildJob {
        session.screen = Screen::Loading;
        session.build_in_flight = true;
        session.load_epoch += 1;
        BuildJob {
            epoch: session.load_epoch,
            settings: session.settings.clone(),
            history: session.history.clone(),
        }
    }

    async fn spawn_build(&self, job: BuildJob) {
        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.run_build(job).await });
        // a previous, abandoned build keeps running detached and is discarded
        *self.pending_build.lock().await = Some(handle);
    }

    /// Build the round and hold the loading screen for at least the
    /// configured floor; whichever finishes later gates the transition
    async fn run_build(self, job: BuildJob) {
        let BuildJob {
            epoch,
            settings,
            mut history,
        } = job;

        let prepare = async {
            let catalog = self.ensure_catalog(&settings.language).await;
            build_with_thread_rng(&catalog, &settings, &mut history)
        };
        let min_display = tokio::time::sleep(self.config.min_loading_duration);

        let (result, ()) = tokio::join!(prepare, min_display);
        self.finish_loading(epoch, &settings.language, result, history)
            .await;
    }

    async fn finish_loading(
        &self,
        epoch: u64,
        language: &str,
        result: GameResult<RoundPlan>,
        history: PlayedHistory,
    ) {
        {
            let mut guard = self.session.write().await;
            let session = &mut *guard;

            if session.load_epoch != epoch || session.screen != Screen::Loading {
                tracing::debug!(
                    "Discarding stale round build {} (now on {:?})",
                    epoch,
                    session.screen
                );
                return;
            }
            session.build_in_flight = false;

            if session.history != history {
                session.history = history;
                self.persist_history(session);
            }

            match result {
                Ok(plan) => self.enter_playing(session, plan, false),
                Err(GameError::NoContentAvailable) if self.config.degraded_fallback => {
                    tracing::warn!("No content available, falling back to built-in prompts");
                    let plan = fallback_with_thread_rng(language);
                    self.enter_playing(session, plan, true);
                }
                Err(e) => {
                    tracing::error!("Round preparation failed: {}", e);
                    session.screen = Screen::Intro;
                    session.notice = Some(Notice::from(&e));
                }
            }
        }

        self.publish().await;
    }

    /// Freeze the turn order and start play
    fn enter_playing(&self, session: &mut Session, plan: RoundPlan, degraded: bool) {
        let mode = session.settings.mode;
        let order = active_players(&session.roster);

        let Some(round) = Round::new(plan) else {
            session.screen = Screen::Intro;
            session.notice = Some(Notice::from(&GameError::NoContentAvailable));
            return;
        };

        if mode == GameMode::NameBlame && order.is_empty() {
            tracing::error!("Turn order is empty entering play, returning to player setup");
            session.screen = Screen::PlayerSetup;
            session.notice = Some(Notice::from(&GameError::InconsistentTurnState));
            return;
        }

        tracing::info!(
            "Playing {:?} round: {} prompts, {} players{}",
            mode,
            round.len(),
            order.len(),
            if degraded { " (built-in prompts)" } else { "" }
        );

        session.blame_log = BlameLog::default();
        self.persist_blame_log(session);
        session.turn = Some(TurnState::new(mode, round, order));
        session.summary = None;
        session.degraded = degraded;
        session.screen = Screen::Playing;
        if degraded {
            session.notice = Some(Notice::info(
                "DEGRADED_CONTENT",
                "Prompts could not be loaded, playing with the built-in set",
            ));
        }
    }

    fn force_player_setup(session: &mut Session) {
        tracing::error!(
            "Turn order empty during play on {:?}, forcing player setup",
            session.screen
        );
        session.turn = None;
        session.screen = Screen::PlayerSetup;
    }

    fn finish_round(&self, session: &mut Session) {
        let Some(turn) = session.turn.take() else {
            return;
        };

        if !session.degraded {
            session
                .history
                .record(turn.round().prompts().iter().map(|p| p.text.as_str()));
            self.persist_history(session);
        }

        let summary = RoundSummary::new(turn.round().len(), &session.blame_log);
        tracing::info!(
            "Round finished: {} prompts, {} blames, most blamed {:?}",
            summary.prompts_played,
            session.blame_log.len(),
            summary.most_blamed
        );
        session.summary = Some(summary);
        session.screen = Screen::Summary;
    }

    /// NameBlame: the current player blames `target`
    pub async fn select_target(&self, target: &str) -> GameResult<()> {
        let result = {
            let mut guard = self.session.write().await;
            let session = &mut *guard;
            let turn = playing_turn(&mut session.turn, session.screen, "blame a player")?;

            let blamer = turn
                .current_player()
                .map(|p| p.name.clone())
                .unwrap_or_default();
            let result = turn.select_target(&mut session.blame_log, &blamer, target);

            match &result {
                Ok(()) => self.persist_blame_log(session),
                Err(GameError::InconsistentTurnState) => Self::force_player_setup(session),
                Err(_) => {}
            }
            result
        };

        self.publish().await;
        result
    }

    /// NameBlame: confirm the reveal and move on
    pub async fn acknowledge_reveal(&self) -> GameResult<Screen> {
        let result = {
            let mut guard = self.session.write().await;
            let session = &mut *guard;
            let turn = playing_turn(&mut session.turn, session.screen, "acknowledge a reveal")?;

            match turn.acknowledge_reveal() {
                Ok(Advance::Next) => Ok(Screen::Playing),
                Ok(Advance::Finished) => {
                    self.finish_round(session);
                    Ok(Screen::Summary)
                }
                Err(GameError::InconsistentTurnState) => {
                    Self::force_player_setup(session);
                    Err(GameError::InconsistentTurnState)
                }
                Err(e) => Err(e),
            }
        };

        self.publish().await;
        result
    }

    /// Classic: next prompt
    pub async fn advance(&self) -> GameResult<Screen> {
        let result = {
            let mut guard = self.session.write().await;
            let session = &mut *guard;
            let turn = playing_turn(&mut session.turn, session.screen, "advance")?;

            match turn.advance_turn_classic()? {
                Advance::Next => Screen::Playing,
                Advance::Finished => {
                    self.finish_round(session);
                    Screen::Summary
                }
            }
        };

        self.publish().await;
        Ok(result)
    }

    /// Previous prompt while playing, previous screen during setup
    pub async fn go_back(&self) -> GameResult<Screen> {
        let screen = {
            let mut guard = self.session.write().await;
            let session = &mut *guard;

            match session.screen {
                Screen::Playing => {
                    if let Some(turn) = session.turn.as_mut() {
                        turn.go_to_previous_prompt();
                    }
                }
                Screen::PlayerSetup => {
                    session.screen = if session.settings.category_selection_enabled
                        && session.settings.mode == GameMode::NameBlame
                    {
                        Screen::CategoryPick
                    } else {
                        Screen::Intro
                    };
                }
                Screen::CategoryPick => session.screen = Screen::Intro,
                screen => {
                    return Err(GameError::InvalidTransition {
                        action: "go back",
                        screen,
                    })
                }
            }
            session.screen
        };

        self.publish().await;
        Ok(screen)
    }

    /// Summary -> intro
    pub async fn restart(&self) -> GameResult<Screen> {
        {
            let mut session = self.session.write().await;
            require_screen(&session, Screen::Summary, "restart")?;
            session.summary = None;
            session.degraded = false;
            session.screen = Screen::Intro;
        }

        self.publish().await;
        Ok(Screen::Intro)
    }

    /// Title click: back to intro from anywhere, abandoning any round and
    /// any pending build
    pub async fn go_home(&self) -> Screen {
        {
            let mut session = self.session.write().await;
            if session.screen != Screen::Intro {
                tracing::info!("Returning to intro from {:?}", session.screen);
            }
            session.load_epoch += 1;
            session.build_in_flight = false;
            session.turn = None;
            session.summary = None;
            session.degraded = false;
            session.screen = Screen::Intro;
        }

        self.publish().await;
        Screen::Intro
    }

    /// Switch the active language; the cached catalog is discarded. A round
    /// in progress keeps the prompts it was built with.
    pub async fn change_language(&self, code: &str) -> GameResult<()> {
        let code = code.trim().to_lowercase();
        let reload = {
            let mut session = self.session.write().await;
            if code.is_empty() || session.settings.language == code {
                return Ok(());
            }
            tracing::info!("Language {} -> {}", session.settings.language, code);
            session.settings.language = code.clone();
            self.persist_settings(&session);
            session.screen == Screen::CategoryPick
        };

        self.discard_catalog().await;
        if reload {
            self.ensure_catalog(&code).await;
        }
        self.publish().await;
        Ok(())
    }

    pub async fn set_mode(&self, mode: GameMode) -> GameResult<()> {
        self.update_settings("change the mode", |s| s.mode = mode)
            .await
    }

    pub async fn set_round_size(
        &self,
        category_count: usize,
        prompts_per_category: usize,
    ) -> GameResult<()> {
        self.update_settings("change the round size", |s| {
            s.category_count = category_count.max(1);
            s.prompts_per_category = prompts_per_category.max(1);
        })
        .await
    }

    pub async fn set_category_selection(&self, enabled: bool) -> GameResult<()> {
        self.update_settings("change category selection", |s| {
            s.category_selection_enabled = enabled
        })
        .await
    }

    /// Add or remove a category from the explicit selection
    pub async fn toggle_category(&self, category_id: &str) -> GameResult<()> {
        let language = self.session.read().await.settings.language.clone();
        let catalog = self.ensure_catalog(&language).await;
        if catalog.prompts(category_id).is_empty() {
            return Err(GameError::UnknownCategory(category_id.to_string()));
        }

        self.update_settings("select categories", |s| {
            if let Some(pos) = s.selected_categories.iter().position(|c| c == category_id) {
                s.selected_categories.remove(pos);
            } else {
                s.selected_categories.push(category_id.to_string());
            }
        })
        .await
    }

    async fn update_settings(
        &self,
        action: &'static str,
        apply: impl FnOnce(&mut GameSettings),
    ) -> GameResult<()> {
        {
            let mut session = self.session.write().await;
            require_settings_editable(&session, action)?;
            apply(&mut session.settings);
            self.persist_settings(&session);
        }

        self.publish().await;
        Ok(())
    }
}
