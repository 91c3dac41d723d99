//! Intent dispatch
//!
//! Single entry point for the presentation layer: every user intent goes
//! through [`handle_intent`], which runs the matching engine operation and
//! answers with the resulting view. Failures never escape as errors; they
//! become the view's notice.

use crate::error::{GameError, GameResult};
use crate::protocol::{Intent, ViewState};
use crate::state::Engine;

/// Apply `intent` and return the view after the transition
pub async fn handle_intent(intent: Intent, engine: &Engine) -> ViewState {
    engine.clear_notice().await;

    if let Err(e) = apply(intent, engine).await {
        if e.is_validation() {
            tracing::info!("Intent refused: {}", e);
        } else {
            tracing::warn!("Intent failed: {}", e);
        }
        engine.report(&e).await;
    }

    engine.view().await
}

async fn apply(intent: Intent, engine: &Engine) -> GameResult<()> {
    match intent {
        // Flow
        Intent::Start => engine.start().await.map(drop),
        Intent::Confirm => engine.confirm().await.map(drop),
        Intent::GoBack => engine.go_back().await.map(drop),
        Intent::Restart => engine.restart().await.map(drop),
        Intent::GoHome => {
            engine.go_home().await;
            Ok(())
        }
        Intent::ChangeLanguage { code } => engine.change_language(&code).await,

        // Play
        Intent::SelectTarget { name } => engine.select_target(&name).await,
        Intent::AcknowledgeReveal => engine.acknowledge_reveal().await.map(drop),
        Intent::Advance => engine.advance().await.map(drop),

        // Setup
        Intent::AddPlayer { name } => engine.add_player(name).await.map(drop),
        Intent::RenamePlayer { player_id, name } => {
            engine.rename_player(&player_id, name).await.map(drop)
        }
        Intent::RemovePlayer { player_id } => engine.remove_player(&player_id).await.map(drop),
        Intent::SetMode { mode } => engine.set_mode(mode).await,
        Intent::SetRoundSize {
            category_count,
            prompts_per_category,
        } => {
            engine
                .set_round_size(category_count, prompts_per_category)
                .await
        }
        Intent::SetCategorySelection { enabled } => engine.set_category_selection(enabled).await,
        Intent::ToggleCategory { category_id } => {
            if category_id.trim().is_empty() {
                return Err(GameError::UnknownCategory(category_id));
            }
            engine.toggle_category(&category_id).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NoticeKind;
    use crate::state::tests::test_engine;
    use crate::types::*;

    #[tokio::test]
    async fn test_intent_from_json() {
        let (engine, _) = test_engine();
        let intent: Intent =
            serde_json::from_str(r#"{"t":"set_mode","mode":"nameBlame"}"#).unwrap();

        let view = handle_intent(intent, &engine).await;
        assert_eq!(view.settings.mode, GameMode::NameBlame);
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_failure_becomes_notice() {
        let (engine, _) = test_engine();
        let view = handle_intent(Intent::Restart, &engine).await;

        assert_eq!(view.screen, Screen::Intro);
        let notice = view.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.code, "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_notice_cleared_by_next_intent() {
        let (engine, _) = test_engine();
        handle_intent(Intent::SetMode { mode: GameMode::NameBlame }, &engine).await;
        handle_intent(Intent::Start, &engine).await;

        let view = handle_intent(Intent::Confirm, &engine).await;
        assert_eq!(view.notice.unwrap().kind, NoticeKind::Validation);

        let view = handle_intent(
            Intent::AddPlayer {
                name: "Ann".to_string(),
            },
            &engine,
        )
        .await;
        assert!(view.notice.is_none());
        assert_eq!(view.roster.len(), 1);
    }
}
