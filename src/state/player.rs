use super::{Engine, Session};
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::HashSet;

/// Active players in roster order, with trimmed names
pub fn active_players(roster: &[Player]) -> Vec<Player> {
    roster
        .iter()
        .filter(|p| p.is_active())
        .map(|p| Player {
            id: p.id.clone(),
            name: p.name.trim().to_string(),
        })
        .collect()
}

/// Check the roster is playable in `mode`: enough active players and no
/// duplicate names (blame targets are identified by name)
pub fn validate_roster(roster: &[Player], mode: GameMode) -> GameResult<Vec<Player>> {
    let active = active_players(roster);

    let required = mode.min_players();
    if active.len() < required {
        return Err(GameError::InvalidSetup {
            required,
            active: active.len(),
        });
    }

    let mut seen = HashSet::new();
    for player in &active {
        if !seen.insert(player.name.to_lowercase()) {
            return Err(GameError::DuplicatePlayerName(player.name.clone()));
        }
    }

    Ok(active)
}

fn require_roster_editable(session: &Session) -> GameResult<()> {
    match session.screen {
        Screen::Intro | Screen::PlayerSetup => Ok(()),
        screen => Err(GameError::InvalidTransition {
            action: "edit players",
            screen,
        }),
    }
}

impl Engine {
    /// Add a player. Blank names are kept (the row exists) but never play.
    pub async fn add_player(&self, name: String) -> GameResult<Player> {
        let player = {
            let mut session = self.session.write().await;
            require_roster_editable(&session)?;

            let player = Player {
                id: ulid::Ulid::new().to_string(),
                name,
            };
            session.roster.push(player.clone());
            self.persist_roster(&session);
            player
        };

        tracing::info!("Added player {} ({})", player.id, player.name);
        self.publish().await;
        Ok(player)
    }

    pub async fn rename_player(&self, player_id: &str, name: String) -> GameResult<Player> {
        let player = {
            let mut session = self.session.write().await;
            require_roster_editable(&session)?;

            let player = session
                .roster
                .iter_mut()
                .find(|p| p.id == player_id)
                .ok_or_else(|| GameError::UnknownPlayerId(player_id.to_string()))?;
            player.name = name;
            let player = player.clone();
            self.persist_roster(&session);
            player
        };

        self.publish().await;
        Ok(player)
    }

    pub async fn remove_player(&self, player_id: &str) -> GameResult<Player> {
        let player = {
            let mut session = self.session.write().await;
            require_roster_editable(&session)?;

            let pos = session
                .roster
                .iter()
                .position(|p| p.id == player_id)
                .ok_or_else(|| GameError::UnknownPlayerId(player_id.to_string()))?;
            let player = session.roster.remove(pos);
            self.persist_roster(&session);
            player
        };

        tracing::info!("Removed player {} ({})", player.id, player.name);
        self.publish().await;
        Ok(player)
    }

    pub async fn active_players(&self) -> Vec<Player> {
        active_players(&self.session.read().await.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_engine;
    use crate::store::{self, KeyValueStore};

    fn roster(names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Player {
                id: i.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_blank_names_are_not_active() {
        let active = active_players(&roster(&["  Alice ", "", "   ", "Bob"]));
        let names: Vec<_> = active.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_validate_roster_minimum() {
        let err = validate_roster(&roster(&["A", "B", " "]), GameMode::NameBlame).unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidSetup {
                required: 3,
                active: 2
            }
        );

        assert!(validate_roster(&[], GameMode::Classic).unwrap().is_empty());
        assert_eq!(
            validate_roster(&roster(&["A", "B", "C"]), GameMode::NameBlame)
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_validate_roster_rejects_duplicates() {
        let err = validate_roster(&roster(&["Sam", "Kim", "sam "]), GameMode::NameBlame).unwrap_err();
        assert_eq!(err, GameError::DuplicatePlayerName("sam".to_string()));
    }

    #[tokio::test]
    async fn test_roster_edits_persist() {
        let (engine, store) = test_engine();

        let alice = engine.add_player("Alice".to_string()).await.unwrap();
        let bob = engine.add_player("Bob".to_string()).await.unwrap();
        engine.rename_player(&bob.id, "Robert".to_string()).await.unwrap();
        engine.remove_player(&alice.id).await.unwrap();

        let saved: Vec<Player> = store::load_or_default(store.as_ref(), store::PLAYERS_KEY);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Robert");
        assert!(store.get(store::PLAYERS_KEY).is_some());
    }

    #[tokio::test]
    async fn test_unknown_player_id() {
        let (engine, _) = test_engine();
        let err = engine.remove_player("missing").await.unwrap_err();
        assert_eq!(err, GameError::UnknownPlayerId("missing".to_string()));
    }

    #[tokio::test]
    async fn test_roster_locked_outside_setup() {
        let (engine, _) = test_engine();
        engine.session.write().await.screen = Screen::Playing;

        let err = engine.add_player("Late".to_string()).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidTransition { .. }));
        assert!(engine.session.read().await.roster.is_empty());
    }
}
