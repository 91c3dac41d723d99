//! Turn rotation and the two-phase blame interaction.
//!
//! Classic mode rotates left to right. NameBlame mode hands the turn to
//! whoever was just blamed. The two rules are separate operations on purpose:
//! [`TurnState::advance_turn_classic`] and [`TurnState::acknowledge_reveal`].

use super::blame::BlameLog;
use super::round::Round;
use crate::error::{GameError, GameResult};
use crate::types::{BlamePhase, BlameRoundState, GameMode, Player, Prompt};

/// Result of moving past the current prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished,
}

/// Turn state for one round, created when play starts
#[derive(Debug, Clone)]
pub struct TurnState {
    mode: GameMode,
    round: Round,
    /// Stable turn order, frozen at round start
    order: Vec<Player>,
    current_player: usize,
    blame: BlameRoundState,
}

impl TurnState {
    pub fn new(mode: GameMode, round: Round, order: Vec<Player>) -> Self {
        let mut state = Self {
            mode,
            round,
            order,
            current_player: 0,
            blame: BlameRoundState::default(),
        };
        if mode == GameMode::NameBlame {
            let key = state.round.current().key();
            state.begin_blame_round(key);
        }
        state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn current_prompt(&self) -> &Prompt {
        self.round.current()
    }

    pub fn order(&self) -> &[Player] {
        &self.order
    }

    pub fn blame_state(&self) -> &BlameRoundState {
        &self.blame
    }

    /// Index into the turn order, always in range for a non-empty order
    pub fn current_player_index(&self) -> Option<usize> {
        if self.order.is_empty() {
            None
        } else {
            Some(self.current_player % self.order.len())
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index().map(|i| &self.order[i])
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|p| p.name == name)
    }

    /// Reset the blame sub-state for a newly active prompt. The active player
    /// names are the turn order frozen in [`TurnState::new`].
    pub fn begin_blame_round(&mut self, prompt_key: String) {
        self.blame = BlameRoundState {
            prompt_key: Some(prompt_key),
            phase: BlamePhase::Selecting,
            current_blamer: None,
            current_blamed: None,
            acted_this_prompt: Default::default(),
        };
    }

    /// Blame `target` for the current prompt and move to the reveal phase
    pub fn select_target(
        &mut self,
        log: &mut BlameLog,
        blamer: &str,
        target: &str,
    ) -> GameResult<()> {
        if self.mode != GameMode::NameBlame {
            return Err(GameError::WrongMode {
                action: "blame a player",
                mode: self.mode,
            });
        }
        if self.order.is_empty() {
            tracing::error!(
                "select_target({} -> {}) with an empty turn order",
                blamer,
                target
            );
            return Err(GameError::InconsistentTurnState);
        }
        if self.blame.phase != BlamePhase::Selecting {
            return Err(GameError::WrongPhase {
                expected: BlamePhase::Selecting,
            });
        }
        if self.position_of(blamer).is_none() {
            return Err(GameError::UnknownPlayer(blamer.to_string()));
        }
        if self.position_of(target).is_none() {
            return Err(GameError::UnknownPlayer(target.to_string()));
        }
        if blamer == target {
            return Err(GameError::SelfBlame(blamer.to_string()));
        }

        log.record(blamer, target, &self.round.current().text);
        self.blame.phase = BlamePhase::Reveal;
        self.blame.current_blamer = Some(blamer.to_string());
        self.blame.current_blamed = Some(target.to_string());
        self.blame.acted_this_prompt.insert(blamer.to_string());

        tracing::info!("{} blamed {} for prompt {}", blamer, target, self.round.cursor());
        Ok(())
    }

    /// Confirm the reveal: the blamed player takes the next turn
    pub fn acknowledge_reveal(&mut self) -> GameResult<Advance> {
        if self.mode != GameMode::NameBlame {
            return Err(GameError::WrongMode {
                action: "acknowledge a reveal",
                mode: self.mode,
            });
        }
        if self.order.is_empty() {
            tracing::error!("acknowledge_reveal with an empty turn order");
            return Err(GameError::InconsistentTurnState);
        }
        if self.blame.phase != BlamePhase::Reveal {
            return Err(GameError::WrongPhase {
                expected: BlamePhase::Reveal,
            });
        }

        if let Some(next) = self
            .blame
            .current_blamed
            .as_deref()
            .and_then(|name| self.position_of(name))
        {
            self.current_player = next;
        }

        if !self.round.advance() {
            self.blame.phase = BlamePhase::Selecting;
            return Ok(Advance::Finished);
        }

        let key = self.round.current().key();
        self.begin_blame_round(key);
        Ok(Advance::Next)
    }

    /// Classic mode: next prompt, next player to the left
    pub fn advance_turn_classic(&mut self) -> GameResult<Advance> {
        if self.mode != GameMode::Classic {
            return Err(GameError::WrongMode {
                action: "advance without blaming",
                mode: self.mode,
            });
        }

        if !self.round.advance() {
            return Ok(Advance::Finished);
        }
        if !self.order.is_empty() {
            self.current_player = (self.current_player + 1) % self.order.len();
        }
        Ok(Advance::Next)
    }

    /// Step back one prompt. Blames already recorded stay in the log.
    pub fn go_to_previous_prompt(&mut self) -> bool {
        if !self.round.back() {
            return false;
        }

        if self.mode == GameMode::NameBlame {
            if self.current_player > 0 {
                self.current_player -= 1;
            }
            let key = self.round.current().key();
            self.begin_blame_round(key);
        }
        true
    }
}
