//! Player roster.
//!
//! Seats are an index-stable arena: a player's id is their position in the
//! roster, and elimination only clears `alive`.

use serde::{Deserialize, Serialize};

/// Seat index in the roster
pub type PlayerId = usize;

/// Who submits commands for a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Bot,
}

/// Participant descriptor used to open a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub controller: Controller,
}

impl PlayerSpec {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Human,
        }
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: Controller::Bot,
        }
    }
}

/// A single seat at the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// False once the player failed to defuse a Bomb
    pub alive: bool,
    pub controller: Controller,
}

impl Player {
    /// Seat a participant
    pub fn new(id: PlayerId, spec: PlayerSpec) -> Self {
        Self {
            id,
            name: spec.name,
            alive: true,
            controller: spec.controller,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.controller == Controller::Bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_alive() {
        let player = Player::new(2, PlayerSpec::bot("Bot 2"));
        assert_eq!(player.id, 2);
        assert_eq!(player.name, "Bot 2");
        assert!(player.alive);
        assert!(player.is_bot());
    }

    #[test]
    fn test_human_spec() {
        let spec = PlayerSpec::human("Ada");
        assert_eq!(spec.controller, Controller::Human);
        assert!(!Player::new(0, spec).is_bot());
    }
}
