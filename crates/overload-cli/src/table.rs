//! A running match: the current snapshot, its rng, and what each seat has seen.

use overload_core::{
    Bot, BotDifficulty, Command, GameError, GameState, PlayerId, PlayerSpec, RuleSet, SetupError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Can't open the match: {0}")]
    Setup(#[from] SetupError),

    #[error("Command rejected: {0}")]
    Rejected(#[from] GameError),

    #[error("Bot has no move")]
    BotStuck,
}

/// One match in progress
pub struct Table {
    pub id: Uuid,
    pub seed: u64,
    game: GameState,
    rng: StdRng,
    bot: Bot,
    /// Log position each seat has read up to
    read_up_to: Vec<usize>,
}

impl Table {
    pub fn new(
        seats: Vec<PlayerSpec>,
        rules: RuleSet,
        seed: u64,
        bot_level: BotDifficulty,
    ) -> Result<Self, TableError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = GameState::new(seats, rules, &mut rng)?;
        let bot = Bot::with_seed(bot_level, rng.gen());
        let read_up_to = vec![0; game.player_count()];

        Ok(Self {
            id: Uuid::new_v4(),
            seed,
            game,
            rng,
            bot,
            read_up_to,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Submit a command for the active seat
    pub fn submit(&mut self, command: Command) -> Result<(), TableError> {
        self.game = self.game.try_apply(command, &mut self.rng)?;
        Ok(())
    }

    /// Let the bot choose and play for the active seat
    pub fn play_bot(&mut self) -> Result<Command, TableError> {
        let command = self.bot.decide(&self.game).ok_or(TableError::BotStuck)?;
        self.submit(command.clone())?;
        Ok(command)
    }

    /// Log lines `viewer` has not read yet, marking them read
    pub fn unread(&mut self, viewer: PlayerId) -> Vec<String> {
        let Some(cursor) = self.read_up_to.get_mut(viewer) else {
            return Vec::new();
        };
        let start = *cursor;
        *cursor = self.game.log.len();

        self.game.log[start..]
            .iter()
            .filter(|entry| entry.is_visible_to(viewer))
            .map(|entry| entry.event.describe(&self.game.players))
            .collect()
    }

    /// Public log lines not yet shown to spectators
    pub fn unread_public(&self, from: &mut usize) -> Vec<String> {
        let start = (*from).min(self.game.log.len());
        *from = self.game.log.len();

        self.game.log[start..]
            .iter()
            .filter(|entry| entry.is_public())
            .map(|entry| entry.event.describe(&self.game.players))
            .collect()
    }

    pub fn winner(&self) -> Option<(PlayerId, String)> {
        let id = self.game.winner_id()?;
        Some((id, self.game.players[id].name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overload_core::{Card, GamePhase};
    use pretty_assertions::assert_eq;

    fn table(seed: u64) -> Table {
        let seats = vec![PlayerSpec::human("Ada"), PlayerSpec::bot("Bot")];
        Table::new(seats, RuleSet::default(), seed, BotDifficulty::Normal).unwrap()
    }

    #[test]
    fn test_open_table() {
        let table = table(1);
        assert_eq!(table.game().player_count(), 2);
        assert_eq!(table.game().phase, GamePhase::AwaitAction);
        assert!(table.winner().is_none());
    }

    #[test]
    fn test_too_few_seats() {
        let seats = vec![PlayerSpec::human("Solo")];
        let result = Table::new(seats, RuleSet::default(), 1, BotDifficulty::Easy);
        assert!(matches!(result, Err(TableError::Setup(_))));
    }

    #[test]
    fn test_rejected_command_keeps_snapshot() {
        let mut table = table(2);
        let before = table.game().clone();
        let result = table.submit(Command::DefuseReinsert(0));
        assert!(matches!(result, Err(TableError::Rejected(GameError::InvalidPhase))));
        assert_eq!(table.game(), &before);
    }

    #[test]
    fn test_unread_advances_per_seat() {
        // First seed whose top card is safe to draw
        let mut table = (1..)
            .map(table)
            .find(|t| t.game().deck.last() != Some(&Card::Bomb))
            .unwrap();
        let first = table.unread(0);
        assert_eq!(first.len(), 1);
        assert!(table.unread(0).is_empty());

        table.submit(Command::Draw).unwrap();
        // The drawer sees the card, the other seat sees a redacted line
        let drawer = table.unread(0);
        let other = table.unread(1);
        assert!(drawer.iter().any(|line| line.starts_with("Ada drew ")));
        assert!(other.iter().any(|line| line == "Ada drew a card"));
        assert!(table.unread(7).is_empty());
    }

    #[test]
    fn test_unread_public_hides_private_lines() {
        let mut table = (1..)
            .map(table)
            .find(|t| t.game().deck.last() != Some(&Card::Bomb))
            .unwrap();
        let mut recap = 0;
        table.submit(Command::Draw).unwrap();

        let lines = table.unread_public(&mut recap);
        // Both halves of a draw entry are scoped to some viewers
        assert!(!lines.is_empty());
        assert!(!lines.iter().any(|line| line.starts_with("Ada drew")));
        assert_eq!(recap, table.game().log.len());
        assert!(table.unread_public(&mut recap).is_empty());
    }

    #[test]
    fn test_bots_finish_a_match() {
        let seats = vec![PlayerSpec::bot("A"), PlayerSpec::bot("B"), PlayerSpec::bot("C")];
        let mut table = Table::new(seats, RuleSet::default(), 5, BotDifficulty::Normal).unwrap();
        let mut spectator = 0;

        for _ in 0..5_000 {
            if table.game().is_finished() {
                break;
            }
            table.play_bot().unwrap();
            let _ = table.unread_public(&mut spectator);
        }

        assert!(table.winner().is_some());
        assert_eq!(spectator, table.game().log.len());
    }
}
