//! AI Bot players for System Overload.
//!
//! This module provides two difficulty levels:
//! - Easy: Random valid commands
//! - Normal: Heuristics (dodge known Bombs, shed forced turns, steal from the
//!   biggest hand)
//!
//! A bot only reads the state; all of its randomness comes from the rng it
//! owns, so a seeded bot is fully reproducible.

use crate::actions::{ComboMode, Command};
use crate::cards::Card;
use crate::game::{GamePhase, GameState};
use crate::player::PlayerId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Hands larger than this are too big to bother asking for a Favor
const FAVOR_HAND_LIMIT: usize = 5;

/// Deck size at which a Defuse-less bot shuffles rather than risk the draw
const CRITICAL_DECK_SIZE: usize = 3;

/// Chance of an opportunistic Attack
const ATTACK_CHANCE: f64 = 0.25;

/// Hand size from which the bot may Skip to sit on a strong hand
const LARGE_HAND: usize = 7;

/// Chance of that Skip
const SKIP_CHANCE: f64 = 0.35;

/// What a Triple asks for, most wanted first
const TRIPLE_WISHLIST: [Card; 5] = [
    Card::Defuse,
    Card::Attack,
    Card::Skip,
    Card::Future,
    Card::Favor,
];

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Normal,
}

/// A bot that picks commands for whichever seat is active
pub struct Bot<R = StdRng> {
    pub difficulty: BotDifficulty,
    rng: R,
}

impl Bot<StdRng> {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self {
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Bot<R> {
    /// Bot drawing from a caller-supplied randomness source
    pub fn with_rng(difficulty: BotDifficulty, rng: R) -> Self {
        Self { difficulty, rng }
    }

    /// Choose a command for the active player. `None` once the game is over.
    pub fn decide(&mut self, game: &GameState) -> Option<Command> {
        if game.is_finished() {
            return None;
        }

        match self.difficulty {
            BotDifficulty::Easy => self.decide_easy(game),
            BotDifficulty::Normal => self.decide_normal(game),
        }
    }

    /// Easy: Just pick a random valid command
    fn decide_easy(&mut self, game: &GameState) -> Option<Command> {
        game.valid_commands().choose(&mut self.rng).cloned()
    }

    /// Normal: answer whatever the current phase asks for
    fn decide_normal(&mut self, game: &GameState) -> Option<Command> {
        match game.phase {
            GamePhase::AwaitAction => Some(self.choose_action(game)),
            GamePhase::ResolveFatal => {
                let pending = game.pending_fatal?;
                if pending.defuse_spent {
                    Some(Command::DefuseReinsert(self.choose_reinsert_depth(game)))
                } else {
                    Some(Command::ResolveFatalOrEliminate)
                }
            }
            GamePhase::ChoosingFavorTarget => choose_target(game).map(Command::ResolveFavorFrom),
            GamePhase::ChoosingPairTarget => choose_target(game).map(Command::ResolvePairTarget),
            GamePhase::ChoosingPairCard => {
                Some(Command::ResolvePairCardIndex(self.choose_pair_index(game)))
            }
            GamePhase::ChoosingTripleTarget => {
                choose_target(game).map(Command::ResolveTripleTarget)
            }
            GamePhase::ChoosingTripleCard => {
                Some(Command::ResolveTripleCardName(self.choose_triple_card(game)))
            }
        }
    }

    /// Main decision for the start of an action
    fn choose_action(&mut self, game: &GameState) -> Command {
        // Priority order:
        // 1. Dodge a Bomb we know is coming
        // 2. Shed forced turns
        // 3. Triple, 4. Favor, 5. Pair
        // 6. Play safe without a Defuse
        // 7. Occasional aggression, otherwise draw

        let me = game.turn;
        let hand = game.hand(me);
        let has = |card: Card| hand.contains(&card);
        let opponents_have_cards = game
            .alive_opponents(me)
            .iter()
            .any(|&id| !game.hand(id).is_empty());

        let bomb_ahead = game
            .peek
            .as_ref()
            .is_some_and(|cards| cards.contains(&Card::Bomb));
        if bomb_ahead {
            for card in [Card::Shuffle, Card::Skip, Card::Attack] {
                if has(card) {
                    return Command::PlayAction(card);
                }
            }
            // Nothing to dodge with, hope for a Defuse
            return Command::Draw;
        }

        if game.turns_owed > 1 {
            for card in [Card::Skip, Card::Attack] {
                if has(card) {
                    return Command::PlayAction(card);
                }
            }
        }

        if opponents_have_cards {
            if let Some(card) = combo_card(game, me, ComboMode::Triple) {
                return Command::StartCombo {
                    card,
                    mode: ComboMode::Triple,
                };
            }
        }

        if has(Card::Favor) && opponents_have_cards && hand.len() <= FAVOR_HAND_LIMIT {
            return Command::PlayAction(Card::Favor);
        }

        if opponents_have_cards {
            if let Some(card) = combo_card(game, me, ComboMode::Pair) {
                return Command::StartCombo {
                    card,
                    mode: ComboMode::Pair,
                };
            }
        }

        if !has(Card::Defuse) {
            if has(Card::Future) {
                return Command::PlayAction(Card::Future);
            }
            if game.deck.len() <= CRITICAL_DECK_SIZE && has(Card::Shuffle) {
                return Command::PlayAction(Card::Shuffle);
            }
        }

        if has(Card::Attack) && self.rng.gen_bool(ATTACK_CHANCE) {
            return Command::PlayAction(Card::Attack);
        }

        if has(Card::Skip) && hand.len() >= LARGE_HAND && self.rng.gen_bool(SKIP_CHANCE) {
            return Command::PlayAction(Card::Skip);
        }

        Command::Draw
    }

    /// Random face-down position in the Pair target's hand
    fn choose_pair_index(&mut self, game: &GameState) -> usize {
        let size = game
            .combo
            .and_then(|c| c.target)
            .map(|t| game.hand(t).len())
            .unwrap_or(0);
        if size == 0 {
            0
        } else {
            self.rng.gen_range(0..size)
        }
    }

    /// Name the most valuable card we lack, or deny a random combo set
    fn choose_triple_card(&mut self, game: &GameState) -> Card {
        let hand = game.hand(game.turn);
        TRIPLE_WISHLIST
            .into_iter()
            .find(|card| !hand.contains(card))
            .or_else(|| Card::COMBO_ONLY.choose(&mut self.rng).copied())
            .unwrap_or(Card::Defuse)
    }

    /// Depth to hide a defused Bomb at
    fn choose_reinsert_depth(&mut self, game: &GameState) -> usize {
        self.rng.gen_range(0..=game.deck.len())
    }
}

/// Living opponent with the most cards; the first seat wins ties
pub fn choose_target(game: &GameState) -> Option<PlayerId> {
    let mut best: Option<(PlayerId, usize)> = None;
    for id in game.alive_opponents(game.turn) {
        let size = game.hand(id).len();
        if best.map_or(true, |(_, top)| size > top) {
            best = Some((id, size));
        }
    }
    best.map(|(id, _)| id)
}

/// First combo-only card the player holds enough copies of
fn combo_card(game: &GameState, player: PlayerId, mode: ComboMode) -> Option<Card> {
    Card::COMBO_ONLY
        .into_iter()
        .find(|card| game.count_in_hand(player, *card) >= mode.copies())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Deal;
    use crate::game::PendingFatal;
    use crate::player::PlayerSpec;
    use crate::rules::RuleSet;

    fn rigged(hands: Vec<Vec<Card>>, deck: Vec<Card>) -> GameState {
        let roster = (0..hands.len())
            .map(|i| PlayerSpec::bot(format!("Bot {}", i + 1)))
            .collect();
        GameState::from_deal(roster, Deal { deck, hands }, RuleSet::default()).unwrap()
    }

    fn bot() -> Bot {
        Bot::with_seed(BotDifficulty::Normal, 3)
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(BotDifficulty::Easy);
        assert_eq!(bot.difficulty, BotDifficulty::Easy);
    }

    #[test]
    fn test_easy_bot_chooses_valid_command() {
        let game = GameState::new(
            vec![PlayerSpec::bot("A"), PlayerSpec::bot("B")],
            RuleSet::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let mut bot = Bot::with_seed(BotDifficulty::Easy, 5);

        let command = bot.decide(&game).unwrap();
        assert!(game.valid_commands().contains(&command));
    }

    #[test]
    fn test_dodges_known_bomb_with_shuffle_first() {
        let mut game = rigged(
            vec![vec![Card::Attack, Card::Skip, Card::Shuffle], vec![Card::Skip]],
            vec![Card::Bomb, Card::Skip],
        );
        game.peek = Some(vec![Card::Skip, Card::Bomb]);
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Shuffle)));

        game.hands[0] = vec![Card::Attack, Card::Skip];
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Skip)));

        game.hands[0] = vec![Card::Attack];
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Attack)));

        game.hands[0] = vec![Card::Defuse];
        assert_eq!(bot().decide(&game), Some(Command::Draw));
    }

    #[test]
    fn test_sheds_forced_turns() {
        let mut game = rigged(
            vec![vec![Card::Defuse, Card::Attack], vec![Card::Skip]],
            vec![Card::Bomb],
        );
        game.turns_owed = 3;
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Attack)));
    }

    #[test]
    fn test_prefers_triple_over_pair() {
        let game = rigged(
            vec![
                vec![Card::Defuse, Card::RubberDuck, Card::RubberDuck, Card::RubberDuck],
                vec![Card::Skip],
            ],
            vec![Card::Bomb],
        );
        assert_eq!(
            bot().decide(&game),
            Some(Command::StartCombo {
                card: Card::RubberDuck,
                mode: ComboMode::Triple
            })
        );
    }

    #[test]
    fn test_favor_with_small_hand() {
        let game = rigged(
            vec![vec![Card::Defuse, Card::Favor, Card::LegacyCode, Card::LegacyCode], vec![Card::Skip]],
            vec![Card::Bomb],
        );
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Favor)));
    }

    #[test]
    fn test_pair_when_opponents_hold_cards() {
        let game = rigged(
            vec![vec![Card::Defuse, Card::LegacyCode, Card::LegacyCode], vec![Card::Skip]],
            vec![Card::Bomb],
        );
        assert_eq!(
            bot().decide(&game),
            Some(Command::StartCombo {
                card: Card::LegacyCode,
                mode: ComboMode::Pair
            })
        );
    }

    #[test]
    fn test_no_combo_against_empty_hands() {
        let game = rigged(
            vec![vec![Card::Defuse, Card::LegacyCode, Card::LegacyCode], vec![]],
            vec![Card::Bomb],
        );
        assert_eq!(bot().decide(&game), Some(Command::Draw));
    }

    #[test]
    fn test_peeks_without_defuse() {
        let game = rigged(vec![vec![Card::Future], vec![]], vec![Card::Bomb]);
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Future)));
    }

    #[test]
    fn test_shuffles_small_deck_without_defuse() {
        let game = rigged(
            vec![vec![Card::Shuffle], vec![]],
            vec![Card::Skip, Card::Bomb],
        );
        assert_eq!(bot().decide(&game), Some(Command::PlayAction(Card::Shuffle)));
    }

    #[test]
    fn test_targets_biggest_hand_first_on_tie() {
        let game = rigged(
            vec![vec![], vec![Card::Skip, Card::Skip], vec![Card::Favor], vec![Card::Skip, Card::Favor]],
            vec![Card::Bomb],
        );
        assert_eq!(choose_target(&game), Some(1));
    }

    #[test]
    fn test_target_skips_eliminated() {
        let mut game = rigged(
            vec![vec![], vec![Card::Skip, Card::Skip], vec![Card::Favor]],
            vec![Card::Bomb],
        );
        game.players[1].alive = false;
        assert_eq!(choose_target(&game), Some(2));
    }

    #[test]
    fn test_triple_names_missing_valuable_card() {
        let mut game = rigged(vec![vec![Card::Defuse, Card::Skip], vec![]], vec![Card::Bomb]);
        game.phase = GamePhase::ChoosingTripleCard;
        assert_eq!(
            bot().decide(&game),
            Some(Command::ResolveTripleCardName(Card::Attack))
        );

        game.hands[0] = TRIPLE_WISHLIST.to_vec();
        match bot().decide(&game) {
            Some(Command::ResolveTripleCardName(card)) => assert!(card.is_combo_only()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_resolves_fatal_then_reinserts() {
        let mut game = rigged(vec![vec![Card::Defuse], vec![]], vec![Card::Skip, Card::Skip]);
        game.phase = GamePhase::ResolveFatal;
        game.pending_fatal = Some(PendingFatal {
            player: 0,
            defuse_spent: false,
        });
        assert_eq!(bot().decide(&game), Some(Command::ResolveFatalOrEliminate));

        game.pending_fatal = Some(PendingFatal {
            player: 0,
            defuse_spent: true,
        });
        match bot().decide(&game) {
            Some(Command::DefuseReinsert(depth)) => assert!(depth <= 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_finished_game_yields_nothing() {
        let mut game = rigged(vec![vec![], vec![]], vec![Card::Bomb]);
        game.players[1].alive = false;
        game.winner = Some("Bot 1".into());
        assert_eq!(bot().decide(&game), None);
    }

    #[test]
    fn test_holds_combos_when_opponents_are_empty_handed() {
        let mut game = rigged(
            vec![vec![Card::RubberDuck; 3], vec![]],
            vec![Card::Bomb, Card::Skip],
        );
        game.hands[0].push(Card::Defuse);
        assert_eq!(bot().decide(&game), Some(Command::Draw));

        game.hands[1].push(Card::Skip);
        assert_eq!(
            bot().decide(&game),
            Some(Command::StartCombo {
                card: Card::RubberDuck,
                mode: ComboMode::Triple
            })
        );
    }
}
