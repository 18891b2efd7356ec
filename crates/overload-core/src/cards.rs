//! Card catalog and deck construction.
//!
//! This module contains:
//! - The `Card` kinds and their themed display names
//! - Deck building: base pile, dealing, Defuse handout and Bomb insertion

use crate::game::SetupError;
use crate::rules::RuleSet;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fewest players a match can start with
pub const MIN_PLAYERS: usize = 2;

/// Most players a match can start with
pub const MAX_PLAYERS: usize = 5;

/// A card kind. Cards are plain values with no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Card {
    /// Eliminates whoever draws it, unless they hold a Defuse
    Bomb,
    /// Cancels a drawn Bomb and lets the holder reinsert it
    Defuse,
    /// Ends one turn without drawing
    Skip,
    /// Ends the turn and forces extra turns on the next player
    Attack,
    /// Reshuffles the draw deck
    Shuffle,
    /// Peeks at the top of the deck
    Future,
    /// Takes a random card from an opponent
    Favor,
    // Combo-only kinds: no single-card effect
    LegacyCode,
    CoffeeBreak,
    StackOverflow,
    RubberDuck,
    MergeConflict,
}

impl Card {
    /// Every card kind, in catalog order
    pub const ALL: [Card; 12] = [
        Card::Bomb,
        Card::Defuse,
        Card::Skip,
        Card::Attack,
        Card::Shuffle,
        Card::Future,
        Card::Favor,
        Card::LegacyCode,
        Card::CoffeeBreak,
        Card::StackOverflow,
        Card::RubberDuck,
        Card::MergeConflict,
    ];

    /// Cards with a single-card effect, playable through `Command::PlayAction`
    pub const ACTIONS: [Card; 5] = [
        Card::Skip,
        Card::Attack,
        Card::Shuffle,
        Card::Future,
        Card::Favor,
    ];

    /// Cards that only exist to be collected into pairs and triples
    pub const COMBO_ONLY: [Card; 5] = [
        Card::LegacyCode,
        Card::CoffeeBreak,
        Card::StackOverflow,
        Card::RubberDuck,
        Card::MergeConflict,
    ];

    /// Themed name shown to players
    pub fn display_name(&self) -> &'static str {
        match self {
            Card::Bomb => "Fatal Server Error",
            Card::Defuse => "Reboot",
            Card::Skip => "Security Patch",
            Card::Attack => "DDoS Event",
            Card::Shuffle => "Sudo Random",
            Card::Future => "Health Check",
            Card::Favor => "Hack",
            Card::LegacyCode => "Legacy Code",
            Card::CoffeeBreak => "Coffee Break",
            Card::StackOverflow => "Stack Overflow",
            Card::RubberDuck => "Rubber Duck",
            Card::MergeConflict => "Merge Conflict",
        }
    }

    pub fn is_action(&self) -> bool {
        Card::ACTIONS.contains(self)
    }

    pub fn is_combo_only(&self) -> bool {
        Card::COMBO_ONLY.contains(self)
    }

    /// Whether copies of this card may be spent as a pair or triple.
    /// Bombs never sit in a hand, so they can't.
    pub fn is_combo_eligible(&self) -> bool {
        !matches!(self, Card::Bomb)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Opening layout of a match: the draw deck and one hand per seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Draw deck; the last element is the top
    pub deck: Vec<Card>,
    /// Hands indexed by seat
    pub hands: Vec<Vec<Card>>,
}

/// Number of Bombs in play for a table size
pub fn bomb_count(player_count: usize) -> usize {
    player_count.saturating_sub(1).max(1)
}

/// Check a player count against the supported table sizes
pub fn check_player_count(player_count: usize) -> Result<(), SetupError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        Ok(())
    } else {
        Err(SetupError::InvalidPlayerCount(player_count))
    }
}

/// Build, deal and arm a deck for `player_count` players.
///
/// The base pile is shuffled and dealt round-robin, every hand then gets one
/// Defuse, and the Bombs go into what is left before a final shuffle.
pub fn build_deck<R: Rng>(
    player_count: usize,
    rules: &RuleSet,
    rng: &mut R,
) -> Result<Deal, SetupError> {
    check_player_count(player_count)?;
    rules.validate(player_count)?;

    let mut pile = rules.base_pile(player_count);
    pile.shuffle(rng);

    let mut hands = vec![Vec::with_capacity(rules.cards_dealt + 1); player_count];
    for _ in 0..rules.cards_dealt {
        for hand in hands.iter_mut() {
            if let Some(card) = pile.pop() {
                hand.push(card);
            }
        }
    }

    for hand in hands.iter_mut() {
        hand.push(Card::Defuse);
    }

    pile.extend(std::iter::repeat(Card::Bomb).take(bomb_count(player_count)));
    pile.shuffle(rng);

    Ok(Deal { deck: pile, hands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count(cards: &[Card], kind: Card) -> usize {
        cards.iter().filter(|c| **c == kind).count()
    }

    #[test]
    fn test_deal_sizes_for_all_table_sizes() {
        let rules = RuleSet::default();
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let mut rng = StdRng::seed_from_u64(players as u64);
            let deal = build_deck(players, &rules, &mut rng).unwrap();

            assert_eq!(deal.hands.len(), players);
            for hand in &deal.hands {
                assert_eq!(hand.len(), 8);
                assert!(hand.contains(&Card::Defuse));
                assert_eq!(count(hand, Card::Bomb), 0);
            }
            assert_eq!(count(&deal.deck, Card::Bomb), bomb_count(players));
        }
    }

    #[test]
    fn test_total_cards_accounted_for() {
        let rules = RuleSet::default();
        let mut rng = StdRng::seed_from_u64(9);
        let deal = build_deck(4, &rules, &mut rng).unwrap();

        let dealt: usize = deal.hands.iter().map(Vec::len).sum();
        let expected = rules.base_pile(4).len() + 4 + bomb_count(4);
        assert_eq!(dealt + deal.deck.len(), expected);
    }

    #[test]
    fn test_larger_tables_get_more_copies() {
        let rules = RuleSet::default();
        let small = rules.base_pile(3);
        let large = rules.base_pile(4);
        for kind in Card::ACTIONS.iter().chain(Card::COMBO_ONLY.iter()) {
            assert!(count(&large, *kind) > count(&small, *kind), "{kind:?}");
        }
        let combo_counts: Vec<_> = Card::COMBO_ONLY.iter().map(|k| count(&small, *k)).collect();
        assert!(combo_counts.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_rejects_bad_player_counts() {
        let rules = RuleSet::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            build_deck(1, &rules, &mut rng),
            Err(SetupError::InvalidPlayerCount(1))
        ));
        assert!(matches!(
            build_deck(6, &rules, &mut rng),
            Err(SetupError::InvalidPlayerCount(6))
        ));
    }

    #[test]
    fn test_same_seed_same_deal() {
        let rules = RuleSet::default();
        let a = build_deck(5, &rules, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = build_deck(5, &rules, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bomb_count() {
        assert_eq!(bomb_count(2), 1);
        assert_eq!(bomb_count(3), 2);
        assert_eq!(bomb_count(5), 4);
    }
}
