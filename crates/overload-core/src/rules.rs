//! Tunable rule set.
//!
//! Everything a table might want to house-rule lives here: how many cards are
//! dealt, how deep a Future peek looks, how hard an Attack hits, and the
//! per-kind card quantities for small and large tables.

use crate::cards::Card;
use crate::game::SetupError;
use serde::{Deserialize, Serialize};

/// Tables with this many players or more use the large quantity table
const LARGE_TABLE_FROM: usize = 4;

/// Copies of each card kind in the base pile for one table size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardCounts {
    pub skip: usize,
    pub attack: usize,
    pub shuffle: usize,
    pub future: usize,
    pub favor: usize,
    /// Copies of every combo-only kind
    pub combo_each: usize,
}

impl CardCounts {
    /// Quantities for 2-3 players
    pub fn small_table() -> Self {
        Self {
            skip: 4,
            attack: 4,
            shuffle: 4,
            future: 5,
            favor: 4,
            combo_each: 4,
        }
    }

    /// Quantities for 4-5 players
    pub fn large_table() -> Self {
        Self {
            skip: 6,
            attack: 6,
            shuffle: 6,
            future: 7,
            favor: 6,
            combo_each: 6,
        }
    }

    /// Copies of a given kind
    pub fn get(&self, card: Card) -> usize {
        match card {
            Card::Skip => self.skip,
            Card::Attack => self.attack,
            Card::Shuffle => self.shuffle,
            Card::Future => self.future,
            Card::Favor => self.favor,
            c if c.is_combo_only() => self.combo_each,
            _ => 0,
        }
    }
}

impl Default for CardCounts {
    fn default() -> Self {
        Self::small_table()
    }
}

/// Rules of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Cards dealt to each hand before the Defuse handout
    pub cards_dealt: usize,
    /// How many cards a Future reveals
    pub peek_depth: usize,
    /// Turns an Attack adds to the next player's burden
    pub attack_turns: u32,
    /// Defuse copies shuffled into the base pile
    pub spare_defuses: usize,
    pub small_table: CardCounts,
    pub large_table: CardCounts,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            cards_dealt: 7,
            peek_depth: 3,
            attack_turns: 2,
            spare_defuses: 2,
            small_table: CardCounts::small_table(),
            large_table: CardCounts::large_table(),
        }
    }
}

impl RuleSet {
    /// Quantity table for a table size
    pub fn counts_for(&self, player_count: usize) -> &CardCounts {
        if player_count >= LARGE_TABLE_FROM {
            &self.large_table
        } else {
            &self.small_table
        }
    }

    /// Base pile for a table size: everything except Bombs and the
    /// guaranteed Defuse each player receives.
    pub fn base_pile(&self, player_count: usize) -> Vec<Card> {
        let counts = self.counts_for(player_count);
        let mut pile = vec![Card::Defuse; self.spare_defuses];
        for card in Card::ACTIONS.iter().chain(Card::COMBO_ONLY.iter()) {
            pile.extend(std::iter::repeat(*card).take(counts.get(*card)));
        }
        pile
    }

    /// Reject rule sets that can't run a match for this table size
    pub fn validate(&self, player_count: usize) -> Result<(), SetupError> {
        if self.peek_depth == 0 {
            return Err(SetupError::InvalidRules("peek depth must be at least 1".into()));
        }
        if self.attack_turns == 0 {
            return Err(SetupError::InvalidRules("an attack must add at least 1 turn".into()));
        }

        let needed = self.cards_dealt * player_count;
        let available = self.base_pile(player_count).len();
        if available < needed {
            return Err(SetupError::InvalidRules(format!(
                "dealing {} cards to {} players needs {} cards, base pile has {}",
                self.cards_dealt, player_count, needed, available
            )));
        }

        Ok(())
    }
}
