//! Commands players submit and the events they produce.
//!
//! This module defines every player-intent command the engine accepts and
//! the events recorded in the game log as a result.

use crate::cards::Card;
use crate::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Size of a combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboMode {
    /// Two of a kind: steal a random card from a target
    Pair,
    /// Three of a kind: name a card and take it if the target has one
    Triple,
}

impl ComboMode {
    /// Copies of the card the combo spends
    pub fn copies(&self) -> usize {
        match self {
            ComboMode::Pair => 2,
            ComboMode::Triple => 3,
        }
    }
}

/// How a card changed hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    Favor,
    Pair,
    Triple,
}

/// All commands the active player can submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // ==================== Main Actions ====================
    /// Draw the top card of the deck
    Draw,
    /// Play a single action card (Skip, Attack, Shuffle, Future, Favor)
    PlayAction(Card),
    /// Spend two or three copies of a card on a combo
    StartCombo { card: Card, mode: ComboMode },

    // ==================== Target Resolution ====================
    /// Pick the opponent who hands over a random card for a Favor
    ResolveFavorFrom(PlayerId),
    /// Pick the opponent a Pair steals from
    ResolvePairTarget(PlayerId),
    /// Pick a face-down card by position from the Pair target's hand
    ResolvePairCardIndex(usize),
    /// Pick the opponent a Triple asks
    ResolveTripleTarget(PlayerId),
    /// Name the card a Triple asks for
    ResolveTripleCardName(Card),

    // ==================== Fatal Resolution ====================
    /// Spend a Defuse on the drawn Bomb, or be eliminated without one
    ResolveFatalOrEliminate,
    /// Put the defused Bomb back at this depth (0 = top)
    DefuseReinsert(usize),
}

/// Events recorded in the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Match opened
    GameStarted {
        players: usize,
        deck_size: usize,
    },

    /// A safe card was drawn; `card` is hidden from everyone but the drawer
    CardDrawn {
        player: PlayerId,
        card: Option<Card>,
    },

    /// The empty deck was rebuilt from the discard pile
    DeckRecycled { cards: usize },

    /// A Bomb was drawn
    BombDrawn { player: PlayerId },

    /// An action card was played
    CardPlayed { player: PlayerId, card: Card },

    /// The deck was reshuffled
    DeckShuffled { player: PlayerId },

    /// Top of the deck, top first; only the player who looked sees this
    FutureSeen {
        player: PlayerId,
        cards: Vec<Card>,
    },

    /// An attack passed forced turns to the next player
    AttackLaunched {
        player: PlayerId,
        target: PlayerId,
        turns: u32,
    },

    /// A Favor was aimed at an opponent
    FavorRequested { player: PlayerId, target: PlayerId },

    /// A combo was spent
    ComboStarted {
        player: PlayerId,
        card: Card,
        mode: ComboMode,
    },

    /// A combo was aimed at an opponent
    ComboTargeted {
        player: PlayerId,
        target: PlayerId,
        mode: ComboMode,
    },

    /// A Triple named the card it wants
    TripleRequested {
        player: PlayerId,
        target: PlayerId,
        card: Card,
    },

    /// The Triple target did not hold the named card
    TripleFailed {
        player: PlayerId,
        target: PlayerId,
        card: Card,
    },

    /// A card moved between hands; `card` is hidden from bystanders
    CardTaken {
        thief: PlayerId,
        victim: PlayerId,
        card: Option<Card>,
        via: TransferKind,
    },

    /// The target had nothing to give
    NothingToTake {
        thief: PlayerId,
        victim: PlayerId,
        via: TransferKind,
    },

    /// A Defuse was spent on a Bomb
    BombDefused { player: PlayerId },

    /// The defused Bomb went back into the deck; depth is private
    BombReinserted {
        player: PlayerId,
        depth: Option<usize>,
    },

    /// A player could not defuse
    PlayerEliminated { player: PlayerId },

    /// The active player still owes forced turns
    ExtraTurn { player: PlayerId, remaining: u32 },

    /// Play moved on to another player
    TurnPassed { player: PlayerId, turns_owed: u32 },

    /// Only one player is left
    GameWon { player: PlayerId },
}

impl GameEvent {
    /// Render the event as a log line, resolving names from the roster
    pub fn describe(&self, roster: &[Player]) -> String {
        let name = |id: &PlayerId| -> String {
            roster
                .get(*id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Player {}", id + 1))
        };

        match self {
            GameEvent::GameStarted { players, deck_size } => {
                format!("{} players sit down, {} cards in the deck", players, deck_size)
            }
            GameEvent::CardDrawn {
                player,
                card: Some(card),
            } => format!("{} drew {}", name(player), card),
            GameEvent::CardDrawn { player, card: None } => format!("{} drew a card", name(player)),
            GameEvent::DeckRecycled { cards } => {
                format!("The deck ran dry; {} discarded cards were shuffled back in", cards)
            }
            GameEvent::BombDrawn { player } => format!("{} drew a {}!", name(player), Card::Bomb),
            GameEvent::CardPlayed { player, card } => format!("{} played {}", name(player), card),
            GameEvent::DeckShuffled { player } => format!("{} shuffled the deck", name(player)),
            GameEvent::FutureSeen { cards, .. } => {
                let list: Vec<_> = cards.iter().map(|c| c.display_name()).collect();
                format!("Top of the deck: {}", list.join(", "))
            }
            GameEvent::AttackLaunched {
                player,
                target,
                turns,
            } => format!(
                "{} attacked {}, who must take {} turns",
                name(player),
                name(target),
                turns
            ),
            GameEvent::FavorRequested { player, target } => {
                format!("{} asked {} for a favor", name(player), name(target))
            }
            GameEvent::ComboStarted { player, card, mode } => {
                format!("{} played a {:?} of {}", name(player), mode, card)
            }
            GameEvent::ComboTargeted {
                player,
                target,
                mode,
            } => format!("{} aimed a {:?} at {}", name(player), mode, name(target)),
            GameEvent::TripleRequested {
                player,
                target,
                card,
            } => format!("{} asked {} for {}", name(player), name(target), card),
            GameEvent::TripleFailed { target, card, .. } => {
                format!("{} has no {}", name(target), card)
            }
            GameEvent::CardTaken {
                thief,
                victim,
                card: Some(card),
                ..
            } => format!("{} took {} from {}", name(thief), card, name(victim)),
            GameEvent::CardTaken {
                thief,
                victim,
                card: None,
                ..
            } => format!("{} took a card from {}", name(thief), name(victim)),
            GameEvent::NothingToTake { victim, .. } => {
                format!("{} had no cards to give", name(victim))
            }
            GameEvent::BombDefused { player } => {
                format!("{} used a {}", name(player), Card::Defuse)
            }
            GameEvent::BombReinserted {
                player,
                depth: Some(depth),
            } => format!(
                "{} slid the {} back {} from the top",
                name(player),
                Card::Bomb,
                depth
            ),
            GameEvent::BombReinserted {
                player,
                depth: None,
            } => format!("{} slid the {} back into the deck", name(player), Card::Bomb),
            GameEvent::PlayerEliminated { player } => format!("{} crashed out", name(player)),
            GameEvent::ExtraTurn { player, remaining } => {
                format!("{} still owes {} turn(s)", name(player), remaining)
            }
            GameEvent::TurnPassed { player, turns_owed } => {
                if *turns_owed > 1 {
                    format!("{}'s turn ({} turns)", name(player), turns_owed)
                } else {
                    format!("{}'s turn", name(player))
                }
            }
            GameEvent::GameWon { player } => format!("{} wins!", name(player)),
        }
    }
}
