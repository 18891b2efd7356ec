//! Plain-text rendering of hands and menu entries.

use overload_core::{Card, ComboMode, Command, GameState, PlayerId};

/// Menu label for a command, from the active player's point of view
pub fn command_label(game: &GameState, command: &Command) -> String {
    let name = |id: PlayerId| {
        game.get_player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {}", id + 1))
    };

    match command {
        Command::Draw => "Draw a card".to_string(),
        Command::PlayAction(card) => format!("Play {}", card),
        Command::StartCombo {
            card,
            mode: ComboMode::Pair,
        } => format!("Play a pair of {} (steal a random card)", card),
        Command::StartCombo {
            card,
            mode: ComboMode::Triple,
        } => format!("Play three {} (name a card to take)", card),
        Command::ResolveFavorFrom(target) => {
            format!("Hack {} ({} cards)", name(*target), game.hand(*target).len())
        }
        Command::ResolvePairTarget(target) | Command::ResolveTripleTarget(target) => {
            format!("Target {} ({} cards)", name(*target), game.hand(*target).len())
        }
        Command::ResolvePairCardIndex(index) => format!("Take face-down card #{}", index + 1),
        Command::ResolveTripleCardName(card) => format!("Ask for {}", card),
        Command::ResolveFatalOrEliminate => {
            if game.count_in_hand(game.turn, Card::Defuse) > 0 {
                format!("Use a {}", Card::Defuse)
            } else {
                "Go down".to_string()
            }
        }
        Command::DefuseReinsert(0) => format!("Put the {} on top", Card::Bomb),
        Command::DefuseReinsert(depth) if *depth == game.deck.len() => {
            format!("Put the {} at the bottom", Card::Bomb)
        }
        Command::DefuseReinsert(depth) => format!("Put the {} {} cards down", Card::Bomb, depth),
    }
}

/// A hand grouped by kind, e.g. `Reboot, Hack x2`
pub fn hand_summary(hand: &[Card]) -> String {
    if hand.is_empty() {
        return "(empty)".to_string();
    }

    Card::ALL
        .into_iter()
        .filter_map(|card| {
            let count = hand.iter().filter(|c| **c == card).count();
            match count {
                0 => None,
                1 => Some(card.to_string()),
                n => Some(format!("{} x{}", card, n)),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
