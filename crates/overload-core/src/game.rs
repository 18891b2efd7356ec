//! Core game state machine.
//!
//! This module contains the `GameState` snapshot and the transition function
//! that applies one command to one state. Every accepted command produces a
//! fresh snapshot; a rejected command leaves the original untouched.

use crate::actions::{ComboMode, Command, GameEvent, TransferKind};
use crate::cards::{self, Card, Deal};
use crate::log::{LogEntry, Visibility};
use crate::player::{Player, PlayerId, PlayerSpec};
use crate::rules::RuleSet;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active player may draw, play a card, or start a combo
    AwaitAction,
    /// A Bomb was drawn and must be defused or end the drawer's game
    ResolveFatal,
    /// Favor played, waiting for a target
    ChoosingFavorTarget,
    /// Pair spent, waiting for a target
    ChoosingPairTarget,
    /// Pair target chosen, waiting for a face-down card position
    ChoosingPairCard,
    /// Triple spent, waiting for a target
    ChoosingTripleTarget,
    /// Triple target chosen, waiting for a card name
    ChoosingTripleCard,
}

/// Errors raised while opening a match
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SetupError {
    #[error("Need 2-5 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Player {0} has no name")]
    EmptyName(PlayerId),

    #[error("Deal has {hands} hands for {players} players")]
    DealMismatch { players: usize, hands: usize },

    #[error("Invalid rules: {0}")]
    InvalidRules(String),
}

/// Why a command was rejected. Rejected commands never change the state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Game is over")]
    GameOver,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Don't have {0}")]
    MissingCard(Card),

    #[error("{0} can't be played that way")]
    NotPlayable(Card),

    #[error("Player {0} can't be targeted")]
    InvalidTarget(PlayerId),

    #[error("No cards left to draw")]
    EmptyDeck,
}

/// Combo being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboContext {
    pub mode: ComboMode,
    pub target: Option<PlayerId>,
}

/// A drawn Bomb awaiting resolution. The Bomb is out of the deck while this
/// is set, and so is the Defuse once it has been spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFatal {
    pub player: PlayerId,
    pub defuse_spent: bool,
}

/// Most recent safe draw, kept for reveal UIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastDraw {
    pub player: PlayerId,
    pub card: Card,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// All seats, eliminated ones included
    pub players: Vec<Player>,
    /// Active player
    pub turn: PlayerId,
    /// Turns the active player must still take
    pub turns_owed: u32,
    /// Forced turns waiting to be handed to the next player
    pub attack_queue: u32,
    /// Draw deck; the last element is the top
    pub deck: Vec<Card>,
    pub discard: Vec<Card>,
    /// Hands indexed by seat
    pub hands: Vec<Vec<Card>>,
    pub phase: GamePhase,
    pub combo: Option<ComboContext>,
    pub pending_fatal: Option<PendingFatal>,
    /// Cards revealed by the last Future, top first
    pub peek: Option<Vec<Card>>,
    /// Safe card drawn by the last command, if any
    pub last_drawn: Option<LastDraw>,
    pub log: Vec<LogEntry>,
    /// Name of the last player standing
    pub winner: Option<String>,
    pub rules: RuleSet,
}

impl GameState {
    /// Open a match: build and deal a fresh deck for the roster
    pub fn new<R: Rng>(
        roster: Vec<PlayerSpec>,
        rules: RuleSet,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let deal = cards::build_deck(roster.len(), &rules, rng)?;
        Self::from_deal(roster, deal, rules)
    }

    /// Open a match from an explicit deal
    pub fn from_deal(roster: Vec<PlayerSpec>, deal: Deal, rules: RuleSet) -> Result<Self, SetupError> {
        cards::check_player_count(roster.len())?;
        if deal.hands.len() != roster.len() {
            return Err(SetupError::DealMismatch {
                players: roster.len(),
                hands: deal.hands.len(),
            });
        }
        if let Some(id) = roster.iter().position(|p| p.name.trim().is_empty()) {
            return Err(SetupError::EmptyName(id));
        }

        let players: Vec<Player> = roster
            .into_iter()
            .enumerate()
            .map(|(id, spec)| Player::new(id, spec))
            .collect();

        let started = GameEvent::GameStarted {
            players: players.len(),
            deck_size: deal.deck.len(),
        };

        Ok(Self {
            players,
            turn: 0,
            turns_owed: 1,
            attack_queue: 0,
            deck: deal.deck,
            discard: Vec::new(),
            hands: deal.hands,
            phase: GamePhase::AwaitAction,
            combo: None,
            pending_fatal: None,
            peek: None,
            last_drawn: None,
            log: vec![LogEntry::public(started)],
            winner: None,
            rules,
        })
    }

    // ==================== Queries ====================

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Player whose turn it is
    pub fn active_player(&self) -> &Player {
        &self.players[self.turn]
    }

    /// A seat's hand; empty for unknown seats
    pub fn hand(&self, id: PlayerId) -> &[Card] {
        self.hands.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Copies of `card` in a seat's hand
    pub fn count_in_hand(&self, id: PlayerId, card: Card) -> usize {
        self.hand(id).iter().filter(|c| **c == card).count()
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Seat of the winner, once there is one
    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner.as_ref()?;
        self.alive_players().next()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| p.alive).map(|p| p.id)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// Living players other than `player`, in seat order
    pub fn alive_opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.alive_players().filter(|&id| id != player).collect()
    }

    /// Next living seat after `player`, wrapping around
    pub fn next_alive_after(&self, player: PlayerId) -> PlayerId {
        let count = self.player_count();
        (1..=count)
            .map(|offset| (player + offset) % count)
            .find(|&id| self.players[id].alive)
            .unwrap_or(player)
    }

    /// Every card in the match, including those held by a pending Bomb
    pub fn total_cards(&self) -> usize {
        let held: usize = self.hands.iter().map(Vec::len).sum();
        let pending = match self.pending_fatal {
            Some(PendingFatal {
                defuse_spent: true, ..
            }) => 2,
            Some(_) => 1,
            None => 0,
        };
        self.deck.len() + self.discard.len() + held + pending
    }

    /// Bombs in the deck, the discard pile, or being resolved
    pub fn bombs_outside_hands(&self) -> usize {
        let piles = self
            .deck
            .iter()
            .chain(self.discard.iter())
            .filter(|c| **c == Card::Bomb)
            .count();
        piles + usize::from(self.pending_fatal.is_some())
    }

    /// Log entries `viewer` is allowed to see
    pub fn visible_log(&self, viewer: PlayerId) -> impl Iterator<Item = &LogEntry> + '_ {
        self.log.iter().filter(move |e| e.is_visible_to(viewer))
    }

    /// Every command the active player may submit right now
    pub fn valid_commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.is_finished() {
            return commands;
        }

        match self.phase {
            GamePhase::AwaitAction => {
                if !self.deck.is_empty() || !self.discard.is_empty() {
                    commands.push(Command::Draw);
                }

                for card in Card::ALL {
                    let held = self.count_in_hand(self.turn, card);
                    if held == 0 {
                        continue;
                    }
                    if card.is_action() {
                        commands.push(Command::PlayAction(card));
                    }
                    if card.is_combo_eligible() {
                        for mode in [ComboMode::Pair, ComboMode::Triple] {
                            if held >= mode.copies() {
                                commands.push(Command::StartCombo { card, mode });
                            }
                        }
                    }
                }
            }

            GamePhase::ResolveFatal => match self.pending_fatal {
                Some(PendingFatal {
                    defuse_spent: false,
                    ..
                }) => commands.push(Command::ResolveFatalOrEliminate),
                Some(_) => {
                    for depth in 0..=self.deck.len() {
                        commands.push(Command::DefuseReinsert(depth));
                    }
                }
                None => {}
            },

            GamePhase::ChoosingFavorTarget => {
                for target in self.alive_opponents(self.turn) {
                    commands.push(Command::ResolveFavorFrom(target));
                }
            }

            GamePhase::ChoosingPairTarget => {
                for target in self.alive_opponents(self.turn) {
                    commands.push(Command::ResolvePairTarget(target));
                }
            }

            GamePhase::ChoosingPairCard => {
                let size = self
                    .combo
                    .and_then(|c| c.target)
                    .map(|t| self.hand(t).len())
                    .unwrap_or(0);
                for index in 0..size.max(1) {
                    commands.push(Command::ResolvePairCardIndex(index));
                }
            }

            GamePhase::ChoosingTripleTarget => {
                for target in self.alive_opponents(self.turn) {
                    commands.push(Command::ResolveTripleTarget(target));
                }
            }

            GamePhase::ChoosingTripleCard => {
                for card in Card::ALL.into_iter().filter(|c| *c != Card::Bomb) {
                    commands.push(Command::ResolveTripleCardName(card));
                }
            }
        }

        commands
    }

    // ==================== Transitions ====================

    /// Apply a command, producing the next snapshot. Commands that don't fit
    /// the current state return an unchanged copy.
    pub fn apply<R: Rng>(&self, command: Command, rng: &mut R) -> GameState {
        self.try_apply(command, rng).unwrap_or_else(|_| self.clone())
    }

    /// Apply a command, reporting why it was rejected
    pub fn try_apply<R: Rng>(&self, command: Command, rng: &mut R) -> Result<GameState, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        let mut next = self.clone();
        next.last_drawn = None;
        next.execute(command, rng)?;
        Ok(next)
    }

    fn execute<R: Rng>(&mut self, command: Command, rng: &mut R) -> Result<(), GameError> {
        match command {
            Command::Draw => self.draw(rng),
            Command::PlayAction(card) => self.play_action(card, rng),
            Command::StartCombo { card, mode } => self.start_combo(card, mode),
            Command::ResolveFavorFrom(target) => self.resolve_favor(target, rng),
            Command::ResolvePairTarget(target) => self.resolve_pair_target(target, rng),
            Command::ResolvePairCardIndex(index) => self.resolve_pair_card(index),
            Command::ResolveTripleTarget(target) => self.resolve_triple_target(target),
            Command::ResolveTripleCardName(card) => self.resolve_triple_card(card),
            Command::ResolveFatalOrEliminate => self.resolve_fatal(),
            Command::DefuseReinsert(depth) => self.defuse_reinsert(depth),
        }
    }

    fn draw<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.expect_phase(GamePhase::AwaitAction)?;
        if self.pending_fatal.is_some() {
            return Err(GameError::InvalidPhase);
        }

        if self.deck.is_empty() {
            if self.discard.is_empty() {
                return Err(GameError::EmptyDeck);
            }
            self.deck = std::mem::take(&mut self.discard);
            self.deck.shuffle(rng);
            self.record(GameEvent::DeckRecycled {
                cards: self.deck.len(),
            });
        }

        let player = self.turn;
        let card = self.deck.pop().ok_or(GameError::EmptyDeck)?;

        if card == Card::Bomb {
            self.pending_fatal = Some(PendingFatal {
                player,
                defuse_spent: false,
            });
            self.phase = GamePhase::ResolveFatal;
            self.record(GameEvent::BombDrawn { player });
            return Ok(());
        }

        self.hands[player].push(card);
        self.last_drawn = Some(LastDraw { player, card });
        self.record_split(
            &[player],
            GameEvent::CardDrawn {
                player,
                card: Some(card),
            },
            GameEvent::CardDrawn { player, card: None },
        );
        self.advance_turn();
        Ok(())
    }

    fn play_action<R: Rng>(&mut self, card: Card, rng: &mut R) -> Result<(), GameError> {
        self.expect_phase(GamePhase::AwaitAction)?;
        if !card.is_action() {
            return Err(GameError::NotPlayable(card));
        }

        let player = self.turn;
        self.take_from_hand(player, card, 1)?;
        self.discard.push(card);
        self.record(GameEvent::CardPlayed { player, card });

        match card {
            Card::Skip => self.advance_turn(),
            Card::Attack => {
                // An attacked player who attacks back passes on what they still owe
                let carried = if self.turns_owed > 1 { self.turns_owed } else { 0 };
                self.attack_queue = self
                    .attack_queue
                    .saturating_add(self.rules.attack_turns.saturating_add(carried));
                self.turns_owed = 1;
                self.record(GameEvent::AttackLaunched {
                    player,
                    target: self.next_alive_after(player),
                    turns: self.attack_queue,
                });
                self.advance_turn();
            }
            Card::Shuffle => {
                self.deck.shuffle(rng);
                self.peek = None;
                self.record(GameEvent::DeckShuffled { player });
            }
            Card::Future => {
                let seen: Vec<Card> = self
                    .deck
                    .iter()
                    .rev()
                    .take(self.rules.peek_depth)
                    .copied()
                    .collect();
                self.record_private(
                    &[player],
                    GameEvent::FutureSeen {
                        player,
                        cards: seen.clone(),
                    },
                );
                self.peek = Some(seen);
            }
            Card::Favor => self.phase = GamePhase::ChoosingFavorTarget,
            other => return Err(GameError::NotPlayable(other)),
        }

        Ok(())
    }

    fn resolve_favor<R: Rng>(&mut self, target: PlayerId, rng: &mut R) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ChoosingFavorTarget)?;
        self.check_target(target)?;

        let player = self.turn;
        self.record(GameEvent::FavorRequested { player, target });

        let size = self.hands[target].len();
        if size == 0 {
            self.record(GameEvent::NothingToTake {
                thief: player,
                victim: target,
                via: TransferKind::Favor,
            });
        } else {
            let index = rng.gen_range(0..size);
            self.transfer(target, index, TransferKind::Favor, false);
        }

        self.phase = GamePhase::AwaitAction;
        Ok(())
    }

    fn start_combo(&mut self, card: Card, mode: ComboMode) -> Result<(), GameError> {
        self.expect_phase(GamePhase::AwaitAction)?;
        if !card.is_combo_eligible() {
            return Err(GameError::NotPlayable(card));
        }

        let player = self.turn;
        self.take_from_hand(player, card, mode.copies())?;
        self.discard
            .extend(std::iter::repeat(card).take(mode.copies()));

        self.combo = Some(ComboContext { mode, target: None });
        self.phase = match mode {
            ComboMode::Pair => GamePhase::ChoosingPairTarget,
            ComboMode::Triple => GamePhase::ChoosingTripleTarget,
        };
        self.record(GameEvent::ComboStarted { player, card, mode });
        Ok(())
    }

    fn resolve_pair_target<R: Rng>(&mut self, target: PlayerId, rng: &mut R) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ChoosingPairTarget)?;
        self.check_target(target)?;

        // Positions must carry no information for the chooser
        self.hands[target].shuffle(rng);
        self.aim_combo(target, ComboMode::Pair);
        self.phase = GamePhase::ChoosingPairCard;
        Ok(())
    }

    fn resolve_pair_card(&mut self, index: usize) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ChoosingPairCard)?;
        let target = self.combo_target()?;

        let size = self.hands[target].len();
        if size == 0 {
            self.record(GameEvent::NothingToTake {
                thief: self.turn,
                victim: target,
                via: TransferKind::Pair,
            });
        } else {
            self.transfer(target, index.min(size - 1), TransferKind::Pair, false);
        }

        self.finish_combo();
        Ok(())
    }

    fn resolve_triple_target(&mut self, target: PlayerId) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ChoosingTripleTarget)?;
        self.check_target(target)?;

        self.aim_combo(target, ComboMode::Triple);
        self.phase = GamePhase::ChoosingTripleCard;
        Ok(())
    }

    fn resolve_triple_card(&mut self, card: Card) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ChoosingTripleCard)?;
        let target = self.combo_target()?;

        let player = self.turn;
        self.record(GameEvent::TripleRequested {
            player,
            target,
            card,
        });

        match self.hands[target].iter().position(|c| *c == card) {
            // The name was announced, so the transfer is public
            Some(index) => self.transfer(target, index, TransferKind::Triple, true),
            None => self.record(GameEvent::TripleFailed {
                player,
                target,
                card,
            }),
        }

        self.finish_combo();
        Ok(())
    }

    fn resolve_fatal(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ResolveFatal)?;
        let pending = self.pending_fatal.ok_or(GameError::InvalidPhase)?;
        if pending.defuse_spent {
            return Err(GameError::InvalidPhase);
        }

        let player = pending.player;
        if let Some(index) = self.hands[player].iter().position(|c| *c == Card::Defuse) {
            self.hands[player].remove(index);
            self.pending_fatal = Some(PendingFatal {
                player,
                defuse_spent: true,
            });
            self.record(GameEvent::BombDefused { player });
            return Ok(());
        }

        self.players[player].alive = false;
        self.discard.push(Card::Bomb);
        self.pending_fatal = None;
        self.turns_owed = 0;
        self.peek = None;
        self.phase = GamePhase::AwaitAction;
        self.record(GameEvent::PlayerEliminated { player });

        if self.alive_count() == 1 {
            let last = self.alive_players().next();
            if let Some(last) = last {
                self.winner = Some(self.players[last].name.clone());
                self.record(GameEvent::GameWon { player: last });
            }
        } else {
            self.advance_turn();
        }

        Ok(())
    }

    fn defuse_reinsert(&mut self, depth: usize) -> Result<(), GameError> {
        self.expect_phase(GamePhase::ResolveFatal)?;
        let pending = self.pending_fatal.ok_or(GameError::InvalidPhase)?;
        if !pending.defuse_spent {
            return Err(GameError::InvalidPhase);
        }

        let depth = depth.min(self.deck.len());
        let index = self.deck.len() - depth;
        self.deck.insert(index, Card::Bomb);
        self.discard.push(Card::Defuse);
        self.pending_fatal = None;
        self.phase = GamePhase::AwaitAction;

        let player = pending.player;
        self.record_split(
            &[player],
            GameEvent::BombReinserted {
                player,
                depth: Some(depth),
            },
            GameEvent::BombReinserted {
                player,
                depth: None,
            },
        );
        self.advance_turn();
        Ok(())
    }

    // ==================== Helper Methods ====================

    /// End one of the active player's turns
    fn advance_turn(&mut self) {
        self.peek = None;

        if self.turns_owed > 1 {
            self.turns_owed -= 1;
            self.record(GameEvent::ExtraTurn {
                player: self.turn,
                remaining: self.turns_owed,
            });
            return;
        }

        let next = self.next_alive_after(self.turn);
        self.turns_owed = if self.attack_queue > 0 {
            std::mem::take(&mut self.attack_queue)
        } else {
            1
        };
        self.turn = next;
        self.record(GameEvent::TurnPassed {
            player: next,
            turns_owed: self.turns_owed,
        });
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase)
        }
    }

    fn check_target(&self, target: PlayerId) -> Result<(), GameError> {
        match self.players.get(target) {
            Some(p) if p.alive && target != self.turn => Ok(()),
            _ => Err(GameError::InvalidTarget(target)),
        }
    }

    fn combo_target(&self) -> Result<PlayerId, GameError> {
        self.combo
            .and_then(|c| c.target)
            .ok_or(GameError::InvalidPhase)
    }

    fn aim_combo(&mut self, target: PlayerId, mode: ComboMode) {
        if let Some(combo) = self.combo.as_mut() {
            combo.target = Some(target);
        }
        self.record(GameEvent::ComboTargeted {
            player: self.turn,
            target,
            mode,
        });
    }

    fn finish_combo(&mut self) {
        self.combo = None;
        self.phase = GamePhase::AwaitAction;
    }

    /// Remove `copies` of a card from a hand, all or nothing
    fn take_from_hand(&mut self, player: PlayerId, card: Card, copies: usize) -> Result<(), GameError> {
        if self.count_in_hand(player, card) < copies {
            return Err(GameError::MissingCard(card));
        }

        let hand = &mut self.hands[player];
        for _ in 0..copies {
            if let Some(index) = hand.iter().position(|c| *c == card) {
                hand.remove(index);
            }
        }
        Ok(())
    }

    /// Move the card at `index` from `victim` to the active player
    fn transfer(&mut self, victim: PlayerId, index: usize, via: TransferKind, public: bool) {
        let thief = self.turn;
        let card = self.hands[victim].remove(index);
        self.hands[thief].push(card);

        let shown = GameEvent::CardTaken {
            thief,
            victim,
            card: Some(card),
            via,
        };
        if public {
            self.record(shown);
        } else {
            self.record_split(
                &[thief, victim],
                shown,
                GameEvent::CardTaken {
                    thief,
                    victim,
                    card: None,
                    via,
                },
            );
        }
    }

    fn record(&mut self, event: GameEvent) {
        self.log.push(LogEntry::public(event));
    }

    fn record_private(&mut self, viewers: &[PlayerId], event: GameEvent) {
        self.log.push(LogEntry {
            visibility: Visibility::only(viewers),
            event,
        });
    }

    /// Log the full event for `insiders` and a redacted one for everyone else
    fn record_split(&mut self, insiders: &[PlayerId], full: GameEvent, redacted: GameEvent) {
        self.record_private(insiders, full);
        self.log.push(LogEntry {
            visibility: Visibility::excluding(insiders),
            event: redacted,
        });
    }
}
