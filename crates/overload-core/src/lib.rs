//! System Overload - a draw-or-crash elimination card game engine
//!
//! This crate provides the core game logic for System Overload, including:
//! - The card catalog and deck builder
//! - Player roster with index-stable seats
//! - Game state machine with full rule enforcement
//! - A heuristic bot for computer-controlled seats
//!
//! # Architecture
//!
//! The engine is a pure transition function: `GameState::apply` takes a
//! snapshot and a `Command` and returns the next snapshot. It performs no I/O
//! and never sleeps; randomness is always passed in by the caller, so a
//! seeded rng replays a match exactly. It can be compiled to:
//! - Native Rust for a terminal or server orchestrator
//! - WebAssembly for a browser hotseat game
//!
//! # Modules
//!
//! - [`cards`]: Card kinds and deck construction
//! - [`rules`]: Tunable rule set
//! - [`player`]: Seats and controllers
//! - [`actions`]: Commands and game events
//! - [`log`]: Visibility-scoped game log
//! - [`game`]: Game state machine
//! - [`bot`]: Computer player

pub mod actions;
pub mod bot;
pub mod cards;
pub mod game;
pub mod log;
pub mod player;
pub mod rules;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{ComboMode, Command, GameEvent, TransferKind};
pub use bot::{Bot, BotDifficulty};
pub use cards::{bomb_count, build_deck, Card, Deal, MAX_PLAYERS, MIN_PLAYERS};
pub use game::{
    ComboContext, GameError, GamePhase, GameState, LastDraw, PendingFatal, SetupError,
};
pub use log::{LogEntry, Visibility};
pub use player::{Controller, Player, PlayerId, PlayerSpec};
pub use rules::{CardCounts, RuleSet};
