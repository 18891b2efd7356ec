//! Visibility-scoped game log.
//!
//! The engine keeps a single append-only log; each entry carries the set of
//! viewers allowed to see it, and the presentation layer filters per viewer.

use crate::actions::GameEvent;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Who may see a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    ExcludedFrom(Vec<PlayerId>),
    VisibleOnlyTo(Vec<PlayerId>),
}

impl Visibility {
    pub fn only(players: &[PlayerId]) -> Self {
        Visibility::VisibleOnlyTo(players.to_vec())
    }

    pub fn excluding(players: &[PlayerId]) -> Self {
        Visibility::ExcludedFrom(players.to_vec())
    }

    /// Whether a seated player may see the entry
    pub fn allows(&self, viewer: PlayerId) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::ExcludedFrom(ids) => !ids.contains(&viewer),
            Visibility::VisibleOnlyTo(ids) => ids.contains(&viewer),
        }
    }
}

/// One line of the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub visibility: Visibility,
    pub event: GameEvent,
}

impl LogEntry {
    pub fn public(event: GameEvent) -> Self {
        Self {
            visibility: Visibility::Public,
            event,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_visible_to(&self, viewer: PlayerId) -> bool {
        self.visibility.allows(viewer)
    }
}
