use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::core::{piece::PieceKind, position::Position};

/// Facts a board reports to its listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BoardEvent {
    /// A matched piece left the board.
    PieceRemoved {
        position: Position,
        kind: PieceKind,
        round: usize,
    },
    /// A swap formed no match and was reverted.
    SwapRejected { a: Position, b: Position },
    /// A swap was committed and the board is stable again.
    TurnFinished { rounds: usize, removed: usize },
}

/// Single-listener notification channel scoped to one board.
///
/// Events are staged while a resolve call runs and only reach the listener
/// on [`flush`](Self::flush), after the call has committed. Staged events of
/// an aborted call are dropped with [`discard`](Self::discard).
#[derive(Debug, Default)]
pub struct EventPublisher {
    sender: Option<Sender<BoardEvent>>,
    staged: Vec<BoardEvent>,
}

impl EventPublisher {
    /// Connects a new listener, disconnecting the previous one.
    pub fn subscribe(&mut self) -> Receiver<BoardEvent> {
        let (sender, receiver) = mpsc::channel();
        self.sender = Some(sender);
        receiver
    }

    #[must_use]
    pub fn has_listener(&self) -> bool {
        self.sender.is_some()
    }

    pub(crate) fn stage(&mut self, event: BoardEvent) {
        if self.sender.is_some() {
            self.staged.push(event);
        }
    }

    pub(crate) fn discard(&mut self) {
        self.staged.clear();
    }

    pub(crate) fn flush(&mut self) {
        let Some(sender) = &self.sender else {
            self.staged.clear();
            return;
        };
        // Dropping the drain clears whatever a failed send left behind.
        let delivered = self
            .staged
            .drain(..)
            .all(|event| sender.send(event).is_ok());
        if !delivered {
            tracing::debug!("event listener disconnected");
            self.sender = None;
        }
    }
}
