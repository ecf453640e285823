//! Debounced snapshot persistence.
//!
//! The coordinator is a small timer state machine owned by the resolution
//! service event loop. The loop reports cache mutations, asks whether a flush
//! is due, and reports when the spawned save has finished.

use std::time::Duration;
use tokio::time::Instant;

/// Flush timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    /// Nothing to write
    Idle,
    /// A flush is scheduled for `deadline`
    Pending { deadline: Instant },
    /// A save is running; `rearm` records mutations made meanwhile
    Flushing { rearm: bool },
}

#[derive(Debug)]
pub struct PersistenceCoordinator {
    debounce: Duration,
    state: FlushState,
}

impl PersistenceCoordinator {
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: FlushState::Idle,
        }
    }

    /// Arm the flush timer. Mutations while a flush is pending do not push
    /// the deadline back, so a burst coalesces into one write.
    pub fn on_mutation(&mut self, now: Instant) {
        self.state = match self.state {
            FlushState::Idle => FlushState::Pending {
                deadline: now + self.debounce,
            },
            FlushState::Pending { deadline } => FlushState::Pending { deadline },
            FlushState::Flushing { .. } => FlushState::Flushing { rearm: true },
        };
    }

    /// Deadline of the pending flush, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            FlushState::Pending { deadline } => Some(deadline),
            FlushState::Idle | FlushState::Flushing { .. } => None,
        }
    }

    /// Move a due pending flush into the flushing state.
    ///
    /// Returns `true` when the caller should start the save.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.state {
            FlushState::Pending { deadline } if deadline <= now => {
                self.state = FlushState::Flushing { rearm: false };
                true
            }
            _ => false,
        }
    }

    /// Record that the running save finished, successfully or not.
    pub fn flush_finished(&mut self, now: Instant) {
        self.state = match self.state {
            FlushState::Flushing { rearm: true } => FlushState::Pending {
                deadline: now + self.debounce,
            },
            FlushState::Flushing { rearm: false } | FlushState::Idle => FlushState::Idle,
            pending @ FlushState::Pending { .. } => pending,
        };
    }

    /// Drop a pending flush because the caller is writing synchronously.
    ///
    /// A running save is left alone.
    pub fn cancel_pending(&mut self) {
        if matches!(self.state, FlushState::Pending { .. }) {
            self.state = FlushState::Idle;
        }
    }

    pub const fn state(&self) -> FlushState {
        self.state
    }

    pub const fn is_flushing(&self) -> bool {
        matches!(self.state, FlushState::Flushing { .. })
    }
}
