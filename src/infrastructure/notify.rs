//! Broadcast notifier adapter

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::ports::Notifier;

/// A successful resolution as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameResolved {
    pub handle: String,
    pub name: String,
}

/// Notifier that fans resolutions out over a tokio broadcast channel.
///
/// Sending never blocks. Slow subscribers lag and lose the oldest events;
/// with no subscribers events are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<NameResolved>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NameResolved> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Notifier for BroadcastNotifier {
    fn on_resolved(&self, handle: &str, name: &str) {
        let event = NameResolved {
            handle: handle.to_string(),
            name: name.to_string(),
        };
        if self.sender.send(event).is_err() {
            trace!(handle, "no subscribers for resolution");
        }
    }
}
