//! Broadcast channel for session events.

use tokio::sync::broadcast;

use authstash_core::events::{SessionEvent, SessionNotice};

/// Default buffer size for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Cloneable sender shared by every service instance of one profile.
///
/// Publishing never fails: with no subscribers the event is dropped, and a
/// receiver that falls more than `capacity` events behind skips ahead.
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionNotice>,
}

impl SessionEvents {
    /// Create a channel with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a channel buffering up to `capacity` events per receiver.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns the number of receivers it reached.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(SessionNotice::new(event)).unwrap_or_default()
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
