//! Session events published to every instance sharing one profile.
//!
//! Events are best-effort notifications: a receiver that is not listening
//! or lags behind simply misses them.

pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::{ClearReason, SessionEvent};

/// Wrapper for a session event with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNotice {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub event: SessionEvent,
}

impl SessionNotice {
    /// Create a new notice stamped with the current time.
    pub fn new(event: SessionEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}
