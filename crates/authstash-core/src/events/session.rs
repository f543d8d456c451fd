//! Session lifecycle events.

use serde::{Deserialize, Serialize};

/// Events emitted by the token service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A credential bundle was persisted.
    Stored {
        /// The user the bundle belongs to.
        user_id: String,
        /// Access expiry instant (epoch-ms).
        access_expiry: i64,
        /// Refresh expiry instant (epoch-ms).
        refresh_expiry: i64,
    },
    /// All persisted session state was removed.
    Cleared {
        /// Why the session was cleared.
        reason: ClearReason,
    },
    /// The refresh token expired and the session became unrecoverable.
    Expired {
        /// The user whose session expired, when still known.
        user_id: Option<String>,
    },
}

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// Explicit logout.
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = SessionEvent::Cleared {
            reason: ClearReason::Logout,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Cleared");
        assert_eq!(json["reason"], "logout");
    }
}
