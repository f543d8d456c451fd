//! Derived session state and persistence outcomes.

use serde::Serialize;

/// Session state derived from stored timestamps on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No access or refresh token is stored.
    Unauthenticated,
    /// Both tokens are stored and the access token is outside the refresh window.
    Authenticated,
    /// The access token is inside the refresh window or past expiry while the
    /// refresh token is still valid. Still usable; the caller should refresh.
    AccessExpiringSoon,
    /// The refresh token expired. Entering this state clears the session.
    RefreshExpired,
}

impl SessionState {
    /// Whether the stored credentials may still be used.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::AccessExpiringSoon)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::AccessExpiringSoon => write!(f, "access_expiring_soon"),
            Self::RefreshExpired => write!(f, "refresh_expired"),
        }
    }
}

/// Result of writing the bundle to one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Every key was written.
    Persisted,
    /// A write failed; keys already written were removed again.
    Failed {
        /// The underlying failure.
        reason: String,
    },
}

impl ChannelStatus {
    /// Whether the channel holds the whole bundle.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persisted => write!(f, "persisted"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Which channels hold the bundle after `store_tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    /// Status of the cookie jar write.
    pub cookie: ChannelStatus,
    /// Status of the origin store write.
    pub origin: ChannelStatus,
}

impl PersistOutcome {
    /// At least one channel holds the bundle.
    pub fn any_persisted(&self) -> bool {
        self.cookie.is_persisted() || self.origin.is_persisted()
    }

    /// Both channels hold the bundle.
    pub fn fully_persisted(&self) -> bool {
        self.cookie.is_persisted() && self.origin.is_persisted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiring_soon_is_still_authenticated() {
        assert!(SessionState::AccessExpiringSoon.is_authenticated());
        assert!(!SessionState::RefreshExpired.is_authenticated());
        assert!(!SessionState::Unauthenticated.is_authenticated());
    }

    #[test]
    fn test_outcome_json() {
        let outcome = PersistOutcome {
            cookie: ChannelStatus::Failed {
                reason: "disabled".to_string(),
            },
            origin: ChannelStatus::Persisted,
        };
        assert!(outcome.any_persisted());
        assert!(!outcome.fully_persisted());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["cookie"]["status"], "failed");
        assert_eq!(json["origin"]["status"], "persisted");
    }
}
