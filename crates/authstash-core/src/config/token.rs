//! Token lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings for the token service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// How long before the access expiry the session is flagged for refresh.
    #[serde(default = "default_refresh_window")]
    pub refresh_window_seconds: u64,
    /// Buffered capacity of the session event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl TokenConfig {
    /// The refresh window in milliseconds.
    pub fn refresh_window_ms(&self) -> i64 {
        (self.refresh_window_seconds as i64).saturating_mul(1000)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            refresh_window_seconds: default_refresh_window(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_refresh_window() -> u64 {
    300
}

fn default_event_capacity() -> usize {
    64
}
