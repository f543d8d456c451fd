//! Cookie attribute configuration.

use serde::{Deserialize, Serialize};

/// Default attributes applied to every cookie the cookie manager writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie `path` attribute.
    #[serde(default = "default_path")]
    pub path: String,
    /// Cookie `samesite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
    /// Explicit `secure` attribute. When unset, cookies are marked secure
    /// only in release builds.
    #[serde(default)]
    pub secure: Option<bool>,
}

impl CookieConfig {
    /// The effective `secure` flag.
    pub fn secure(&self) -> bool {
        self.secure.unwrap_or(cfg!(not(debug_assertions)))
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            same_site: SameSite::default(),
            secure: None,
        }
    }
}

/// The `samesite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    /// Sent only on same-site requests.
    #[default]
    Strict,
    /// Sent on same-site requests and top-level navigations.
    Lax,
    /// Sent on all requests (requires `secure` in browsers).
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "strict"),
            SameSite::Lax => write!(f, "lax"),
            SameSite::None => write!(f, "none"),
        }
    }
}

fn default_path() -> String {
    "/".to_string()
}
