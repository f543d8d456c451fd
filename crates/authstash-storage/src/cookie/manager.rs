//! Cookie string construction and parsing with security attributes.
//!
//! Cookies written here never carry `httponly`: they must stay readable
//! from the client so tokens can be read back without a round trip. That
//! keeps them exposed to script injection, and is the accepted cost.

use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::warn;

use authstash_core::config::{CookieConfig, SameSite};
use authstash_core::result::AppResult;
use authstash_core::traits::CookieJar;

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Cookie names written by the token service.
pub const ACCESS_TOKEN: &str = "access_token";
/// Refresh token cookie.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Access expiry marker cookie (epoch-ms).
pub const TOKEN_EXPIRY: &str = "token_expiry";
/// Refresh expiry marker cookie (epoch-ms).
pub const REFRESH_EXPIRY: &str = "refresh_expiry";
/// User id cookie.
pub const USER_ID: &str = "user_id";
/// User email cookie.
pub const USER_EMAIL: &str = "user_email";
/// User roles cookie (JSON array).
pub const USER_ROLES: &str = "user_roles";

/// Every cookie that makes up an authenticated session.
pub const AUTH_COOKIES: [&str; 7] = [
    ACCESS_TOKEN,
    REFRESH_TOKEN,
    TOKEN_EXPIRY,
    REFRESH_EXPIRY,
    USER_ID,
    USER_EMAIL,
    USER_ROLES,
];

/// Per-call overrides of the configured cookie attributes.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    /// Overrides the `path` attribute.
    pub path: Option<String>,
    /// Overrides the `secure` attribute.
    pub secure: Option<bool>,
    /// Overrides the `samesite` attribute.
    pub same_site: Option<SameSite>,
}

/// Reads and writes cookies through a [`CookieJar`].
#[derive(Debug, Clone)]
pub struct CookieManager {
    jar: Arc<dyn CookieJar>,
    config: CookieConfig,
}

impl CookieManager {
    /// Create a cookie manager over a jar.
    pub fn new(jar: Arc<dyn CookieJar>, config: CookieConfig) -> Self {
        Self { jar, config }
    }

    /// The configured attribute defaults.
    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Build the set-cookie string for `name=value`.
    pub fn build_cookie(
        &self,
        name: &str,
        value: &str,
        max_age_seconds: i64,
        overrides: &CookieOptions,
    ) -> String {
        let path = overrides.path.as_deref().unwrap_or(&self.config.path);
        let same_site = overrides.same_site.unwrap_or(self.config.same_site);
        let secure = overrides.secure.unwrap_or_else(|| self.config.secure());

        let mut cookie = format!(
            "{}={}; path={path}; max-age={max_age_seconds}; samesite={same_site}",
            utf8_percent_encode(name, COMPONENT),
            utf8_percent_encode(value, COMPONENT),
        );
        if secure {
            cookie.push_str("; secure");
        }
        cookie
    }

    /// Write a cookie that lives for `max_age_seconds`.
    pub fn set_cookie(
        &self,
        name: &str,
        value: &str,
        max_age_seconds: i64,
        overrides: &CookieOptions,
    ) -> AppResult<()> {
        let cookie = self.build_cookie(name, value, max_age_seconds, overrides);
        self.jar.set_cookie(&cookie)
    }

    /// Read a cookie by its decoded name.
    pub fn get_cookie(&self, name: &str) -> AppResult<Option<String>> {
        let header = self.jar.cookie_string()?;
        Ok(parse_cookies(&header)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v))
    }

    /// Delete a cookie by rewriting it with `max-age=0`.
    pub fn delete_cookie(&self, name: &str) -> AppResult<()> {
        self.set_cookie(name, "", 0, &CookieOptions::default())
    }

    /// Decoded names of every visible cookie, in jar order, without duplicates.
    pub fn cookie_names(&self) -> AppResult<Vec<String>> {
        let header = self.jar.cookie_string()?;
        let mut names: Vec<String> = Vec::new();
        for (name, _) in parse_cookies(&header) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Delete every session cookie.
    ///
    /// All deletions are attempted; the last failure, if any, is returned.
    pub fn clear_auth_cookies(&self) -> AppResult<()> {
        let mut outcome = Ok(());
        for name in AUTH_COOKIES {
            if let Err(e) = self.delete_cookie(name) {
                warn!(cookie = name, error = %e, "Failed to delete auth cookie");
                outcome = Err(e);
            }
        }
        outcome
    }
}

/// Split a cookie header into decoded `(name, value)` pairs.
///
/// Pairs split on the first `=`; a segment without `=` is a name with an
/// empty value. Undecodable percent sequences are kept verbatim.
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryCookieJar;
    use authstash_core::traits::ManualClock;

    fn make_manager(secure: Option<bool>) -> CookieManager {
        let jar = Arc::new(MemoryCookieJar::new(Arc::new(ManualClock::new(0))));
        let config = CookieConfig {
            secure,
            ..CookieConfig::default()
        };
        CookieManager::new(jar, config)
    }

    #[test]
    fn test_build_cookie_wire_format() {
        let manager = make_manager(Some(false));
        let cookie = manager.build_cookie("access_token", "abc", 3600, &CookieOptions::default());
        assert_eq!(cookie, "access_token=abc; path=/; max-age=3600; samesite=strict");
    }

    #[test]
    fn test_build_cookie_secure_and_overrides() {
        let manager = make_manager(Some(true));
        let overrides = CookieOptions {
            path: Some("/app".to_string()),
            same_site: Some(SameSite::Lax),
            secure: None,
        };
        let cookie = manager.build_cookie("k", "v", 5, &overrides);
        assert_eq!(cookie, "k=v; path=/app; max-age=5; samesite=lax; secure");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let manager = make_manager(Some(false));
        let cookie = manager.build_cookie("user roles", "[\"a\",\"b\"]; x", 1, &CookieOptions::default());
        assert!(cookie.starts_with("user%20roles=%5B%22a%22%2C%22b%22%5D%3B%20x;"));
    }

    #[test]
    fn test_set_get_roundtrip_with_special_characters() {
        let manager = make_manager(Some(false));
        let value = "a=b; c=d, é";
        manager
            .set_cookie("weird name", value, 60, &CookieOptions::default())
            .unwrap();
        assert_eq!(
            manager.get_cookie("weird name").unwrap(),
            Some(value.to_string())
        );
    }

    #[test]
    fn test_get_missing_cookie() {
        let manager = make_manager(Some(false));
        assert_eq!(manager.get_cookie("nope").unwrap(), None);
    }

    #[test]
    fn test_delete_cookie() {
        let manager = make_manager(Some(false));
        manager
            .set_cookie("a", "1", 60, &CookieOptions::default())
            .unwrap();
        manager.delete_cookie("a").unwrap();
        assert_eq!(manager.get_cookie("a").unwrap(), None);
    }

    #[test]
    fn test_clear_auth_cookies_leaves_others() {
        let manager = make_manager(Some(false));
        for name in AUTH_COOKIES {
            manager
                .set_cookie(name, "x", 60, &CookieOptions::default())
                .unwrap();
        }
        manager
            .set_cookie("theme", "dark", 60, &CookieOptions::default())
            .unwrap();
        manager.clear_auth_cookies().unwrap();
        assert_eq!(manager.cookie_names().unwrap(), vec!["theme".to_string()]);
    }

    #[test]
    fn test_parse_cookies_first_equals_split() {
        let pairs = parse_cookies(" a=1=2 ; flag; b=%ZZ ");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1=2".to_string()),
                ("flag".to_string(), String::new()),
                ("b".to_string(), "%ZZ".to_string()),
            ]
        );
    }
}
