//! In-process cookie jar with `document.cookie` semantics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::{Clock, CookieJar};

/// Browsers reject cookies whose name and value exceed this many bytes.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// A cookie held by the jar. Name and value stay in their encoded form.
#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    /// Absolute expiry in epoch-ms; `None` for session cookies.
    expires_at: Option<i64>,
}

/// Cookie jar kept in memory, evaluated against an injected clock.
///
/// Cookies are identified by `(name, path)`. Only cookies whose path is a
/// prefix of the jar's document path are visible through
/// [`CookieJar::cookie_string`].
#[derive(Debug)]
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    document_path: String,
    disabled: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl MemoryCookieJar {
    /// Create an empty jar viewed from document path `/`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_document_path(clock, "/")
    }

    /// Create an empty jar viewed from the given document path.
    pub fn with_document_path(clock: Arc<dyn Clock>, document_path: impl Into<String>) -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            document_path: document_path.into(),
            disabled: AtomicBool::new(false),
            clock,
        }
    }

    /// Simulate cookies being blocked. Every access fails while disabled.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn ensure_enabled(&self) -> AppResult<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("Cookies are disabled"));
        }
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<StoredCookie>>> {
        self.cookies
            .lock()
            .map_err(|_| AppError::internal("Cookie jar lock poisoned"))
    }

    fn is_visible(&self, cookie: &StoredCookie, now: i64) -> bool {
        let live = cookie.expires_at.is_none_or(|at| at > now);
        live && path_matches(&self.document_path, &cookie.path)
    }
}

/// RFC 6265 path-match: `cookie_path` is a prefix of `request_path` that
/// ends on a `/` boundary.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some("") => true,
        Some(rest) => cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Attributes parsed out of a set-cookie string.
struct ParsedCookie {
    name: String,
    value: String,
    path: Option<String>,
    max_age: Option<i64>,
}

fn parse_set_cookie(raw: &str) -> AppResult<ParsedCookie> {
    let mut parts = raw.split(';');
    let pair = parts.next().unwrap_or_default().trim();
    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Cookie name must not be empty"));
    }

    let mut parsed = ParsedCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        path: None,
        max_age: None,
    };

    for attr in parts {
        let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
        match key.trim().to_ascii_lowercase().as_str() {
            "path" => parsed.path = Some(val.trim().to_string()),
            "max-age" => {
                let seconds = val.trim().parse::<i64>().map_err(|_| {
                    AppError::validation(format!("Invalid max-age '{}'", val.trim()))
                })?;
                parsed.max_age = Some(seconds);
            }
            // Attributes that only matter on the wire.
            _ => {}
        }
    }

    Ok(parsed)
}

impl CookieJar for MemoryCookieJar {
    fn cookie_string(&self) -> AppResult<String> {
        self.ensure_enabled()?;
        let now = self.clock.now_ms();
        let cookies = self.lock()?;
        let pairs: Vec<String> = cookies
            .iter()
            .filter(|c| self.is_visible(c, now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        Ok(pairs.join("; "))
    }

    fn set_cookie(&self, raw: &str) -> AppResult<()> {
        self.ensure_enabled()?;
        let parsed = parse_set_cookie(raw)?;

        if parsed.name.len() + parsed.value.len() > MAX_COOKIE_BYTES {
            return Err(AppError::quota_exceeded(format!(
                "Cookie '{}' exceeds {MAX_COOKIE_BYTES} bytes",
                parsed.name
            )));
        }

        let now = self.clock.now_ms();
        let path = parsed.path.unwrap_or_else(|| "/".to_string());
        let mut cookies = self.lock()?;
        cookies.retain(|c| c.expires_at.is_none_or(|at| at > now));

        let position = cookies
            .iter()
            .position(|c| c.name == parsed.name && c.path == path);

        if parsed.max_age.is_some_and(|age| age <= 0) {
            if let Some(index) = position {
                cookies.remove(index);
                debug!(name = %parsed.name, "Cookie deleted");
            }
            return Ok(());
        }

        let cookie = StoredCookie {
            name: parsed.name,
            value: parsed.value,
            path,
            expires_at: parsed
                .max_age
                .map(|age| now.saturating_add(age.saturating_mul(1000))),
        };

        match position {
            Some(index) => cookies[index] = cookie,
            None => cookies.push(cookie),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authstash_core::error::ErrorKind;
    use authstash_core::traits::ManualClock;

    fn make_jar() -> (Arc<ManualClock>, MemoryCookieJar) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let jar = MemoryCookieJar::new(clock.clone());
        (clock, jar)
    }

    #[test]
    fn test_set_and_read() {
        let (_, jar) = make_jar();
        jar.set_cookie("a=1; path=/; max-age=60").unwrap();
        jar.set_cookie("b=2; path=/; max-age=60; samesite=strict; secure")
            .unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "a=1; b=2");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let (_, jar) = make_jar();
        jar.set_cookie("a=1; max-age=60").unwrap();
        jar.set_cookie("b=2; max-age=60").unwrap();
        jar.set_cookie("a=3; max-age=60").unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "a=3; b=2");
    }

    #[test]
    fn test_max_age_expiry() {
        let (clock, jar) = make_jar();
        jar.set_cookie("a=1; max-age=10").unwrap();
        clock.advance(9_999);
        assert_eq!(jar.cookie_string().unwrap(), "a=1");
        clock.advance(1);
        assert_eq!(jar.cookie_string().unwrap(), "");
    }

    #[test]
    fn test_zero_max_age_deletes() {
        let (_, jar) = make_jar();
        jar.set_cookie("a=1; path=/; max-age=60").unwrap();
        jar.set_cookie("a=; path=/; max-age=0").unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "");
    }

    #[test]
    fn test_session_cookie_never_expires() {
        let (clock, jar) = make_jar();
        jar.set_cookie("a=1").unwrap();
        clock.advance(i64::from(u32::MAX));
        assert_eq!(jar.cookie_string().unwrap(), "a=1");
    }

    #[test]
    fn test_path_scoping() {
        let clock = Arc::new(ManualClock::new(0));
        let jar = MemoryCookieJar::with_document_path(clock, "/app");
        jar.set_cookie("root=1; path=/").unwrap();
        jar.set_cookie("admin=1; path=/admin").unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "root=1");
    }

    #[test]
    fn test_path_match_stops_at_segment_boundary() {
        let clock = Arc::new(ManualClock::new(0));
        for (document_path, visible) in [("/app", true), ("/app/x", true), ("/application", false)] {
            let jar = MemoryCookieJar::with_document_path(clock.clone(), document_path);
            jar.set_cookie("scoped=1; path=/app").unwrap();
            let expected = if visible { "scoped=1" } else { "" };
            assert_eq!(jar.cookie_string().unwrap(), expected, "from {document_path}");
        }
        assert!(path_matches("/app/x", "/app/"));
        assert!(!path_matches("/", "/app"));
    }

    #[test]
    fn test_disabled_jar_fails() {
        let (_, jar) = make_jar();
        jar.set_disabled(true);
        let err = jar.set_cookie("a=1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert!(jar.cookie_string().is_err());
    }

    #[test]
    fn test_oversized_cookie_rejected() {
        let (_, jar) = make_jar();
        let raw = format!("big={}", "x".repeat(MAX_COOKIE_BYTES));
        let err = jar.set_cookie(&raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_invalid_max_age_rejected() {
        let (_, jar) = make_jar();
        assert!(jar.set_cookie("a=1; max-age=soon").is_err());
        assert!(jar.set_cookie("=1").is_err());
    }
}
