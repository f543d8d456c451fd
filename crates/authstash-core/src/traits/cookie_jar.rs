//! `document.cookie`-style jar interface.

use crate::result::AppResult;

/// A synchronous cookie jar with the semantics of a browser's
/// script-visible cookie string.
///
/// Reading returns every live cookie as `name=value; name2=value2`.
/// Writing applies a single set-cookie string including its attributes;
/// a `max-age` of zero or less deletes the cookie.
pub trait CookieJar: Send + Sync + std::fmt::Debug + 'static {
    /// The current cookie header string.
    fn cookie_string(&self) -> AppResult<String>;

    /// Apply one `name=value; attr=...` string.
    fn set_cookie(&self, raw: &str) -> AppResult<()>;
}
