//! Cookie channel: set-cookie construction, parsing, and an in-process jar.

pub mod jar;
pub mod manager;

pub use jar::MemoryCookieJar;
pub use manager::{AUTH_COOKIES, CookieManager, CookieOptions, parse_cookies};
