//! Key names shared by the cookie and origin channels.

pub use authstash_storage::cookie::manager::{
    ACCESS_TOKEN, REFRESH_EXPIRY, REFRESH_TOKEN, TOKEN_EXPIRY, USER_EMAIL, USER_ID, USER_ROLES,
};

/// ISO-8601 issuance time (origin channel only).
pub const TOKEN_ISSUED_AT: &str = "token_issued_at";
/// Previous login time (origin channel only).
pub const LAST_LOGIN_AT: &str = "last_login_at";
/// Single-key mirror of the access token read by older clients.
pub const LEGACY_TOKEN: &str = "token";

/// Every key the origin channel may hold for a session.
pub const ORIGIN_KEYS: [&str; 10] = [
    ACCESS_TOKEN,
    REFRESH_TOKEN,
    TOKEN_EXPIRY,
    REFRESH_EXPIRY,
    USER_ID,
    USER_EMAIL,
    USER_ROLES,
    TOKEN_ISSUED_AT,
    LAST_LOGIN_AT,
    LEGACY_TOKEN,
];
