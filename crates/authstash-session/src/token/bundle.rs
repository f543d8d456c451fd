//! Issuance input and the persisted credential bundle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use authstash_core::error::AppError;
use authstash_core::result::AppResult;

/// Credentials handed over by the authentication transport after login
/// or refresh. Lifetimes are in seconds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: u64,
    /// Authenticated user.
    pub user_id: String,
    /// User email.
    pub email: String,
    /// Roles in issuance order.
    #[serde(default)]
    pub roles: Vec<String>,
    /// ISO-8601 issuance time.
    pub issued_at: String,
    /// ISO-8601 time of the previous login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl std::fmt::Debug for IssuanceResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceResponse")
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("issued_at", &self.issued_at)
            .field("last_login_at", &self.last_login_at)
            .finish_non_exhaustive()
    }
}

impl IssuanceResponse {
    /// Reject issuances that cannot form a consistent bundle.
    pub fn validate(&self) -> AppResult<()> {
        if self.access_token.is_empty() {
            return Err(AppError::validation("access_token must not be empty"));
        }
        if self.refresh_token.is_empty() {
            return Err(AppError::validation("refresh_token must not be empty"));
        }
        if self.expires_in > self.refresh_expires_in {
            return Err(AppError::validation(format!(
                "expires_in ({}s) exceeds refresh_expires_in ({}s)",
                self.expires_in, self.refresh_expires_in
            )));
        }
        Ok(())
    }

    /// Build the bundle issued at `now_ms`.
    pub fn to_bundle(&self, now_ms: i64) -> AppResult<TokenBundle> {
        self.validate()?;
        Ok(TokenBundle {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            access_expiry: expiry_at(now_ms, self.expires_in),
            refresh_expiry: expiry_at(now_ms, self.refresh_expires_in),
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            issued_at: self.issued_at.clone(),
            last_login_at: self.last_login_at.clone(),
        })
    }
}

fn expiry_at(now_ms: i64, lifetime_seconds: u64) -> i64 {
    let lifetime_ms = i64::try_from(lifetime_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    now_ms.saturating_add(lifetime_ms)
}

/// The persisted session credentials. Expiries are epoch milliseconds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token used to obtain a new access token.
    pub refresh_token: String,
    /// When the access token stops being valid.
    pub access_expiry: i64,
    /// When the session becomes unrecoverable.
    pub refresh_expiry: i64,
    /// Identifier of the signed-in user.
    pub user_id: String,
    /// Email address of the signed-in user.
    pub email: String,
    /// Roles granted to the user.
    pub roles: Vec<String>,
    /// Issuance time as reported with the credentials.
    pub issued_at: String,
    /// Time of the previous login, when reported.
    pub last_login_at: Option<String>,
}

impl std::fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBundle")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl TokenBundle {
    /// Roles serialized as a JSON array string.
    pub fn roles_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&self.roles)?)
    }
}

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Identifier of the user.
    pub user_id: String,
    /// Email address of the user.
    pub email: String,
    /// Roles granted to the user; empty when none are stored.
    pub roles: Vec<String>,
}

/// Parse a stored roles value.
///
/// Anything other than a JSON array yields no roles; non-string elements
/// are skipped.
pub fn parse_roles(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(role) => Some(role),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            warn!("Stored roles are not a JSON array, ignoring");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Stored roles are not valid JSON, ignoring");
            Vec::new()
        }
    }
}
