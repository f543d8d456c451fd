//! Token service: persists the credential bundle and answers questions
//! about the session from stored timestamps.
//!
//! Two channels hold the bundle. The cookie channel is read first; the
//! origin store is the fallback. Writes go to both and each channel is
//! either complete or empty afterwards. No network peer is ever contacted.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use authstash_core::config::{AppConfig, TokenConfig};
use authstash_core::error::AppError;
use authstash_core::events::{ClearReason, SessionEvent, SessionNotice};
use authstash_core::result::AppResult;
use authstash_core::traits::{Clock, CookieJar, OriginStore};
use authstash_storage::cookie::{CookieManager, CookieOptions};

use super::bundle::{IssuanceResponse, TokenBundle, UserInfo, parse_roles};
use super::keys::{
    ACCESS_TOKEN, LAST_LOGIN_AT, LEGACY_TOKEN, ORIGIN_KEYS, REFRESH_EXPIRY, REFRESH_TOKEN,
    TOKEN_EXPIRY, TOKEN_ISSUED_AT, USER_EMAIL, USER_ID, USER_ROLES,
};
use super::state::{ChannelStatus, PersistOutcome, SessionState};
use crate::events::SessionEvents;

/// Manages the session credential lifecycle.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// Primary channel.
    cookies: CookieManager,
    /// Fallback channel.
    origin: Arc<dyn OriginStore>,
    /// Time source for expiry decisions.
    clock: Arc<dyn Clock>,
    /// Refresh window and event settings.
    config: TokenConfig,
    /// Notifications to other instances of the same profile.
    events: SessionEvents,
}

impl TokenService {
    /// Creates a token service over both channels.
    pub fn new(
        cookies: CookieManager,
        origin: Arc<dyn OriginStore>,
        clock: Arc<dyn Clock>,
        config: TokenConfig,
        events: SessionEvents,
    ) -> Self {
        Self {
            cookies,
            origin,
            clock,
            config,
            events,
        }
    }

    /// Creates a token service from application configuration with its own
    /// event channel.
    pub fn from_config(
        config: &AppConfig,
        jar: Arc<dyn CookieJar>,
        origin: Arc<dyn OriginStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            CookieManager::new(jar, config.cookie.clone()),
            origin,
            clock,
            config.token.clone(),
            SessionEvents::with_capacity(config.token.event_capacity),
        )
    }

    /// Persist a freshly issued bundle to both channels.
    ///
    /// Fails only when the issuance is invalid or neither channel could
    /// hold the bundle. A partial outcome is reported in the returned
    /// [`PersistOutcome`].
    pub fn store_tokens(&self, issuance: &IssuanceResponse) -> AppResult<PersistOutcome> {
        let bundle = issuance.to_bundle(self.clock.now_ms())?;

        let outcome = PersistOutcome {
            cookie: self.write_cookie_channel(&bundle, issuance),
            origin: self.write_origin_channel(&bundle),
        };

        if !outcome.any_persisted() {
            error!(
                user_id = %bundle.user_id,
                cookie = %outcome.cookie,
                origin = %outcome.origin,
                "Failed to persist session to any channel"
            );
            return Err(AppError::persistence("failed to persist session"));
        }

        if !outcome.fully_persisted() {
            warn!(
                user_id = %bundle.user_id,
                cookie = %outcome.cookie,
                origin = %outcome.origin,
                "Session persisted to one channel only"
            );
        }

        info!(
            user_id = %bundle.user_id,
            email = %bundle.email,
            roles = ?bundle.roles,
            expires_in = issuance.expires_in,
            refresh_expires_in = issuance.refresh_expires_in,
            "Session tokens stored"
        );

        self.events.publish(SessionEvent::Stored {
            user_id: bundle.user_id.clone(),
            access_expiry: bundle.access_expiry,
            refresh_expiry: bundle.refresh_expiry,
        });

        Ok(outcome)
    }

    fn write_cookie_channel(&self, bundle: &TokenBundle, issuance: &IssuanceResponse) -> ChannelStatus {
        let access_max_age = max_age(issuance.expires_in);
        let session_max_age = max_age(issuance.refresh_expires_in);
        let options = CookieOptions::default();

        let result = bundle.roles_json().and_then(|roles| {
            let writes = [
                (ACCESS_TOKEN, bundle.access_token.clone(), access_max_age),
                (TOKEN_EXPIRY, bundle.access_expiry.to_string(), session_max_age),
                (REFRESH_TOKEN, bundle.refresh_token.clone(), session_max_age),
                (REFRESH_EXPIRY, bundle.refresh_expiry.to_string(), session_max_age),
                (USER_ID, bundle.user_id.clone(), session_max_age),
                (USER_EMAIL, bundle.email.clone(), session_max_age),
                (USER_ROLES, roles, session_max_age),
            ];
            writes.iter().try_for_each(|(name, value, age)| {
                self.cookies.set_cookie(name, value, *age, &options)
            })
        });

        match result {
            Ok(()) => ChannelStatus::Persisted,
            Err(e) => {
                warn!(error = %e, "Cookie channel write failed, rolling back");
                if let Err(e) = self.cookies.clear_auth_cookies() {
                    warn!(error = %e, "Cookie channel rollback incomplete");
                }
                ChannelStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn write_origin_channel(&self, bundle: &TokenBundle) -> ChannelStatus {
        let result = bundle.roles_json().and_then(|roles| {
            let access_expiry = bundle.access_expiry.to_string();
            let refresh_expiry = bundle.refresh_expiry.to_string();
            let mut writes = vec![
                (ACCESS_TOKEN, bundle.access_token.as_str()),
                (REFRESH_TOKEN, bundle.refresh_token.as_str()),
                (TOKEN_EXPIRY, access_expiry.as_str()),
                (REFRESH_EXPIRY, refresh_expiry.as_str()),
                (USER_ID, bundle.user_id.as_str()),
                (USER_EMAIL, bundle.email.as_str()),
                (USER_ROLES, roles.as_str()),
                (TOKEN_ISSUED_AT, bundle.issued_at.as_str()),
                (LEGACY_TOKEN, bundle.access_token.as_str()),
            ];
            if let Some(last_login_at) = &bundle.last_login_at {
                writes.push((LAST_LOGIN_AT, last_login_at.as_str()));
            } else {
                self.origin.remove_item(LAST_LOGIN_AT)?;
            }
            writes
                .iter()
                .try_for_each(|(key, value)| self.origin.set_item(key, value))
        });

        match result {
            Ok(()) => ChannelStatus::Persisted,
            Err(e) => {
                warn!(error = %e, "Origin channel write failed, rolling back");
                self.clear_origin();
                ChannelStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Read a key from the cookie channel, falling back to the origin store.
    fn read(&self, key: &str) -> Option<String> {
        match self.cookies.get_cookie(key) {
            Ok(Some(value)) if !value.is_empty() => return Some(value),
            Ok(_) => {}
            Err(e) => warn!(key, error = %e, "Cookie read failed, falling back"),
        }
        match self.origin.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Origin store read failed");
                None
            }
        }
    }

    fn read_expiry(&self, key: &str) -> Option<i64> {
        let raw = self.read(key)?;
        match raw.trim().parse::<i64>() {
            Ok(expiry) => Some(expiry),
            Err(e) => {
                warn!(key, error = %e, "Stored expiry is not a number");
                None
            }
        }
    }

    /// The stored access token.
    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN)
    }

    /// The stored refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN)
    }

    /// Whether the access token is inside the refresh window, past its
    /// expiry, or has no readable expiry.
    pub fn is_access_token_expired(&self) -> bool {
        match self.read_expiry(TOKEN_EXPIRY) {
            Some(expiry) => {
                self.clock.now_ms() >= expiry.saturating_sub(self.config.refresh_window_ms())
            }
            None => true,
        }
    }

    /// Whether the refresh token is past its expiry or has no readable expiry.
    pub fn is_refresh_token_expired(&self) -> bool {
        match self.read_expiry(REFRESH_EXPIRY) {
            Some(expiry) => self.clock.now_ms() >= expiry,
            None => true,
        }
    }

    /// Derive the current session state.
    ///
    /// Reaching [`SessionState::RefreshExpired`] clears both channels, so
    /// the following call reports [`SessionState::Unauthenticated`].
    pub fn session_state(&self) -> SessionState {
        if self.access_token().is_none() || self.refresh_token().is_none() {
            return SessionState::Unauthenticated;
        }

        if self.is_refresh_token_expired() {
            let user_id = self.read(USER_ID);
            info!(user_id = user_id.as_deref().unwrap_or_default(), "Refresh token expired, clearing session");
            self.clear_all();
            self.events.publish(SessionEvent::Expired { user_id });
            return SessionState::RefreshExpired;
        }

        if self.is_access_token_expired() {
            debug!("Access token inside refresh window");
            SessionState::AccessExpiringSoon
        } else {
            SessionState::Authenticated
        }
    }

    /// Whether usable credentials are stored. Clears an expired session.
    pub fn is_authenticated(&self) -> bool {
        self.session_state().is_authenticated()
    }

    /// Identity of the signed-in user, if id and email are stored.
    pub fn user_info(&self) -> Option<UserInfo> {
        let user_id = self.read(USER_ID)?;
        let email = self.read(USER_EMAIL)?;
        let roles = self
            .read(USER_ROLES)
            .map(|raw| parse_roles(&raw))
            .unwrap_or_default();
        Some(UserInfo {
            user_id,
            email,
            roles,
        })
    }

    /// Whole seconds until the access token expires, floored at zero.
    pub fn time_until_expiry(&self) -> Option<u64> {
        let expiry = self.read_expiry(TOKEN_EXPIRY)?;
        let remaining_ms = expiry.saturating_sub(self.clock.now_ms()).max(0);
        Some((remaining_ms / 1000) as u64)
    }

    /// Remove the session from both channels (logout).
    pub fn clear_tokens(&self) {
        self.clear_all();
        info!("Session cleared");
        self.events.publish(SessionEvent::Cleared {
            reason: ClearReason::Logout,
        });
    }

    /// Receive session events from every service sharing this channel.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.events.subscribe()
    }

    fn clear_all(&self) {
        if let Err(e) = self.cookies.clear_auth_cookies() {
            warn!(error = %e, "Failed to clear cookie channel");
        }
        self.clear_origin();
    }

    fn clear_origin(&self) {
        for key in ORIGIN_KEYS {
            if let Err(e) = self.origin.remove_item(key) {
                warn!(key, error = %e, "Failed to remove origin key");
            }
        }
    }
}

fn max_age(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX)
}
