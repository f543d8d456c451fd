//! End-to-end token lifecycle scenarios.

use std::sync::Arc;

use authstash::events::{ClearReason, SessionEvent};
use authstash::storage::cookie::MemoryCookieJar;
use authstash::storage::origin::MemoryOriginStore;
use authstash::{ErrorKind, SessionEvents, SessionState, TokenService};

use super::helpers::{T0, TestProfile, issuance};

#[test]
fn test_login_then_authenticated() {
    let profile = TestProfile::in_memory();
    let service = profile.service();

    let outcome = service.store_tokens(&issuance()).unwrap();
    assert!(outcome.fully_persisted());
    assert_eq!(service.access_token().as_deref(), Some("A"));
    assert!(service.is_authenticated());

    let user = service.user_info().unwrap();
    assert_eq!(user.roles, vec!["admin", "editor"]);
}

#[test]
fn test_lifecycle_through_refresh_window_to_expiry() {
    let profile = TestProfile::in_memory();
    let service = profile.service();
    service.store_tokens(&issuance()).unwrap();

    profile.clock.set(T0 + 3_600_000 - 60_000);
    assert!(service.is_access_token_expired());
    assert!(service.is_authenticated());
    assert_eq!(service.session_state(), SessionState::AccessExpiringSoon);
    assert_eq!(service.time_until_expiry(), Some(60));

    profile.clock.set(T0 + 604_800_000 + 1);
    assert!(!service.is_authenticated());
    assert_eq!(service.access_token(), None);
    assert_eq!(service.user_info(), None);
}

#[test]
fn test_logout_clears_every_key() {
    let profile = TestProfile::in_memory();
    let service = profile.service();
    service.store_tokens(&issuance()).unwrap();

    service.clear_tokens();
    assert_eq!(service.user_info(), None);
    assert!(profile.origin.keys().unwrap().is_empty());
    assert!(profile.cookies().cookie_names().unwrap().is_empty());
}

#[test]
fn test_roles_not_json_read_back_empty() {
    let profile = TestProfile::in_memory();
    let service = profile.service();
    service.store_tokens(&issuance()).unwrap();
    profile.jar.set_disabled(true);
    profile.origin.set_item("user_roles", "not-json").unwrap();

    assert!(service.user_info().unwrap().roles.is_empty());
}

#[test]
fn test_new_tab_reads_through_origin_store() {
    let profile = TestProfile::in_memory();
    profile.service().store_tokens(&issuance()).unwrap();

    // Another process: same origin store, empty cookie jar.
    let fresh_jar = Arc::new(MemoryCookieJar::new(profile.clock.clone()));
    let other = TokenService::from_config(
        &profile.config,
        fresh_jar,
        profile.origin.clone(),
        profile.clock.clone(),
    );
    assert!(other.is_authenticated());
    assert_eq!(other.refresh_token().as_deref(), Some("R"));
}

#[test]
fn test_session_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("origin.json");

    TestProfile::on_disk(&path)
        .service()
        .store_tokens(&issuance())
        .unwrap();

    let restarted = TestProfile::on_disk(&path);
    let service = restarted.service();
    assert!(service.is_authenticated());
    assert_eq!(service.user_info().unwrap().user_id, "u1");

    service.clear_tokens();
    assert!(!TestProfile::on_disk(&path).service().is_authenticated());
}

#[test]
fn test_total_persistence_failure() {
    let profile = TestProfile::in_memory();
    profile.jar.set_disabled(true);
    let service = TokenService::from_config(
        &profile.config,
        profile.jar.clone(),
        Arc::new(MemoryOriginStore::with_quota(Some(1))),
        profile.clock.clone(),
    );

    let err = service.store_tokens(&issuance()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Persistence);
    assert!(!service.is_authenticated());
}

#[tokio::test]
async fn test_tabs_share_session_events() {
    let profile = TestProfile::in_memory();
    let events = SessionEvents::new();
    let first = TokenService::new(
        profile.cookies(),
        profile.origin.clone(),
        profile.clock.clone(),
        profile.config.token.clone(),
        events.clone(),
    );
    let second = TokenService::new(
        profile.cookies(),
        profile.origin.clone(),
        profile.clock.clone(),
        profile.config.token.clone(),
        events.clone(),
    );
    let mut rx = second.subscribe();

    first.store_tokens(&issuance()).unwrap();
    assert!(matches!(
        rx.recv().await.unwrap().event,
        SessionEvent::Stored { ref user_id, .. } if user_id == "u1"
    ));

    first.clear_tokens();
    assert_eq!(
        rx.recv().await.unwrap().event,
        SessionEvent::Cleared {
            reason: ClearReason::Logout
        }
    );
    assert!(!second.is_authenticated());
}
