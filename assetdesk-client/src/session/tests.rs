//! Tests for the session store

use super::*;
use crate::events::UiEvent;
use crate::testing::{navigations, notices, operator, Harness, Reply};
use assetdesk_core::{Role, View};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn login_backend() -> Harness {
    Harness::new(|request| {
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap();
        if body["password"] == "correct horse" {
            Reply::Json(
                200,
                json!({
                    "message": "Login successful",
                    "user": {"id": 7, "name": "Ada Lovelace", "email": "ada@example.com", "role": "Admin"}
                }),
            )
        } else {
            Reply::Json(401, json!({"error": "Invalid email or password"}))
        }
    })
}

#[test]
fn test_initialize_without_stored_session_requests_login() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));

    assert_eq!(harness.session.initialize().unwrap(), None);
    assert!(!harness.session.is_logged_in());
    assert_eq!(
        harness.drain_events(),
        vec![UiEvent::Navigate(View::Login)]
    );
}

#[test]
fn test_initialize_restores_persisted_session() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    let keys = assetdesk_core::StorageKeys::default();
    harness.storage.set(&keys.user_id, "12").unwrap();
    harness.storage.set(&keys.user_name, "Grace").unwrap();
    harness.storage.set(&keys.user_email, "grace@example.com").unwrap();
    harness.storage.set(&keys.user_role, "IT_Personnel").unwrap();

    let identity = harness.session.initialize().unwrap().unwrap();
    assert_eq!(identity.user_id, "12");
    assert!(harness.session.has_role(Role::ItPersonnel));
    assert_eq!(
        harness.drain_events(),
        vec![UiEvent::SessionChanged(Some(identity))]
    );
}

#[test]
fn test_initialize_discards_partial_session() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    let keys = assetdesk_core::StorageKeys::default();
    harness.storage.set(&keys.user_id, "12").unwrap();
    harness.storage.set(&keys.user_role, "Admin").unwrap();

    assert_eq!(harness.session.initialize().unwrap(), None);
    assert!(harness.storage.is_empty());
    assert_eq!(navigations(&harness.drain_events()), 1);
}

#[tokio::test]
async fn test_login_persists_identity_and_headers() {
    let mut harness = login_backend();

    let identity = harness
        .session
        .login(&harness.gateway, &Credentials::new("ada@example.com", "correct horse"))
        .await
        .unwrap();

    assert_eq!(identity, operator("Admin"));
    assert_eq!(harness.storage.len(), 4);
    let keys = assetdesk_core::StorageKeys::default();
    assert_eq!(harness.storage.get(&keys.user_id).unwrap().as_deref(), Some("7"));
    assert_eq!(
        harness.storage.get(&keys.user_email).unwrap().as_deref(),
        Some("ada@example.com")
    );

    let headers = harness.session.headers();
    assert_eq!(headers[USER_ID_HEADER], "7");
    assert_eq!(headers[USER_ROLE_HEADER], "Admin");
    assert_eq!(headers["accept"], "application/json");

    let login_request = harness.transport.last_request();
    assert_eq!(login_request.url, "http://backend.test/login");
    assert!(login_request.headers.get(USER_ID_HEADER).is_none());

    let events = harness.drain_events();
    assert_eq!(notices(&events), vec!["Login successful!".to_string()]);
}

#[tokio::test]
async fn test_rejected_login_leaves_store_untouched() {
    let mut harness = login_backend();

    let rejected = harness
        .session
        .login(&harness.gateway, &Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(rejected.message, "Invalid email or password");
    assert!(!harness.session.is_logged_in());
    assert!(harness.storage.is_empty());

    // A 401 on the login route is a rejection, not an expired session
    let events = harness.drain_events();
    assert_eq!(navigations(&events), 0);
    assert_eq!(notices(&events), vec!["Invalid email or password".to_string()]);
}

#[tokio::test]
async fn test_login_fallback_messages() {
    let harness = Harness::new(|_| Reply::Text(500, "Internal server error"));
    let rejected = harness
        .session
        .login(&harness.gateway, &Credentials::new("a", "b"))
        .await
        .unwrap_err();
    assert_eq!(rejected.message, "Login failed");

    let harness = Harness::new(|_| Reply::Json(200, json!({"message": "ok"})));
    let rejected = harness
        .session
        .login(&harness.gateway, &Credentials::new("a", "b"))
        .await
        .unwrap_err();
    assert_eq!(rejected.message, "Invalid response from server");
    assert!(!harness.session.is_logged_in());

    let harness = Harness::new(|_| Reply::Fail("connection refused"));
    let rejected = harness
        .session
        .login(&harness.gateway, &Credentials::new("a", "b"))
        .await
        .unwrap_err();
    assert_eq!(rejected.message, "Login failed. Please try again.");
}

#[test]
fn test_has_role_is_exact() {
    let harness = Harness::new(|_| Reply::Json(200, json!({})));
    assert!(!harness.session.has_role("Admin"));

    harness.sign_in("Admin");
    assert!(harness.session.has_role("Admin"));
    assert!(harness.session.has_role(Role::Admin));
    assert!(!harness.session.has_role("admin"));
    assert!(!harness.session.has_role("ADMIN"));
    assert!(!harness.session.has_role(Role::ItPersonnel));
}

#[test]
fn test_headers_when_logged_out() {
    let harness = Harness::new(|_| Reply::Json(200, json!({})));
    let headers = harness.session.headers();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers["content-type"], "application/json");
    assert!(harness.session.identity_headers().is_empty());
}

#[test]
fn test_logout_without_redirect_is_idempotent() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    harness.sign_in("User");

    assert!(harness.session.logout(false));
    assert!(!harness.session.logout(false));
    assert!(!harness.session.is_logged_in());
    assert!(harness.storage.is_empty());

    let events = harness.drain_events();
    assert_eq!(events, vec![UiEvent::SessionChanged(None)]);
}

#[tokio::test]
async fn test_logout_with_redirect_navigates_after_delay() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    harness.sign_in("User");

    assert!(harness.session.logout(true));
    let immediate = harness.drain_events();
    assert_eq!(notices(&immediate), vec!["You have been logged out.".to_string()]);
    assert_eq!(navigations(&immediate), 0);

    harness.session.wait_for_navigation().await;
    assert_eq!(
        harness.drain_events(),
        vec![UiEvent::Navigate(View::Login)]
    );
}

#[tokio::test]
async fn test_teardown_cancels_pending_navigation() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    harness.sign_in("User");

    harness.session.logout(true);
    harness.session.teardown();
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    assert_eq!(navigations(&harness.drain_events()), 0);
}

#[test]
fn test_concurrent_logouts_clear_exactly_once() {
    let harness = Harness::new(|_| Reply::Json(200, json!({})));
    harness.sign_in("Admin");

    let session = &harness.session;
    let winners = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| session.logout(false)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|cleared| *cleared)
            .count()
    });

    assert_eq!(winners, 1);
}

#[test]
fn test_file_backed_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let config = crate::testing::test_config();

    {
        let storage = Arc::new(FileStore::open(&path).unwrap());
        let store = SessionStore::new(storage, &config, crate::events::EventSink::detached());
        store.establish(&operator("IT_Personnel")).unwrap();
    }

    let storage = Arc::new(FileStore::open(&path).unwrap());
    let store = SessionStore::new(storage, &config, crate::events::EventSink::detached());
    let restored = store.initialize().unwrap();
    assert_eq!(restored, Some(operator("IT_Personnel")));
}

/// Memory store that refuses to write one particular value, or anything at all
struct RefusingStore {
    inner: MemoryStore,
    refused: &'static str,
    refuse_all: AtomicBool,
}

impl KeyValueStore for RefusingStore {
    fn get(&self, key: &str) -> assetdesk_core::AssetDeskResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> assetdesk_core::AssetDeskResult<()> {
        if value == self.refused || self.refuse_all.load(Ordering::SeqCst) {
            return Err(assetdesk_core::storage_error!("disk full", "refusing_store"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> assetdesk_core::AssetDeskResult<()> {
        self.inner.remove(key)
    }
}

fn refusing_session(refused: &'static str) -> (Arc<RefusingStore>, SessionStore) {
    let storage = Arc::new(RefusingStore {
        inner: MemoryStore::new(),
        refused,
        refuse_all: AtomicBool::new(false),
    });
    let config = crate::testing::test_config();
    let store = SessionStore::new(storage.clone(), &config, crate::events::EventSink::detached());
    (storage, store)
}

#[test]
fn test_failed_write_keeps_previous_session_in_storage() {
    let (storage, store) = refusing_session("broken@example.com");
    store.establish(&operator("Admin")).unwrap();

    let replacement = Identity {
        user_id: "8".to_string(),
        email: "broken@example.com".to_string(),
        ..operator("User")
    };
    assert!(store.establish(&replacement).is_err());

    assert_eq!(store.current(), Some(operator("Admin")));
    let keys = assetdesk_core::StorageKeys::default();
    assert_eq!(storage.get(&keys.user_id).unwrap().as_deref(), Some("7"));
    assert_eq!(
        storage.get(&keys.user_email).unwrap().as_deref(),
        Some("ada@example.com")
    );
    assert_eq!(storage.get(&keys.user_role).unwrap().as_deref(), Some("Admin"));
}

#[test]
fn test_failed_write_without_restorable_session_logs_out() {
    let (storage, store) = refusing_session("");
    store.establish(&operator("Admin")).unwrap();
    storage.refuse_all.store(true, Ordering::SeqCst);

    let replacement = Identity {
        user_id: "8".to_string(),
        ..operator("User")
    };
    assert!(store.establish(&replacement).is_err());
    assert_eq!(store.current(), None);
    assert!(storage.inner.is_empty());
}

#[test]
fn test_logout_with_redirect_outside_runtime_navigates_immediately() {
    let mut harness = Harness::new(|_| Reply::Json(200, json!({})));
    harness.sign_in("User");

    assert!(harness.session.logout(true));
    let events = harness.drain_events();
    assert_eq!(notices(&events), vec!["You have been logged out.".to_string()]);
    assert_eq!(events.last(), Some(&UiEvent::Navigate(View::Login)));
}
