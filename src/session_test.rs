use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::net::transport::testing::ScriptedTransport;
use crate::token_store::{MemoryTokenStore, TokenStore};

fn session_with(transport: ScriptedTransport, tokens: MemoryTokenStore) -> (AuthSession, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let http = HttpClient::new("http://library.test", transport.clone(), Arc::new(tokens));
    (AuthSession::new(http), transport)
}

fn alice() -> serde_json::Value {
    json!({ "id": 1, "username": "alice", "email": "alice@library.test" })
}

#[test]
fn new_session_restores_stored_token() {
    let (session, _) = session_with(ScriptedTransport::new(), MemoryTokenStore::with_token("abc"));
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("abc"));
    assert!(session.user().is_none());
}

#[test]
fn new_session_without_token_is_anonymous() {
    let (session, _) = session_with(ScriptedTransport::new(), MemoryTokenStore::new());
    assert!(!session.is_authenticated());
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_with_valid_credentials_sets_token_and_user() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &json!({ "auth_token": "tok-1" }))
        .respond_json(200, &alice());
    let (mut session, transport) = session_with(transport, MemoryTokenStore::new());

    session.login("alice", "secret").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok-1"));
    assert_eq!(session.user().unwrap().username, "alice");
    assert_eq!(session.http().token_store().get().as_deref(), Some("tok-1"));

    let requests = transport.requests();
    assert_eq!(requests[0].url, "http://library.test/auth/token/login/");
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(requests[1].url, "http://library.test/auth/users/me/");
    assert_eq!(requests[1].headers.get("authorization").unwrap(), "Token tok-1");
}

#[tokio::test]
async fn login_rejected_reports_non_field_error() {
    let transport = ScriptedTransport::new().respond_json(
        400,
        &json!({ "non_field_errors": ["Unable to log in with provided credentials."] }),
    );
    let (mut session, _) = session_with(transport, MemoryTokenStore::new());

    let err = session.login("alice", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(err.to_string(), "Unable to log in with provided credentials.");
}

#[tokio::test]
async fn login_rejected_leaves_state_unchanged() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &alice())
        .respond_json(400, &json!({ "detail": "Bad credentials" }));
    let (mut session, _) = session_with(transport, MemoryTokenStore::with_token("old"));
    session.init_user().await.unwrap();

    assert!(session.login("alice", "wrong").await.is_err());

    assert_eq!(session.token(), Some("old"));
    assert_eq!(session.user().unwrap().username, "alice");
    assert_eq!(session.http().token_store().get().as_deref(), Some("old"));
}

#[tokio::test]
async fn login_succeeds_when_user_load_fails() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &json!({ "auth_token": "tok-1" }))
        .respond_json(500, &json!({ "detail": "boom" }));
    let (mut session, _) = session_with(transport, MemoryTokenStore::new());

    session.login("alice", "secret").await.unwrap();

    assert!(session.is_authenticated());
    assert!(session.user().is_none());
    assert_eq!(session.http().token_store().get().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn login_without_token_in_body_uses_fallback_message() {
    let transport = ScriptedTransport::new().respond_json(200, &json!({}));
    let (mut session, _) = session_with(transport, MemoryTokenStore::new());

    let err = session.login("alice", "secret").await.unwrap_err();

    assert_eq!(err.to_string(), "Login failed");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn login_network_failure_propagates() {
    let transport = ScriptedTransport::new().fail("connection refused");
    let (mut session, _) = session_with(transport, MemoryTokenStore::new());

    let err = session.login("alice", "secret").await.unwrap_err();

    assert!(matches!(err, ApiError::Net(_)));
    assert!(!session.is_authenticated());
}

// =============================================================================
// init_user
// =============================================================================

#[tokio::test]
async fn init_user_without_token_makes_no_request() {
    let (mut session, transport) = session_with(ScriptedTransport::new(), MemoryTokenStore::new());
    session.init_user().await.unwrap();
    assert!(session.user().is_none());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn init_user_failure_clears_user_and_keeps_token() {
    let transport = ScriptedTransport::new().respond_json(401, &json!({ "detail": "Invalid token." }));
    let (mut session, _) = session_with(transport, MemoryTokenStore::with_token("stale"));

    let err = session.init_user().await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 401: Invalid token.");
    assert!(session.user().is_none());
    assert_eq!(session.token(), Some("stale"));
}

#[tokio::test]
async fn init_user_picks_up_token_written_elsewhere() {
    let (mut session, _) = session_with(ScriptedTransport::new().respond_json(200, &alice()), MemoryTokenStore::new());
    session.http().token_store().set(Some("from-another-process")).unwrap();

    session.init_user().await.unwrap();

    assert_eq!(session.token(), Some("from-another-process"));
    assert!(session.user().is_some());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_everything_on_success() {
    let transport = ScriptedTransport::new().respond_json(200, &alice()).respond(204, "");
    let (mut session, transport) = session_with(transport, MemoryTokenStore::with_token("tok"));
    session.init_user().await.unwrap();

    session.logout().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(session.http().token_store().get().is_none());
    let logout = &transport.requests()[1];
    assert_eq!(logout.url, "http://library.test/auth/token/logout/");
    assert_eq!(logout.headers.get("authorization").unwrap(), "Token tok");
}

#[tokio::test]
async fn logout_network_failure_still_clears_local_state() {
    let transport = ScriptedTransport::new().respond_json(200, &alice()).fail("connection reset");
    let (mut session, _) = session_with(transport, MemoryTokenStore::with_token("tok"));
    session.init_user().await.unwrap();

    let err = session.logout().await.unwrap_err();

    assert!(matches!(err, ApiError::Net(_)));
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(session.http().token_store().get().is_none());
}

#[tokio::test]
async fn logout_with_empty_session_and_store_skips_remote_call() {
    let (mut session, transport) = session_with(ScriptedTransport::new(), MemoryTokenStore::new());
    session.logout().await.unwrap();
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn logout_revokes_token_found_only_in_store() {
    let (mut session, transport) = session_with(ScriptedTransport::new().respond(204, ""), MemoryTokenStore::new());
    session.http().token_store().set(Some("other-process")).unwrap();

    session.logout().await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://library.test/auth/token/logout/");
    assert_eq!(requests[0].headers.get("authorization").unwrap(), "Token other-process");
    assert!(session.http().token_store().get().is_none());
}

// =============================================================================
// register / update_profile
// =============================================================================

#[tokio::test]
async fn register_does_not_log_in() {
    let transport = ScriptedTransport::new().respond_json(201, &json!({ "id": 2, "username": "bob" }));
    let (session, transport) = session_with(transport, MemoryTokenStore::new());

    let user = session.register("bob", "pw12345!", "pw12345!").await.unwrap();

    assert_eq!(user.username, "bob");
    assert!(!session.is_authenticated());
    let request = &transport.requests()[0];
    assert_eq!(request.url, "http://library.test/auth/users/");
}

#[tokio::test]
async fn register_failure_dumps_field_errors() {
    let transport = ScriptedTransport::new()
        .respond_json(400, &json!({ "password": ["This password is too short."] }));
    let (session, _) = session_with(transport, MemoryTokenStore::new());

    let err = session.register("bob", "pw", "pw").await.unwrap_err();

    assert_eq!(err.to_string(), r#"{"password":["This password is too short."]}"#);
}

#[tokio::test]
async fn update_profile_replaces_cached_user() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &alice())
        .respond_json(200, &json!({ "id": 1, "username": "alice", "email": "new@library.test" }));
    let (mut session, _) = session_with(transport, MemoryTokenStore::with_token("tok"));
    session.init_user().await.unwrap();

    let changes = UpdateMe { email: Some("new@library.test".to_owned()), ..UpdateMe::default() };
    let user = session.update_profile(&changes).await.unwrap();

    assert_eq!(user.email.as_deref(), Some("new@library.test"));
    assert_eq!(session.user().unwrap().email.as_deref(), Some("new@library.test"));
}

#[tokio::test]
async fn update_profile_failure_keeps_cached_user() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &alice())
        .respond_json(400, &json!({ "current_password": ["Invalid password."] }));
    let (mut session, _) = session_with(transport, MemoryTokenStore::with_token("tok"));
    session.init_user().await.unwrap();

    let changes = UpdateMe { new_password: Some("x".to_owned()), ..UpdateMe::default() };
    let err = session.update_profile(&changes).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(session.user().unwrap().email.as_deref(), Some("alice@library.test"));
}
