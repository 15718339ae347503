//! Tests for the session manager and shared session handle.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::{ErrorKind, HttpMethod};
use crate::domain::ports::{
    InMemoryTokenStore, MockApiTransport, MockTokenStore, ScriptedApiTransport, TokenStoreError,
    TransportResponse,
};
use crate::domain::token::test_tokens::token_for;

type ScriptedManager<S> = SessionManager<ScriptedApiTransport, S>;

fn manager_over<S>(store: Arc<S>) -> ScriptedManager<S> {
    let client = Arc::new(ApiClient::new(ScriptedApiTransport::new(), SessionHandle::new()));
    SessionManager::new(client, store)
}

fn transport<S>(manager: &ScriptedManager<S>) -> &ScriptedApiTransport {
    manager.client().transport()
}

#[fixture]
fn store() -> Arc<InMemoryTokenStore> {
    Arc::new(InMemoryTokenStore::default())
}

#[fixture]
fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("alice", "correct horse").expect("valid credentials")
}

#[rstest]
fn handle_starts_anonymous() {
    let handle = SessionHandle::new();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, SessionState::Anonymous);
    assert!(snapshot.token.is_none());
    assert!(snapshot.user.is_none());
    assert_eq!(handle.bearer(), (String::new(), 0));
}

#[rstest]
fn establish_rejects_bad_tokens_without_touching_state() {
    let handle = SessionHandle::new();
    handle
        .establish(&token_for("alice", false))
        .expect("valid token");
    let before = handle.snapshot();

    assert!(handle.establish("garbage").is_err());
    assert_eq!(handle.snapshot(), before);
}

#[rstest]
fn clear_only_bumps_epoch_when_something_changed() {
    let handle = SessionHandle::new();
    assert!(!handle.clear());
    assert_eq!(handle.epoch(), 0);

    handle
        .establish(&token_for("alice", false))
        .expect("valid token");
    assert!(handle.clear());
    assert_eq!(handle.epoch(), 2);
    assert!(!handle.clear());
    assert_eq!(handle.epoch(), 2);
}

#[rstest]
fn restore_without_token_is_anonymous(store: Arc<InMemoryTokenStore>) {
    let manager = manager_over(store);
    assert_eq!(manager.restore(), RestoreOutcome::NoToken);
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
}

#[rstest]
#[tokio::test]
async fn restore_adopts_a_decodable_token() {
    let token = token_for("bob", true);
    let manager = manager_over(Arc::new(InMemoryTokenStore::with_token(token.clone())));

    let outcome = manager.restore();

    let RestoreOutcome::Restored(user) = outcome else {
        panic!("expected a restored session, got {outcome:?}");
    };
    assert_eq!(user.username(), "bob");
    assert!(user.is_admin());
    assert_eq!(manager.snapshot().state, SessionState::Authenticated);

    transport(&manager).respond(200, json!({ "trips": [] }));
    manager
        .client()
        .list_trips(serde_json::Map::new())
        .await
        .expect("list trips");
    assert_eq!(transport(&manager).sent()[0].bearer, token);
}

#[rstest]
fn restore_purges_a_corrupted_token() {
    let token = token_for("carol", false);
    let corrupted = format!("{}x!", &token[..token.len() / 2]);
    let store = Arc::new(InMemoryTokenStore::with_token(corrupted));
    let manager = manager_over(Arc::clone(&store));

    assert_eq!(manager.restore(), RestoreOutcome::Invalidated);
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
    assert!(store.peek().is_none());
}

#[rstest]
fn restore_treats_unreadable_store_as_empty() {
    let mut store = MockTokenStore::new();
    store
        .expect_load()
        .times(1)
        .return_once(|| Err(TokenStoreError::read("permission denied")));
    let manager = manager_over(Arc::new(store));

    assert_eq!(manager.restore(), RestoreOutcome::NoToken);
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
}

#[rstest]
#[tokio::test]
async fn login_persists_the_backend_token(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
) {
    let token = token_for("alice", false);
    let manager = manager_over(Arc::clone(&store));
    transport(&manager).respond(200, json!({ "token": token }));

    let user = manager.login(&credentials).await.expect("login succeeds");

    assert_eq!(user.username(), "alice");
    assert_eq!(store.peek().as_deref(), Some(token.as_str()));
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.state, SessionState::Authenticated);
    assert_eq!(snapshot.token.as_deref(), Some(token.as_str()));

    let sent = transport(&manager).sent();
    assert_eq!(sent[0].request.endpoint(), "auth/token");
    assert_eq!(sent[0].request.method(), HttpMethod::Post);
    assert_eq!(
        sent[0].request.payload().get("password"),
        Some(&json!("correct horse"))
    );
}

#[rstest]
#[tokio::test]
async fn login_trims_whitespace_around_the_issued_token(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
) {
    let token = token_for("alice", false);
    let manager = manager_over(Arc::clone(&store));
    transport(&manager)
        .respond(200, json!({ "token": format!(" {token}\n") }))
        .respond(200, json!({ "trips": [] }));

    manager.login(&credentials).await.expect("login succeeds");
    manager.client().get("trips").await.expect("list trips");

    assert_eq!(store.peek().as_deref(), Some(token.as_str()));
    assert_eq!(manager.snapshot().token.as_deref(), Some(token.as_str()));
    assert_eq!(transport(&manager).sent()[1].bearer, token);
}

#[rstest]
fn restore_trims_a_stored_token_with_a_trailing_newline() {
    let token = token_for("dave", false);
    let manager = manager_over(Arc::new(InMemoryTokenStore::with_token(format!("{token}\n"))));

    assert!(matches!(manager.restore(), RestoreOutcome::Restored(_)));
    assert_eq!(manager.handle().bearer().0, token);
}

#[rstest]
#[tokio::test]
async fn failed_login_clears_an_existing_session(credentials: LoginCredentials) {
    let store = Arc::new(InMemoryTokenStore::with_token(token_for("alice", false)));
    let manager = manager_over(Arc::clone(&store));
    manager.restore();
    transport(&manager).respond(401, json!({ "error": { "message": "Invalid password" } }));

    let err = manager
        .login(&credentials)
        .await
        .expect_err("login must fail");

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.message(), "Current password incorrect");
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
    assert!(store.peek().is_none());
    assert_eq!(transport(&manager).sent()[0].bearer, "");
}

#[rstest]
#[case::undecodable(json!({ "token": "not-a-jwt" }), UNREADABLE_TOKEN_MESSAGE)]
#[case::missing(json!({ "user": "alice" }), MISSING_TOKEN_MESSAGE)]
#[case::blank(json!({ "token": "" }), MISSING_TOKEN_MESSAGE)]
#[tokio::test]
async fn login_without_a_usable_token_fails_with_session_decode(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
    #[case] body: serde_json::Value,
    #[case] message: &str,
) {
    let manager = manager_over(Arc::clone(&store));
    transport(&manager).respond(200, body);

    let err = manager
        .login(&credentials)
        .await
        .expect_err("login must fail");

    assert_eq!(err.kind(), ErrorKind::SessionDecode);
    assert_eq!(err.message(), message);
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
    assert!(store.peek().is_none());
}

#[rstest]
#[tokio::test]
async fn login_survives_a_failed_token_write(credentials: LoginCredentials) {
    let mut store = MockTokenStore::new();
    store
        .expect_save()
        .times(1)
        .return_once(|_| Err(TokenStoreError::write("read-only filesystem")));
    store.expect_clear().never();
    let manager = manager_over(Arc::new(store));
    transport(&manager).respond(200, json!({ "token": token_for("alice", false) }));

    let user = manager.login(&credentials).await.expect("login succeeds");

    assert_eq!(user.username(), "alice");
    assert_eq!(manager.snapshot().state, SessionState::Authenticated);
}

#[rstest]
#[tokio::test]
async fn signup_registers_and_authenticates(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
) {
    let profile =
        SignupProfile::try_new(credentials, "Alice", "Liddell", "alice@example.com")
            .expect("valid profile");
    let manager = manager_over(Arc::clone(&store));
    transport(&manager).respond(201, json!({ "token": token_for("alice", false) }));

    let user = manager.signup(&profile).await.expect("signup succeeds");

    assert_eq!(user.username(), "alice");
    assert!(store.peek().is_some());
    let sent = transport(&manager).sent();
    assert_eq!(sent[0].request.endpoint(), "auth/register");
    assert_eq!(
        sent[0].request.payload().get("email"),
        Some(&json!("alice@example.com"))
    );
}

#[rstest]
#[tokio::test]
async fn signup_conflict_in_success_body_is_a_validation_error(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
) {
    let profile = SignupProfile::try_new(credentials, "Alice", "Liddell", "alice@example.com")
        .expect("valid profile");
    let manager = manager_over(Arc::clone(&store));
    transport(&manager).respond(
        200,
        json!({ "error": { "message": "duplicate key value violates unique constraint \"users_username_key\"" } }),
    );

    let err = manager.signup(&profile).await.expect_err("conflict");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field("username"), Some("Username already taken"));
    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
}

#[rstest]
fn logout_is_idempotent(store: Arc<InMemoryTokenStore>) {
    let manager = manager_over(Arc::clone(&store));
    manager.logout();
    let epoch = manager.snapshot().epoch;
    manager.logout();

    assert_eq!(manager.snapshot().state, SessionState::Anonymous);
    assert_eq!(manager.snapshot().epoch, epoch);
    assert!(store.peek().is_none());
}

#[rstest]
fn logout_clears_memory_even_when_the_store_fails() {
    let mut store = MockTokenStore::new();
    store
        .expect_load()
        .return_once(|| Ok(Some(token_for("dave", false))));
    store
        .expect_clear()
        .times(1)
        .return_once(|| Err(TokenStoreError::write("disk unplugged")));
    let manager = manager_over(Arc::new(store));
    manager.restore();

    manager.logout();

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.state, SessionState::Anonymous);
    assert!(snapshot.token.is_none());
    assert!(snapshot.user.is_none());
}

#[rstest]
#[tokio::test]
async fn reload_restores_the_same_identity(
    store: Arc<InMemoryTokenStore>,
    credentials: LoginCredentials,
) {
    let first = manager_over(Arc::clone(&store));
    transport(&first).respond(200, json!({ "token": token_for("erin", true) }));
    let logged_in = first.login(&credentials).await.expect("login succeeds");

    let reloaded = manager_over(Arc::clone(&store));

    assert_eq!(reloaded.restore(), RestoreOutcome::Restored(logged_in));
}

#[rstest]
#[tokio::test]
async fn logout_during_a_request_discards_the_response() {
    let handle = SessionHandle::new();
    handle
        .establish(&token_for("frank", false))
        .expect("valid token");
    let racing = handle.clone();
    let mut transport = MockApiTransport::new();
    transport.expect_send().times(1).returning(move |_, _| {
        racing.clear();
        Ok(TransportResponse::new(200, json!({ "trip": { "id": 1 } })))
    });
    let client = ApiClient::new(transport, handle);

    let err = client.get_trip(1).await.expect_err("stale response");

    assert_eq!(err.kind(), ErrorKind::SessionChanged);
    assert!(err.is_silent());
}
