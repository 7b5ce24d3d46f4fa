use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use taskpad_core::SessionProvider;
use taskpad_core::models::{Session, User};
use taskpad_login::{AuthClient, SessionManager, SessionStorage};
use taskpad_test_support::{TEST_EMAIL, TEST_USER_ID, backend_for};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager(server: &MockServer, home: &TempDir) -> SessionManager {
    let auth = AuthClient::new(reqwest::Client::new(), Arc::new(backend_for(server)));
    SessionManager::new(auth, SessionStorage::new(home.path()))
}

fn stored(expires_at: i64, refresh_token: Option<&str>) -> Session {
    Session {
        access_token: "old".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Some(expires_at),
        user: User {
            id: TEST_USER_ID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
        },
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::test]
async fn no_file_means_signed_out() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    assert_eq!(manager(&server, &home).current_session().await, None);
}

#[tokio::test]
async fn login_persists_session_for_next_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1",
            "expires_in": 3600,
            "user": {"id": TEST_USER_ID, "email": TEST_EMAIL}
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    manager(&server, &home)
        .login(TEST_EMAIL, "hunter2")
        .await
        .unwrap();

    let next_run = manager(&server, &home);
    let session = next_run.current_session().await.unwrap();
    assert_eq!(session.access_token, "a1");
}

#[tokio::test]
async fn fresh_session_is_used_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    SessionStorage::new(home.path())
        .save(&stored(now() + 3600, Some("r1")))
        .unwrap();

    let session = manager(&server, &home).current_session().await.unwrap();
    assert_eq!(session.access_token, "old");
}

#[tokio::test]
async fn expiring_session_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "refresh_token": "r2",
            "expires_in": 3600,
            "user": {"id": TEST_USER_ID, "email": TEST_EMAIL}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    // Within the refresh skew.
    SessionStorage::new(home.path())
        .save(&stored(now() + 30, Some("r1")))
        .unwrap();

    let manager = manager(&server, &home);
    let session = manager.current_session().await.unwrap();
    assert_eq!(session.access_token, "new");
    // Cached afterwards; the mock expects exactly one refresh.
    assert_eq!(manager.current_session().await.unwrap().access_token, "new");

    let on_disk = manager.storage().load().unwrap().unwrap();
    assert_eq!(on_disk.refresh_token.as_deref(), Some("r2"));
}

#[tokio::test]
async fn rejected_refresh_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid Refresh Token"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    SessionStorage::new(home.path())
        .save(&stored(now() - 10, Some("r1")))
        .unwrap();

    let manager = manager(&server, &home);
    assert_eq!(manager.current_session().await, None);
    assert_eq!(manager.storage().load().unwrap(), None);
}

#[tokio::test]
async fn malformed_refresh_response_keeps_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let expired = stored(now() - 10, Some("r1"));
    SessionStorage::new(home.path()).save(&expired).unwrap();

    let manager = manager(&server, &home);
    assert_eq!(manager.current_session().await, None);
    assert_eq!(manager.storage().load().unwrap(), Some(expired));
}

#[tokio::test]
async fn unreachable_auth_server_keeps_file() {
    let server = MockServer::builder().start().await;
    let home = TempDir::new().unwrap();
    let expired = stored(now() - 10, Some("r1"));
    SessionStorage::new(home.path()).save(&expired).unwrap();
    let manager = manager(&server, &home);
    drop(server);

    assert_eq!(manager.current_session().await, None);
    assert_eq!(manager.storage().load().unwrap(), Some(expired));
}

#[tokio::test]
async fn unreadable_file_is_signed_out() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(taskpad_login::SESSION_FILE), "{").unwrap();
    assert_eq!(manager(&server, &home).current_session().await, None);
}

#[tokio::test]
async fn logout_revokes_and_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    SessionStorage::new(home.path())
        .save(&stored(now() + 3600, Some("r1")))
        .unwrap();

    let manager = manager(&server, &home);
    assert!(manager.logout().await.unwrap());
    assert_eq!(manager.current_session().await, None);
    assert!(!manager.logout().await.unwrap());
}
