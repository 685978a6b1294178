//! Presentation adapters driven against a mock auth server.

use std::sync::Arc;

use authgate_core::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use authgate_core::{
    ApiClient, Loadable, LogoutAction, MemoryTokenStore, ProfileLoader, SessionManager,
    SessionState, TokenStore, UserProfile,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in_manager(server: &MockServer) -> Arc<SessionManager> {
    let store = Arc::new(MemoryTokenStore::new());
    store.set(ACCESS_TOKEN_KEY, "AT1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "RT1").unwrap();
    let api = ApiClient::new(&format!("{}/api/v1", server.uri())).unwrap();
    Arc::new(SessionManager::new(api, store))
}

#[tokio::test]
async fn test_profile_loader_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "bob",
            "email": "b@x.com",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = signed_in_manager(&server);
    let mut loader = ProfileLoader::new();
    loader.mount(manager.clone());
    loader.mount(manager);

    let state = loader.settle().await;
    assert_eq!(
        state,
        &Loadable::Ready(UserProfile {
            username: "bob".to_string(),
            email: "b@x.com".to_string(),
            avatar: "/default-image.png".to_string(),
        })
    );
}

#[tokio::test]
async fn test_profile_loader_reports_expired_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let manager = signed_in_manager(&server);
    let mut loader = ProfileLoader::new();
    loader.mount(manager.clone());

    assert_eq!(
        loader.settle().await.error(),
        Some("Session expired. Please login again")
    );
    assert_eq!(manager.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_action_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let manager = signed_in_manager(&server);
    let mut action = LogoutAction::new();

    assert_eq!(action.run(&manager).await, &Loadable::Ready(()));
    assert!(!action.is_loading());
    assert!(action.error().is_none());
    assert_eq!(manager.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_action_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = signed_in_manager(&server);
    let mut action = LogoutAction::new();
    action.run(&manager).await;

    assert!(!action.is_loading());
    assert_eq!(action.error(), Some("Logout failed"));
    assert_eq!(manager.state().unwrap(), SessionState::Authenticated);
}
