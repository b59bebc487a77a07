//! HTTP-level tests for `AuthApiClient` against a mock auth server.

use medzy_session::api::{ApiError, AuthApiClient, AuthBackend};
use medzy_session::models::{LoginRequest, SignupRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "ayesha@example.com".to_string(),
        password: "hunter2hunter2".to_string(),
    }
}

#[tokio::test]
async fn sign_in_parses_the_camel_case_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-123",
            "sessionId": "sess-9",
            "user": {
                "id": "u-17",
                "name": "Ayesha Rahman",
                "email": "ayesha@example.com",
                "role": "customer"
            },
            "wasLoggedInElsewhere": true
        })))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let response = client.sign_in(&login_request()).await.unwrap();

    assert_eq!(response.token, "tok-123");
    assert_eq!(response.session_id, "sess-9");
    assert_eq!(response.user.id, "u-17");
    assert!(response.was_logged_in_elsewhere);
}

#[tokio::test]
async fn sign_in_maps_unverified_email_to_structured_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "EMAIL_NOT_VERIFIED",
            "message": "Please verify your email before logging in",
            "userId": "u-17"
        })))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let err = client.sign_in(&login_request()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::EmailNotVerified {
            message: "Please verify your email before logging in".to_string(),
            user_id: Some("u-17".to_string()),
        }
    );
}

#[tokio::test]
async fn sign_in_maps_bad_credentials_to_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let err = client.sign_in(&login_request()).await.unwrap_err();

    assert_eq!(err, ApiError::Rejected("Invalid email or password".to_string()));
    assert!(err.is_authoritative());
}

#[tokio::test]
async fn sign_up_reports_verification_requirement() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresVerification": true
        })))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let response = client
        .sign_up(&SignupRequest {
            name: "Ayesha Rahman".to_string(),
            email: "ayesha@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            role: Some("customer".to_string()),
        })
        .await
        .unwrap();

    assert!(response.requires_verification);
}

#[tokio::test]
async fn current_user_sends_the_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-17",
            "name": "Ayesha Rahman",
            "email": "ayesha@example.com"
        })))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let user = client.current_user("tok-123").await.unwrap();
    assert_eq!(user.email, "ayesha@example.com");
}

#[tokio::test]
async fn current_user_maps_401_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let err = client.current_user("stale-token").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn session_check_is_quiet_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/session-check"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    assert!(client.session_check("tok-123").await.is_ok());
}

#[tokio::test]
async fn session_check_surfaces_invalidation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/session-check"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    let err = client.session_check("tok-123").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn logout_posts_the_session_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(body_json(json!({ "sessionId": "sess-9" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthApiClient::new(server.uri()).unwrap();
    client.logout("tok-123", "sess-9").await.unwrap();
}

#[tokio::test]
async fn connection_failure_is_a_transient_network_error() {
    // Nothing is listening on this port
    let client = AuthApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client.session_check("tok-123").await.unwrap_err();
    assert!(err.is_transient());
}
