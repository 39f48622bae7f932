/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client and session establishment
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use common::{BEARER, CONNECTION_TOKEN, client_for, mount_session_flow, setup_mock_server};
use predictit_adapter::{ClientConfig, Credentials, PredictItClient, PredictItError, SessionContext};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let client = assert_ok!(PredictItClient::new());
    assert_eq!(client.base_url().as_str(), "https://www.predictit.org/");
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(PredictItClient::with_config(config));
}

#[tokio::test]
async fn test_establish_session_runs_full_flow() {
    let server = setup_mock_server().await;
    mount_session_flow(&server).await;

    let client = client_for(&server);
    let credentials = Credentials::new("trader@example.com", "hunter2");
    let before = chrono::Utc::now().timestamp();

    let session = assert_ok!(SessionContext::establish(&client, &credentials).await);

    assert_eq!(session.bearer_token, BEARER);
    assert_eq!(session.connection_token, CONNECTION_TOKEN);
    assert!(session.session_epoch >= before);

    let requests = server.received_requests().await.expect("recording enabled");
    let paths: Vec<&str> = requests.iter().map(|request| request.url.path()).collect();
    assert_eq!(paths, vec!["/api/Account/token", "/signalr/negotiate", "/signalr/start"]);
}

#[tokio::test]
async fn test_establish_session_stops_at_rejected_credentials() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/Account/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signalr/negotiate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credentials = Credentials::new("trader@example.com", "wrong");
    let err = SessionContext::establish(&client, &credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, PredictItError::Authentication { .. }));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_negotiate_failure_surfaces_api_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/Account/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": BEARER})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signalr/negotiate"))
        .and(query_param("bearer", BEARER))
        .respond_with(ResponseTemplate::new(500).set_body_string("hub unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credentials = Credentials::new("trader@example.com", "hunter2");
    let err = SessionContext::establish(&client, &credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, PredictItError::Api { code: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_keepalive_ping_carries_counter() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/signalr/ping"))
        .and(query_param("bearer", BEARER))
        .and(query_param("_", "1571250152"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Response":"pong"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_ok!(client.ping(BEARER, 1_571_250_152).await);
}

#[test]
fn test_credentials_from_file() {
    let path = std::env::temp_dir().join(format!("predictit-creds-{}", std::process::id()));
    std::fs::write(&path, "trader@example.com hunter2\n").expect("write credentials");

    let credentials = assert_ok!(Credentials::from_file(&path));
    assert_eq!(credentials.username, "trader@example.com");
    assert_eq!(credentials.password, "hunter2");
    assert!(!format!("{credentials:?}").contains("hunter2"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_credentials_missing_file_is_config_error() {
    let err = Credentials::from_file("/nonexistent/predictit/credentials").unwrap_err();
    assert!(matches!(err, PredictItError::Config(_)));
}
