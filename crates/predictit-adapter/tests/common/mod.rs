/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for predictit-adapter tests

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use predictit_adapter::{ClientConfig, FeedConfig, PredictItClient, SessionContext};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{WebSocketStream, accept_async};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BEARER: &str = "bearer-123";
pub const CONNECTION_TOKEN: &str = "conn-token";

/// First frame the realtime database sends on every connection
pub const GREETING: &str =
    r#"{"t":"c","d":{"t":"h","d":{"ts":1571250151000,"v":"5","h":"s-usc1c-nss-231.firebaseio.com","s":"abc"}}}"#;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> PredictItClient {
    PredictItClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// Client whose HTTP calls can never succeed; used where only feeds matter
pub fn offline_client() -> PredictItClient {
    PredictItClient::with_config_and_base_url(ClientConfig::default(), "http://127.0.0.1:1")
        .expect("client init")
}

pub fn test_session() -> SessionContext {
    SessionContext::new(BEARER, CONNECTION_TOKEN, 1_571_250_151)
}

/// Mount the token, negotiate and start endpoints
pub async fn mount_session_flow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/Account/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": BEARER,
            "token_type": "bearer",
            "expires_in": 1209599,
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signalr/negotiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Url": "/signalr",
            "ConnectionToken": CONNECTION_TOKEN,
            "ConnectionId": "abc-def",
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signalr/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Response":"started"}"#))
        .mount(server)
        .await;
}

/// Bind a local WebSocket server and hand each accepted socket to `on_connection`.
///
/// Returns the `ws://host:port` base address.
pub async fn spawn_ws_server<F, Fut>(on_connection: F) -> String
where
    F: Fn(WebSocketStream<TcpStream>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let Ok(socket) = accept_async(stream).await else {
                continue;
            };
            tokio::spawn(on_connection(socket));
        }
    });

    format!("ws://{addr}")
}

/// Feed configuration pointing both feeds at local servers
pub fn feed_config(trade_base: &str, status_base: &str) -> FeedConfig {
    FeedConfig {
        trade_feed_url: format!("{trade_base}/.ws"),
        status_feed_url: format!("{status_base}/signalr/connect"),
        keepalive_interval: Duration::from_secs(3600),
        ..FeedConfig::default()
    }
}
