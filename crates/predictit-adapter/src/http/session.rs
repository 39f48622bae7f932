/*
[INPUT]:  Account credentials, bearer token, SignalR connection token
[OUTPUT]: Bearer token, connection token, session epoch, keepalive acknowledgements
[POS]:    HTTP layer - session establishment and liveness endpoints
[UPDATE]: When the token or SignalR handshake endpoints change
*/

use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::{PredictItClient, PredictItError, Result};

/// SignalR protocol version spoken by the hub
pub const CLIENT_PROTOCOL: &str = "1.5";

/// Hub descriptor sent with every SignalR handshake request
pub const CONNECTION_DATA: &str = r#"[{"name":"markethub"}]"#;

/// Response from the account token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Response from the SignalR negotiate endpoint
#[derive(Debug, Deserialize)]
pub struct NegotiateResponse {
    #[serde(rename = "ConnectionToken")]
    pub connection_token: String,
    #[serde(rename = "ConnectionId", default)]
    pub connection_id: Option<String>,
    #[serde(rename = "KeepAliveTimeout", default)]
    pub keep_alive_timeout: Option<f64>,
}

impl PredictItClient {
    /// Exchange username and password for a bearer token
    ///
    /// GET /api/Account/token (form body)
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let form = [
            ("email", username),
            ("password", password),
            ("grant_type", "password"),
            ("rememberMe", "false"),
        ];
        let builder = self
            .request(Method::GET, "/api/Account/token", std::iter::empty::<(&str, &str)>())?
            .form(&form);

        let response: TokenResponse = match self.send_json(builder).await {
            Ok(response) => response,
            Err(PredictItError::Api { code, message }) if code == 400 || code == 401 => {
                return Err(PredictItError::Authentication { message });
            }
            Err(err) => return Err(err),
        };

        if response.access_token.is_empty() {
            return Err(PredictItError::Authentication {
                message: "token endpoint returned an empty access_token".to_string(),
            });
        }

        Ok(response.access_token)
    }

    /// Obtain a SignalR connection token for the market hub
    ///
    /// GET /signalr/negotiate?clientProtocol=1.5&bearer={token}&connectionData=..&_={now}
    pub async fn negotiate(&self, bearer_token: &str) -> Result<NegotiateResponse> {
        let params = [
            ("clientProtocol", CLIENT_PROTOCOL.to_string()),
            ("bearer", bearer_token.to_string()),
            ("connectionData", CONNECTION_DATA.to_string()),
            ("_", Utc::now().timestamp().to_string()),
        ];
        let builder = self.request(Method::GET, "/signalr/negotiate", params)?;
        self.send_json(builder).await
    }

    /// Perform the protocol-required session start call and return its epoch
    ///
    /// GET /signalr/start?transport=webSockets&clientProtocol=1.5&bearer=..&connectionToken=..&_={epoch}
    pub async fn start_session(&self, connection_token: &str, bearer_token: &str) -> Result<i64> {
        let epoch = Utc::now().timestamp();
        let params = [
            ("transport", "webSockets".to_string()),
            ("clientProtocol", CLIENT_PROTOCOL.to_string()),
            ("bearer", bearer_token.to_string()),
            ("connectionToken", connection_token.to_string()),
            ("connectionData", CONNECTION_DATA.to_string()),
            ("_", epoch.to_string()),
        ];
        let builder = self.request(Method::GET, "/signalr/start", params)?;
        let body = self.send_text(builder).await?;
        debug!(epoch, response = %body, "signalr session started");

        Ok(epoch)
    }

    /// Out-of-band liveness signal that keeps the session token alive
    ///
    /// GET /signalr/ping?bearer={token}&_={counter}
    pub async fn ping(&self, bearer_token: &str, counter: i64) -> Result<()> {
        let params = [
            ("bearer", bearer_token.to_string()),
            ("_", counter.to_string()),
        ];
        let builder = self.request(Method::GET, "/signalr/ping", params)?;
        self.send_text(builder).await?;
        Ok(())
    }
}
