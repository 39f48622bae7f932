/*
[INPUT]:  Credentials and the HTTP client
[OUTPUT]: Immutable session context shared by every feed connection
[POS]:    Auth layer - orchestrates token, negotiate and start calls
[UPDATE]: When session establishment steps change
*/

use tracing::info;

use crate::http::{PredictItClient, Result};

use super::Credentials;

/// Bearer credential plus negotiated SignalR state for one client session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub bearer_token: String,
    pub connection_token: String,
    /// Unix seconds at session start; seeds the keepalive counter
    pub session_epoch: i64,
}

impl SessionContext {
    pub fn new(
        bearer_token: impl Into<String>,
        connection_token: impl Into<String>,
        session_epoch: i64,
    ) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            connection_token: connection_token.into(),
            session_epoch,
        }
    }

    /// Complete session flow
    ///
    /// 1. Exchange credentials for a bearer token
    /// 2. Negotiate a hub connection token
    /// 3. Send the session start request
    pub async fn establish(client: &PredictItClient, credentials: &Credentials) -> Result<Self> {
        let bearer_token = client
            .authenticate(&credentials.username, &credentials.password)
            .await?;

        let negotiated = client.negotiate(&bearer_token).await?;

        let session_epoch = client
            .start_session(&negotiated.connection_token, &bearer_token)
            .await?;

        info!(
            username = %credentials.username,
            session_epoch,
            "predictit session established"
        );

        Ok(Self::new(bearer_token, negotiated.connection_token, session_epoch))
    }
}
