/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::http::{PredictItError, Result};

/// Base URL for PredictIt API and SignalR endpoints
const BASE_URL: &str = "https://www.predictit.org";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for PredictIt session endpoints
#[derive(Debug, Clone)]
pub struct PredictItClient {
    http_client: Client,
    base_url: Url,
}

impl PredictItClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default host (used against mock servers)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Base URL every endpoint is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build request builder for an endpoint with query parameters
    pub(crate) fn request<I, K, V>(
        &self,
        method: Method,
        endpoint: &str,
        params: I,
    ) -> Result<RequestBuilder>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.base_url.join(endpoint)?;
        url.query_pairs_mut().extend_pairs(params);
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and deserialize a JSON body, mapping non-2xx to `Api`
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send_text(builder).await?;
        serde_json::from_str(&body).map_err(PredictItError::from)
    }

    /// Send a request and return the raw body, mapping non-2xx to `Api`
    pub(crate) async fn send_text(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PredictItError::api_error(status, body));
        }

        Ok(body)
    }
}
