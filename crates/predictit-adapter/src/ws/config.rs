/*
[INPUT]:  Endpoint overrides, keepalive interval, queue sizing
[OUTPUT]: FeedConfig consumed by the feed client and its connections
[POS]:    WebSocket layer - feed configuration
[UPDATE]: When adding endpoints or tunables
*/

use std::time::Duration;

use url::Url;

use crate::auth::SessionContext;
use crate::http::Result;
use crate::http::session::{CLIENT_PROTOCOL, CONNECTION_DATA};

/// Realtime-database endpoint serving the trade feed
const TRADE_FEED_URL: &str = "wss://s-usc1c-nss-231.firebaseio.com/.ws";
const TRADE_FEED_PROTOCOL_VERSION: &str = "5";
const TRADE_FEED_NAMESPACE: &str = "predictit-f497e";

/// SignalR hub endpoint serving the status feed
const STATUS_FEED_URL: &str = "wss://www.predictit.org/signalr/connect";
const STATUS_FEED_TID: &str = "9";

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How the dispatch queue holds events the consumer has not reached yet.
///
/// Neither feed can be slowed by the consumer without stalling its socket, so
/// `Unbounded` is the default. `Bounded` makes a feed wait for queue space
/// instead, which eventually stalls that feed's reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    #[default]
    Unbounded,
    Bounded(usize),
}

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub trade_feed_url: String,
    pub trade_feed_namespace: String,
    pub status_feed_url: String,
    pub keepalive_interval: Duration,
    pub queue: QueueMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            trade_feed_url: TRADE_FEED_URL.to_string(),
            trade_feed_namespace: TRADE_FEED_NAMESPACE.to_string(),
            status_feed_url: STATUS_FEED_URL.to_string(),
            keepalive_interval: KEEPALIVE_INTERVAL,
            queue: QueueMode::default(),
        }
    }
}

impl FeedConfig {
    /// `wss://host/.ws?v=5&ns={namespace}`
    pub fn trade_feed_endpoint(&self) -> Result<Url> {
        Ok(Url::parse_with_params(
            &self.trade_feed_url,
            [
                ("v", TRADE_FEED_PROTOCOL_VERSION),
                ("ns", self.trade_feed_namespace.as_str()),
            ],
        )?)
    }

    /// SignalR connect URL carrying the session's bearer and connection token
    pub fn status_feed_endpoint(&self, session: &SessionContext) -> Result<Url> {
        Ok(Url::parse_with_params(
            &self.status_feed_url,
            [
                ("transport", "webSockets"),
                ("clientProtocol", CLIENT_PROTOCOL),
                ("bearer", session.bearer_token.as_str()),
                ("connectionToken", session.connection_token.as_str()),
                ("connectionData", CONNECTION_DATA),
                ("tid", STATUS_FEED_TID),
            ],
        )?)
    }
}
