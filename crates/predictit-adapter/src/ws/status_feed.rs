/*
[INPUT]:  SignalR hub endpoint (bearer + connection token in the query)
[OUTPUT]: Decoded status-feed events pushed onto the dispatch queue
[POS]:    WebSocket layer - status hub connection
[UPDATE]: When the hub envelope or connect parameters change
*/

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::info;
use url::Url;

use crate::http::Result;

use super::decode::decode_status_message;
use super::dispatch::EventSender;
use super::stream::{self, FeedState};

const FEED: &str = "status";

/// One connection to the market hub; every frame is forwarded, unfiltered
#[derive(Debug)]
pub struct StatusFeedConnection {
    endpoint: Url,
    events: EventSender,
    state: watch::Sender<FeedState>,
}

impl StatusFeedConnection {
    pub fn new(endpoint: Url, events: EventSender, state: watch::Sender<FeedState>) -> Self {
        Self {
            endpoint,
            events,
            state,
        }
    }

    /// Connect and stream until the connection fails
    pub async fn run(self) -> Result<()> {
        let result = self.connect_and_stream().await;
        self.state.send_replace(FeedState::Disconnected);
        result
    }

    async fn connect_and_stream(&self) -> Result<()> {
        let socket = stream::connect(FEED, &self.endpoint).await?;
        self.state.send_replace(FeedState::Connected);
        // The hub never reads from us; the write half stays parked.
        let (_write, mut read) = socket.split();

        self.state.send_replace(FeedState::Streaming);
        info!(feed = FEED, "status feed streaming");

        loop {
            let text = stream::next_text(FEED, &mut read).await?;
            self.events.push(decode_status_message(&text)).await?;
        }
    }
}
