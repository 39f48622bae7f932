/*
[INPUT]:  Session context, HTTP client, tick interval
[OUTPUT]: Periodic SignalR ping requests; tick outcomes in the log
[POS]:    WebSocket layer - session liveness loop
[UPDATE]: When the ping endpoint or interval policy changes
*/

use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::SessionContext;
use crate::http::PredictItClient;

/// Result of a single keepalive tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Acknowledged { counter: i64 },
    Failed { counter: i64, error: String },
}

/// Pings the session on a fixed interval for as long as it is polled
#[derive(Debug)]
pub struct KeepaliveLoop {
    client: PredictItClient,
    bearer_token: String,
    counter: i64,
    interval: Duration,
}

impl KeepaliveLoop {
    /// The counter is seeded from the session epoch
    pub fn new(client: PredictItClient, session: &SessionContext, interval: Duration) -> Self {
        Self {
            client,
            bearer_token: session.bearer_token.clone(),
            counter: session.session_epoch,
            interval,
        }
    }

    pub fn counter(&self) -> i64 {
        self.counter
    }

    /// Advance the counter and send one ping. Never fails; the outcome is
    /// returned so the caller can inspect it.
    pub async fn tick(&mut self) -> TickOutcome {
        self.counter += 1;
        let counter = self.counter;

        match self.client.ping(&self.bearer_token, counter).await {
            Ok(()) => {
                debug!(counter, "keepalive ping acknowledged");
                TickOutcome::Acknowledged { counter }
            }
            Err(err) => {
                warn!(counter, error = %err, "keepalive ping failed; will retry next interval");
                TickOutcome::Failed {
                    counter,
                    error: err.to_string(),
                }
            }
        }
    }

    /// Sleep, then tick, forever
    pub async fn run(mut self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.tick().await;
        }
    }
}
