/*
[INPUT]:  Session context, optional order book contract, consumer and filter registrations
[OUTPUT]: Both feeds, keepalive and dispatch running as one cancellable unit
[POS]:    WebSocket layer - public feed client facade
[UPDATE]: When changing task composition, shutdown, or registration APIs
*/

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::SessionContext;
use crate::http::{PredictItClient, PredictItError, Result};
use crate::types::FeedEvent;

use super::dispatch::{Dispatcher, EventHandler, FnHandler, HandlerError, HandlerSlot, event_queue};
use super::keepalive::KeepaliveLoop;
use super::status_feed::StatusFeedConnection;
use super::stream::{FeedState, state_channel};
use super::trade_feed::{ContractFilter, FilterSlot, TradeFeedConnection};
use super::FeedConfig;

/// Realtime PredictIt feed client.
///
/// `start` runs the trade feed, the status feed, the keepalive loop and the
/// dispatch loop concurrently on the calling task. `stop` ends all of them at
/// once. When either feed fails the other feed and the keepalive loop stop,
/// and the events already queued are still delivered before `start` returns.
/// There is no reconnect here; callers that want one call `start` again with
/// a fresh session.
#[derive(Debug)]
pub struct FeedClient {
    http: PredictItClient,
    config: FeedConfig,
    handler: HandlerSlot,
    filter: FilterSlot,
    active: Mutex<Option<CancellationToken>>,
    trade_state: watch::Sender<FeedState>,
    status_state: watch::Sender<FeedState>,
}

impl FeedClient {
    pub fn new(http: PredictItClient, config: FeedConfig) -> Self {
        let (trade_state, _) = state_channel();
        let (status_state, _) = state_channel();
        Self {
            http,
            config,
            handler: HandlerSlot::default(),
            filter: FilterSlot::default(),
            active: Mutex::new(None),
            trade_state,
            status_state,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Register or replace the consumer invoked for every event
    pub fn set_event_callback(&self, handler: Arc<dyn EventHandler>) {
        self.handler.set(handler);
    }

    /// Register a synchronous closure as the consumer
    pub fn set_event_fn<F>(&self, callback: F)
    where
        F: Fn(FeedEvent) -> std::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handler.set(Arc::new(FnHandler(callback)));
    }

    /// Unregister the consumer; events keep draining and are discarded
    pub fn clear_event_callback(&self) {
        self.handler.clear();
    }

    /// Install the predicate that suppresses contract stats events by contract id
    pub fn set_contract_stats_filter<F>(&self, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.filter.set(Arc::new(predicate));
    }

    pub fn clear_contract_stats_filter(&self) {
        self.filter.clear();
    }

    pub fn trade_feed_state(&self) -> watch::Receiver<FeedState> {
        self.trade_state.subscribe()
    }

    pub fn status_feed_state(&self) -> watch::Receiver<FeedState> {
        self.status_state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Cancel a running `start`. No-op when nothing is running.
    pub fn stop(&self) {
        let guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = guard.as_ref() {
            info!("feed client stop requested");
            token.cancel();
        }
    }

    /// Run all four tasks until `stop` or a feed failure.
    ///
    /// Returns `Ok(())` after `stop`, and the failing feed's error otherwise,
    /// once the queue has been drained.
    pub async fn start(
        &self,
        session: &SessionContext,
        contract_id: Option<String>,
        contract_filter: Option<ContractFilter>,
    ) -> Result<()> {
        let token = CancellationToken::new();
        {
            let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.is_some() {
                return Err(PredictItError::Config(
                    "feed client is already running".to_string(),
                ));
            }
            *guard = Some(token.clone());
        }
        let _active = ActiveGuard(&self.active);

        if let Some(filter) = contract_filter {
            self.filter.set(filter);
        }

        let (events, receiver) = event_queue(self.config.queue);
        let trade_feed = TradeFeedConnection::new(
            self.config.trade_feed_endpoint()?,
            contract_id.clone(),
            self.filter.clone(),
            events.clone(),
            self.trade_state.clone(),
        );
        let status_feed = StatusFeedConnection::new(
            self.config.status_feed_endpoint(session)?,
            events,
            self.status_state.clone(),
        );
        let keepalive = KeepaliveLoop::new(self.http.clone(), session, self.config.keepalive_interval);
        let dispatcher = Dispatcher::new(receiver, self.handler.clone());

        info!(
            contract_id = contract_id.as_deref().unwrap_or_default(),
            queue = ?self.config.queue,
            keepalive_secs = self.config.keepalive_interval.as_secs(),
            "feed client starting"
        );

        // The feeds own every queue sender. Once they end, the dispatcher
        // drains what they already queued and then finishes.
        let feeds = {
            let token = token.clone();
            let (trade_state, status_state) = (&self.trade_state, &self.status_state);
            async move {
                let outcome = tokio::select! {
                    _ = token.cancelled() => {
                        info!("feed client stopped");
                        Ok(())
                    }
                    result = trade_feed.run() => feed_ended("trade", result),
                    result = status_feed.run() => feed_ended("status", result),
                    _ = keepalive.run() => {
                        warn!("keepalive loop ended unexpectedly");
                        Ok(())
                    }
                };
                // Feeds cut off mid-stream never publish their own final state.
                trade_state.send_replace(FeedState::Disconnected);
                status_state.send_replace(FeedState::Disconnected);
                outcome
            }
        };
        let dispatch = async {
            tokio::select! {
                stats = dispatcher.run() => Some(stats),
                _ = token.cancelled() => None,
            }
        };

        let (outcome, stats) = tokio::join!(feeds, dispatch);
        match stats {
            Some(stats) => info!(
                dispatched = stats.dispatched,
                discarded = stats.discarded,
                failed = stats.failed,
                "dispatch queue drained"
            ),
            None => debug!("dispatch cut off by stop"),
        }

        outcome
    }
}

struct ActiveGuard<'a>(&'a Mutex<Option<CancellationToken>>);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

fn feed_ended(feed: &'static str, result: Result<()>) -> Result<()> {
    let err = match result {
        Ok(()) => PredictItError::FeedClosed { feed },
        Err(err) => err,
    };
    error!(feed, error = %err, "feed failed; stopping feed client");
    Err(err)
}
