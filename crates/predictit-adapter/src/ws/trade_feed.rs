/*
[INPUT]:  Realtime-database endpoint, optional order book contract, stats filter
[OUTPUT]: Decoded trade-feed events pushed onto the dispatch queue
[POS]:    WebSocket layer - trade feed connection and handshake
[UPDATE]: When the handshake sequence or stats filtering changes
*/

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, trace};
use url::Url;

use crate::http::Result;
use crate::types::FeedEvent;

use super::decode::decode_trade_message;
use super::dispatch::EventSender;
use super::request::{RequestSequence, TradeFeedRequest};
use super::stream::{self, FeedState};

const FEED: &str = "trade";

/// Predicate over a contract id; `true` suppresses that contract's stats events
pub type ContractFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Replaceable slot for the contract stats filter
#[derive(Clone, Default)]
pub struct FilterSlot {
    inner: Arc<RwLock<Option<ContractFilter>>>,
}

impl FilterSlot {
    pub fn set(&self, filter: ContractFilter) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(filter);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Whether a stats event for this contract should be dropped
    pub fn suppresses(&self, contract_id: &str) -> bool {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().is_some_and(|filter| filter(contract_id))
    }
}

impl fmt::Debug for FilterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("FilterSlot")
            .field("installed", &installed)
            .finish()
    }
}

/// One connection to the realtime-database feed.
///
/// Runs until the transport fails; it never reconnects on its own.
#[derive(Debug)]
pub struct TradeFeedConnection {
    endpoint: Url,
    contract_id: Option<String>,
    filter: FilterSlot,
    events: EventSender,
    state: watch::Sender<FeedState>,
}

impl TradeFeedConnection {
    pub fn new(
        endpoint: Url,
        contract_id: Option<String>,
        filter: FilterSlot,
        events: EventSender,
        state: watch::Sender<FeedState>,
    ) -> Self {
        Self {
            endpoint,
            contract_id,
            filter,
            events,
            state,
        }
    }

    /// Frames sent right after the greeting, in order
    pub fn handshake_requests(&self) -> Vec<TradeFeedRequest> {
        let mut requests = vec![
            TradeFeedRequest::InitSdk,
            TradeFeedRequest::SubscribeMarketStats,
            TradeFeedRequest::SubscribeContractStats,
        ];
        if let Some(contract_id) = &self.contract_id {
            requests.push(TradeFeedRequest::SubscribeContractOrderbook(contract_id.clone()));
        }
        requests
    }

    /// Connect, handshake, then stream until the connection fails
    pub async fn run(self) -> Result<()> {
        let result = self.connect_and_stream().await;
        self.state.send_replace(FeedState::Disconnected);
        result
    }

    async fn connect_and_stream(&self) -> Result<()> {
        let socket = stream::connect(FEED, &self.endpoint).await?;
        self.state.send_replace(FeedState::Connected);
        let (mut write, mut read) = socket.split();

        let greeting = stream::next_text(FEED, &mut read).await?;
        debug!(feed = FEED, bytes = greeting.len(), "greeting discarded");

        self.state.send_replace(FeedState::Handshaking);
        // Fresh per connection, so numbering restarts at 1 after a reconnect.
        let mut sequence = RequestSequence::new();
        for request in self.handshake_requests() {
            let built = sequence.build(&request);
            write.send(WsMessage::Text(built.to_wire()?.into())).await?;
            debug!(
                feed = FEED,
                sequence = built.sequence_number,
                action = built.action.code(),
                path = built.path.as_deref().unwrap_or_default(),
                "request sent"
            );
        }

        self.state.send_replace(FeedState::Streaming);
        info!(
            feed = FEED,
            contract_id = self.contract_id.as_deref().unwrap_or_default(),
            "trade feed streaming"
        );

        loop {
            let text = stream::next_text(FEED, &mut read).await?;
            let event = decode_trade_message(&text);

            if let FeedEvent::ContractStats(stats) = &event
                && self.filter.suppresses(&stats.contract_id)
            {
                trace!(contract_id = %stats.contract_id, "contract stats suppressed by filter");
                continue;
            }

            self.events.push(event).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::QueueMode;
    use crate::ws::dispatch::event_queue;
    use crate::ws::stream::state_channel;

    fn connection(contract_id: Option<&str>) -> TradeFeedConnection {
        let (events, _rx) = event_queue(QueueMode::Unbounded);
        let (state, _state_rx) = state_channel();
        TradeFeedConnection::new(
            Url::parse("ws://127.0.0.1:1/.ws").unwrap(),
            contract_id.map(str::to_string),
            FilterSlot::default(),
            events,
            state,
        )
    }

    #[test]
    fn test_handshake_without_contract() {
        assert_eq!(
            connection(None).handshake_requests(),
            vec![
                TradeFeedRequest::InitSdk,
                TradeFeedRequest::SubscribeMarketStats,
                TradeFeedRequest::SubscribeContractStats,
            ]
        );
    }

    #[test]
    fn test_handshake_with_contract_ends_with_orderbook() {
        let requests = connection(Some("12345")).handshake_requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(
            requests.last(),
            Some(&TradeFeedRequest::SubscribeContractOrderbook("12345".to_string()))
        );
    }

    #[test]
    fn test_filter_slot() {
        let slot = FilterSlot::default();
        assert!(!slot.suppresses("1"));

        slot.set(Arc::new(|contract_id: &str| contract_id != "12345"));
        assert!(slot.suppresses("1"));
        assert!(!slot.suppresses("12345"));

        slot.clear();
        assert!(!slot.suppresses("1"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_fast() {
        let conn = connection(None);
        let state = conn.state.subscribe();
        assert!(conn.run().await.is_err());
        assert_eq!(*state.borrow(), FeedState::Disconnected);
    }
}
