/*
[INPUT]:  FeedEvents pushed concurrently by the trade and status feeds
[OUTPUT]: One consumer invocation per event, in arrival order
[POS]:    WebSocket layer - ordered dispatch queue and its drain loop
[UPDATE]: When changing queue sizing, handler registration or failure isolation
*/

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::http::{PredictItError, Result};
use crate::types::FeedEvent;

use super::QueueMode;

/// Error a consumer may return; it is logged and the loop moves on
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer of dispatched feed events
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_event(&self, event: FeedEvent) -> std::result::Result<(), HandlerError>;
}

/// Adapts a synchronous closure into an [`EventHandler`]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(FeedEvent) -> std::result::Result<(), HandlerError> + Send + Sync,
{
    async fn on_event(&self, event: FeedEvent) -> std::result::Result<(), HandlerError> {
        (self.0)(event)
    }
}

/// Replaceable slot for the single registered consumer
#[derive(Clone, Default)]
pub struct HandlerSlot {
    inner: Arc<RwLock<Option<Arc<dyn EventHandler>>>>,
}

impl HandlerSlot {
    pub fn set(&self, handler: Arc<dyn EventHandler>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(handler);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn current(&self) -> Option<Arc<dyn EventHandler>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    pub fn is_set(&self) -> bool {
        self.current().is_some()
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}

/// Producer half of the dispatch queue; cloned once per feed
#[derive(Debug, Clone)]
pub enum EventSender {
    Unbounded(mpsc::UnboundedSender<FeedEvent>),
    Bounded(mpsc::Sender<FeedEvent>),
}

impl EventSender {
    /// Enqueue an event; waits for space only in bounded mode
    pub async fn push(&self, event: FeedEvent) -> Result<()> {
        match self {
            EventSender::Unbounded(tx) => tx.send(event).map_err(|_| PredictItError::QueueClosed),
            EventSender::Bounded(tx) => tx
                .send(event)
                .await
                .map_err(|_| PredictItError::QueueClosed),
        }
    }
}

/// Consumer half of the dispatch queue
#[derive(Debug)]
pub enum EventReceiver {
    Unbounded(mpsc::UnboundedReceiver<FeedEvent>),
    Bounded(mpsc::Receiver<FeedEvent>),
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        match self {
            EventReceiver::Unbounded(rx) => rx.recv().await,
            EventReceiver::Bounded(rx) => rx.recv().await,
        }
    }
}

/// Create the multi-producer, single-consumer dispatch queue
pub fn event_queue(mode: QueueMode) -> (EventSender, EventReceiver) {
    match mode {
        QueueMode::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (EventSender::Unbounded(tx), EventReceiver::Unbounded(rx))
        }
        QueueMode::Bounded(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (EventSender::Bounded(tx), EventReceiver::Bounded(rx))
        }
    }
}

/// Counters reported when the dispatch loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub discarded: u64,
    pub failed: u64,
}

/// Drains the queue into whichever handler is registered at the time
#[derive(Debug)]
pub struct Dispatcher {
    receiver: EventReceiver,
    handler: HandlerSlot,
}

impl Dispatcher {
    pub fn new(receiver: EventReceiver, handler: HandlerSlot) -> Self {
        Self { receiver, handler }
    }

    /// Run until every sender is dropped.
    ///
    /// Each handler call runs as its own task and is awaited before the next
    /// event is taken, so an error or panic costs only the event that caused it.
    pub async fn run(mut self) -> DispatchStats {
        let mut stats = DispatchStats::default();

        while let Some(event) = self.receiver.recv().await {
            let Some(handler) = self.handler.current() else {
                trace!(kind = event.kind(), "no event handler registered; event discarded");
                stats.discarded += 1;
                continue;
            };

            let kind = event.kind();
            let outcome = tokio::spawn(async move { handler.on_event(event).await }).await;
            match outcome {
                Ok(Ok(())) => stats.dispatched += 1,
                Ok(Err(err)) => {
                    stats.failed += 1;
                    warn!(kind, error = %err, "event handler failed; continuing");
                }
                Err(join_err) if join_err.is_panic() => {
                    stats.failed += 1;
                    error!(kind, "event handler panicked; continuing");
                }
                Err(join_err) => {
                    stats.failed += 1;
                    warn!(kind, error = %join_err, "event handler task aborted; continuing");
                }
            }
        }

        debug!(
            dispatched = stats.dispatched,
            discarded = stats.discarded,
            failed = stats.failed,
            "dispatch queue closed"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<FeedEvent>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn on_event(&self, event: FeedEvent) -> std::result::Result<(), HandlerError> {
            self.seen.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn tagged(producer: &str, index: u64) -> FeedEvent {
        FeedEvent::Raw(json!({"producer": producer, "index": index}))
    }

    #[tokio::test]
    async fn test_per_producer_order_is_preserved() {
        let (tx, rx) = event_queue(QueueMode::Unbounded);
        let recorder = Arc::new(Recorder::default());
        let slot = HandlerSlot::default();
        slot.set(recorder.clone());

        let dispatcher = tokio::spawn(Dispatcher::new(rx, slot).run());

        let producer = |name: &'static str, count: u64, tx: EventSender| async move {
            for index in 0..count {
                tx.push(tagged(name, index)).await.unwrap();
                if index % 7 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        };
        let a = tokio::spawn(producer("a", 120, tx.clone()));
        let b = tokio::spawn(producer("b", 80, tx.clone()));
        drop(tx);
        a.await.unwrap();
        b.await.unwrap();

        let stats = dispatcher.await.unwrap();
        assert_eq!(stats.dispatched, 200);

        let seen = recorder.seen.lock().unwrap();
        for (name, count) in [("a", 120), ("b", 80)] {
            let indices: Vec<u64> = seen
                .iter()
                .filter_map(|event| match event {
                    FeedEvent::Raw(value) if value["producer"] == name => value["index"].as_u64(),
                    _ => None,
                })
                .collect();
            assert_eq!(indices, (0..count).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_no_handler_drains_silently() {
        let (tx, rx) = event_queue(QueueMode::Unbounded);
        for index in 0..5 {
            tx.push(tagged("a", index)).await.unwrap();
        }
        drop(tx);

        let stats = Dispatcher::new(rx, HandlerSlot::default()).run().await;
        assert_eq!(
            stats,
            DispatchStats {
                dispatched: 0,
                discarded: 5,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_next_event() {
        let (tx, rx) = event_queue(QueueMode::Bounded(4));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_handler = seen.clone();
        let slot = HandlerSlot::default();
        slot.set(Arc::new(FnHandler(move |event: FeedEvent| -> std::result::Result<(), HandlerError> {
            let index = match &event {
                FeedEvent::Raw(value) => value["index"].as_u64().unwrap_or_default(),
                _ => 0,
            };
            if index == 1 {
                return Err("consumer rejected event".into());
            }
            if index == 2 {
                panic!("consumer blew up");
            }
            seen_by_handler.lock().unwrap().push(index);
            Ok(())
        })));

        let dispatcher = tokio::spawn(Dispatcher::new(rx, slot).run());
        for index in 0..4 {
            tx.push(tagged("a", index)).await.unwrap();
        }
        drop(tx);

        let stats = dispatcher.await.unwrap();
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(*seen.lock().unwrap(), vec![0, 3]);
    }

    #[tokio::test]
    async fn test_push_after_dispatcher_gone_is_queue_closed() {
        let (tx, rx) = event_queue(QueueMode::Unbounded);
        drop(rx);

        let err = tx.push(tagged("a", 0)).await.unwrap_err();
        assert!(matches!(err, PredictItError::QueueClosed));
    }

    #[test]
    fn test_handler_slot_set_and_clear() {
        let slot = HandlerSlot::default();
        assert!(!slot.is_set());

        slot.set(Arc::new(Recorder::default()));
        assert!(slot.is_set());

        slot.clear();
        assert!(slot.current().is_none());
    }
}
