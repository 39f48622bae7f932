/*
[INPUT]:  Decoded feed events from the dispatch loop
[OUTPUT]: Structured log lines and per-kind event counts
[POS]:    Consumer layer - default event sink for the runner
[UPDATE]: When changing what the runner reports per event
*/

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use predictit_adapter::{EventHandler, FeedEvent, HandlerError};

/// Counts of events seen so far, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub contract_stats: u64,
    pub orderbook: u64,
    pub ownership_updates: u64,
    pub raw: u64,
}

/// Logs every event it receives
#[derive(Debug, Default)]
pub struct LoggingConsumer {
    contract_stats: AtomicU64,
    orderbook: AtomicU64,
    ownership_updates: AtomicU64,
    raw: AtomicU64,
}

impl LoggingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts {
            contract_stats: self.contract_stats.load(Ordering::Relaxed),
            orderbook: self.orderbook.load(Ordering::Relaxed),
            ownership_updates: self.ownership_updates.load(Ordering::Relaxed),
            raw: self.raw.load(Ordering::Relaxed),
        }
    }

    fn record(&self, event: &FeedEvent) {
        match event {
            FeedEvent::ContractStats(stats) => {
                self.contract_stats.fetch_add(1, Ordering::Relaxed);
                info!(
                    contract_id = %stats.contract_id,
                    last_trade = %stats.last_trade_price,
                    best_yes = %stats.best_yes_price,
                    best_no = %stats.best_no_price,
                    "contract stats"
                );
            }
            FeedEvent::Orderbook(book) => {
                self.orderbook.fetch_add(1, Ordering::Relaxed);
                info!(
                    contract_id = %book.contract_id,
                    best_bid = book.bids.first().map(|level| level.price_cents),
                    best_ask = book.asks.first().map(|level| level.price_cents),
                    bid_levels = book.bids.len(),
                    ask_levels = book.asks.len(),
                    "order book"
                );
            }
            FeedEvent::OwnershipUpdate(update) => {
                self.ownership_updates.fetch_add(1, Ordering::Relaxed);
                info!(
                    contract_id = %update.contract_id,
                    trade_type = update.trade_type,
                    quantity = %update.quantity,
                    average_price = %update.average_price_per_share,
                    "ownership update"
                );
            }
            FeedEvent::Raw(frame) => {
                self.raw.fetch_add(1, Ordering::Relaxed);
                debug!(%frame, "unrecognized frame");
            }
        }
    }
}

#[async_trait]
impl EventHandler for LoggingConsumer {
    async fn on_event(&self, event: FeedEvent) -> Result<(), HandlerError> {
        self.record(&event);
        Ok(())
    }
}
