/*
[INPUT]:  Decoded feed frames
[OUTPUT]: Typed domain events handed to the consumer
[POS]:    Data layer - normalized event model shared by both feeds
[UPDATE]: When adding event kinds or event fields
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BookSide;

/// Per-contract price statistics from the trade feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStatsEvent {
    pub contract_id: String,
    pub best_no_price: Decimal,
    pub best_yes_price: Decimal,
    pub last_close_price: Decimal,
    pub last_trade_price: Decimal,
    pub date_updated: String,
    pub timestamp: String,
}

/// One order book level; price in whole cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price_cents: i64,
    pub quantity: Decimal,
}

impl PriceLevel {
    pub fn new(price_cents: i64, quantity: Decimal) -> Self {
        Self {
            price_cents,
            quantity,
        }
    }
}

/// Order book levels decoded from one trade-feed frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderbookEvent {
    pub contract_id: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderbookEvent {
    pub fn push_level(&mut self, side: BookSide, level: PriceLevel) {
        match side {
            BookSide::Bid => self.bids.push(level),
            BookSide::Ask => self.asks.push(level),
        }
    }
}

/// The account's position change on a contract, from the status feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractOwnershipUpdateEvent {
    pub contract_id: String,
    pub trade_type: i64,
    pub quantity: Decimal,
    pub open_buy_orders: Decimal,
    pub open_sell_orders: Decimal,
    pub average_price_per_share: Decimal,
    pub timestamp: String,
}

/// Everything the dispatch loop can hand to a consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    ContractStats(ContractStatsEvent),
    Orderbook(OrderbookEvent),
    OwnershipUpdate(ContractOwnershipUpdateEvent),
    /// Frame with no recognized shape, passed through untouched
    Raw(serde_json::Value),
}

impl FeedEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::ContractStats(_) => "contract_stats",
            FeedEvent::Orderbook(_) => "orderbook",
            FeedEvent::OwnershipUpdate(_) => "ownership_update",
            FeedEvent::Raw(_) => "raw",
        }
    }

    pub fn contract_id(&self) -> Option<&str> {
        match self {
            FeedEvent::ContractStats(event) => Some(&event.contract_id),
            FeedEvent::Orderbook(event) => Some(&event.contract_id),
            FeedEvent::OwnershipUpdate(event) => Some(&event.contract_id),
            FeedEvent::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, FeedEvent::Raw(_))
    }
}
