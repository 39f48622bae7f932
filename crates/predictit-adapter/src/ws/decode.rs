/*
[INPUT]:  Raw text frames from the status hub and the realtime-database feed
[OUTPUT]: One FeedEvent per frame (typed, or the untouched frame as Raw)
[POS]:    WebSocket layer - pure frame decoding, no I/O and no state
[UPDATE]: When wire field names or recognized frame shapes change
*/

//! Frame decoding runs in two passes. The text is first parsed into a generic
//! `serde_json::Value`; a pure mapping then picks the event variant from the
//! frame's tag and merges every recognized key found anywhere in the nested
//! structure. Objects are visited children-first, so an outer object's keys
//! win over an inner object's.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use tracing::trace;

use crate::types::{
    BookSide, ContractOwnershipUpdateEvent, ContractStatsEvent, FeedEvent, OrderbookEvent,
    PriceLevel,
};

/// `A[0]` of a hub sub-message carrying an ownership update
pub const OWNERSHIP_UPDATE_SENTINEL: &str = "contractOwnershipUpdate_data";

const ORDERBOOK_PATH: &str = "contractOrderBook";
const CONTRACT_STATS_PATH: &str = "contractStats";

/// Decode one text frame from the realtime-database (trade) feed
pub fn decode_trade_message(text: &str) -> FeedEvent {
    match serde_json::from_str::<Value>(text) {
        Ok(frame) => decode_trade_frame(frame),
        Err(err) => {
            trace!(error = %err, bytes = text.len(), "trade frame is not json");
            FeedEvent::Raw(Value::String(text.to_string()))
        }
    }
}

/// Decode one text frame from the status hub feed
pub fn decode_status_message(text: &str) -> FeedEvent {
    match serde_json::from_str::<Value>(text) {
        Ok(frame) => decode_status_frame(frame),
        Err(err) => {
            trace!(error = %err, bytes = text.len(), "status frame is not json");
            FeedEvent::Raw(Value::String(text.to_string()))
        }
    }
}

/// Map a parsed trade-feed frame onto an event by its `d.b.p` path
pub fn decode_trade_frame(frame: Value) -> FeedEvent {
    let Some(path) = frame.pointer("/d/b/p").and_then(Value::as_str) else {
        return FeedEvent::Raw(frame);
    };

    let path = path.trim_start_matches('/');
    if path.starts_with(ORDERBOOK_PATH) {
        FeedEvent::Orderbook(decode_orderbook(&frame))
    } else if path.starts_with(CONTRACT_STATS_PATH) {
        FeedEvent::ContractStats(decode_contract_stats(&frame))
    } else {
        FeedEvent::Raw(frame)
    }
}

/// Map a parsed hub frame onto an ownership update, if any sub-message carries one
pub fn decode_status_frame(frame: Value) -> FeedEvent {
    if let Some(messages) = frame.get("M").and_then(Value::as_array) {
        for message in messages {
            let Some(args) = message.get("A").and_then(Value::as_array) else {
                continue;
            };
            if args.first().and_then(Value::as_str) != Some(OWNERSHIP_UPDATE_SENTINEL) {
                continue;
            }
            if let Some(payload) = args.get(1).and_then(ownership_payload) {
                return FeedEvent::OwnershipUpdate(decode_ownership_update(&payload));
            }
        }
    }

    FeedEvent::Raw(frame)
}

fn decode_orderbook(frame: &Value) -> OrderbookEvent {
    let mut event = OrderbookEvent::default();

    for_each_object(frame, &mut |object| {
        if let Some(trade_type) = object.get("tradeType") {
            let side = as_number_integer(trade_type).and_then(BookSide::from_trade_type);
            if let (Some(side), Some(level)) = (side, price_level(object)) {
                event.push_level(side, level);
            }
        } else if let Some(contract_id) = object
            .get("p")
            .and_then(Value::as_str)
            .and_then(orderbook_contract_id)
        {
            event.contract_id = contract_id.to_string();
        }
    });

    event
}

fn decode_contract_stats(frame: &Value) -> ContractStatsEvent {
    let mut event = ContractStatsEvent::default();

    for_each_object(frame, &mut |object| {
        if let Some(value) = object.get("BestNoPrice").and_then(as_decimal) {
            event.best_no_price = value;
        }
        if let Some(value) = object.get("BestYesPrice").and_then(as_decimal) {
            event.best_yes_price = value;
        }
        if let Some(value) = object.get("ContractId").and_then(as_text) {
            event.contract_id = value;
        }
        if let Some(value) = object.get("DateUpdated").and_then(as_text) {
            event.date_updated = value;
        }
        if let Some(value) = object.get("LastClosePrice").and_then(as_decimal) {
            event.last_close_price = value;
        }
        if let Some(value) = object.get("LastTradePrice").and_then(as_decimal) {
            event.last_trade_price = value;
        }
        if let Some(value) = object.get("TimeStamp").and_then(as_text) {
            event.timestamp = value;
        }
    });

    event
}

fn decode_ownership_update(payload: &Value) -> ContractOwnershipUpdateEvent {
    let mut event = ContractOwnershipUpdateEvent::default();

    for_each_object(payload, &mut |object| {
        if let Some(value) = object.get("ContractId").and_then(as_text) {
            event.contract_id = value;
        }
        if let Some(value) = object.get("UserPrediction").and_then(as_integer) {
            event.trade_type = value;
        }
        if let Some(value) = object.get("UserQuantity").and_then(as_decimal) {
            event.quantity = value;
        }
        if let Some(value) = object.get("UserOpenOrdersBuyQuantity").and_then(as_decimal) {
            event.open_buy_orders = value;
        }
        if let Some(value) = object.get("UserOpenOrdersSellQuantity").and_then(as_decimal) {
            event.open_sell_orders = value;
        }
        if let Some(value) = object.get("UserAveragePricePerShare").and_then(as_decimal) {
            event.average_price_per_share = value;
        }
        if let Some(value) = object.get("TimeStamp").and_then(as_text) {
            event.timestamp = value;
        }
    });

    event
}

/// The ownership payload arrives either as an object or as a string using
/// single quotes as delimiters.
fn ownership_payload(arg: &Value) -> Option<Cow<'_, Value>> {
    match arg {
        Value::Object(_) => Some(Cow::Borrowed(arg)),
        Value::String(encoded) => serde_json::from_str::<Value>(&encoded.replace('\'', "\""))
            .ok()
            .filter(Value::is_object)
            .map(Cow::Owned),
        _ => None,
    }
}

fn orderbook_contract_id(path: &str) -> Option<&str> {
    let rest = path.trim_start_matches('/').strip_prefix(ORDERBOOK_PATH)?;
    rest.strip_prefix('/').filter(|id| !id.is_empty())
}

fn price_level(object: &Map<String, Value>) -> Option<PriceLevel> {
    let price = object.get("costPerShareYes").and_then(as_decimal)?;
    let quantity = object.get("quantity").and_then(as_decimal)?;
    let price_cents = price.checked_mul(Decimal::ONE_HUNDRED)?.trunc().to_i64()?;
    Some(PriceLevel::new(price_cents, quantity))
}

fn for_each_object<'a, F>(value: &'a Value, visit: &mut F)
where
    F: FnMut(&'a Map<String, Value>),
{
    match value {
        Value::Object(map) => {
            for child in map.values() {
                for_each_object(child, visit);
            }
            visit(map);
        }
        Value::Array(items) => {
            for item in items {
                for_each_object(item, visit);
            }
        }
        _ => {}
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Integral JSON numbers only; `"1"` is not a trade type
fn as_number_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|float| float.fract() == 0.0)
            .map(|float| float as i64)
    })
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        _ => as_number_integer(value),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
