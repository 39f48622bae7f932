/*
[INPUT]:  Wire-level codes from the realtime-database and status feeds
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for feed communication
[UPDATE]: When protocol codes change or new codes are added
*/

use serde::{Deserialize, Serialize};

/// Side of the order book a trade-type level lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

impl BookSide {
    /// `tradeType` 1 is a bid and 0 is an ask; any other value is not a book level.
    ///
    /// This mapping has not been revalidated against the live feed.
    pub fn from_trade_type(trade_type: i64) -> Option<Self> {
        match trade_type {
            1 => Some(BookSide::Bid),
            0 => Some(BookSide::Ask),
            _ => None,
        }
    }
}

/// Action code carried in the `a` field of an outbound realtime-database frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestAction {
    #[serde(rename = "s")]
    Subscribe,
    #[serde(rename = "q")]
    Query,
    #[serde(rename = "n")]
    Unsubscribe,
}

impl RequestAction {
    pub fn code(self) -> &'static str {
        match self {
            RequestAction::Subscribe => "s",
            RequestAction::Query => "q",
            RequestAction::Unsubscribe => "n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_type_mapping() {
        assert_eq!(BookSide::from_trade_type(1), Some(BookSide::Bid));
        assert_eq!(BookSide::from_trade_type(0), Some(BookSide::Ask));
        assert_eq!(BookSide::from_trade_type(3), None);
    }

    #[test]
    fn test_action_codes_match_serde() {
        for action in [
            RequestAction::Subscribe,
            RequestAction::Query,
            RequestAction::Unsubscribe,
        ] {
            let encoded = serde_json::to_value(action).unwrap();
            assert_eq!(encoded, serde_json::Value::from(action.code()));
        }
    }
}
