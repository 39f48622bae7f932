/*
[INPUT]:  Requested subscription action and the connection's sequence state
[OUTPUT]: Wire-exact realtime-database frames with increasing `r` numbers
[POS]:    WebSocket layer - outbound frame construction for the trade feed
[UPDATE]: When subscription paths, tags or the envelope format change
*/

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::Result;
use crate::types::RequestAction;

/// Client SDK version reported in the init handshake
const SDK_VERSION_KEY: &str = "sdk.js.4-9-1";

/// A frame the trade feed knows how to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeFeedRequest {
    InitSdk,
    SubscribeMarketStats,
    SubscribeContractStats,
    SubscribeContractOrderbook(String),
    UnsubscribeContractOrderbook(String),
}

impl TradeFeedRequest {
    pub fn action(&self) -> RequestAction {
        match self {
            TradeFeedRequest::InitSdk => RequestAction::Subscribe,
            TradeFeedRequest::SubscribeMarketStats
            | TradeFeedRequest::SubscribeContractStats
            | TradeFeedRequest::SubscribeContractOrderbook(_) => RequestAction::Query,
            TradeFeedRequest::UnsubscribeContractOrderbook(_) => RequestAction::Unsubscribe,
        }
    }

    pub fn path(&self) -> Option<String> {
        match self {
            TradeFeedRequest::InitSdk => None,
            TradeFeedRequest::SubscribeMarketStats => Some("/marketStats".to_string()),
            TradeFeedRequest::SubscribeContractStats => Some("/contractStats".to_string()),
            TradeFeedRequest::SubscribeContractOrderbook(contract_id)
            | TradeFeedRequest::UnsubscribeContractOrderbook(contract_id) => {
                Some(format!("/contractOrderBook/{contract_id}"))
            }
        }
    }

    fn body(&self, now: DateTime<Utc>) -> RequestBody {
        match self {
            TradeFeedRequest::InitSdk => RequestBody::Client {
                c: [(SDK_VERSION_KEY, 1)].into_iter().collect(),
            },
            TradeFeedRequest::SubscribeMarketStats => stats_query("/marketStats", 1, now),
            TradeFeedRequest::SubscribeContractStats => stats_query("/contractStats", 2, now),
            TradeFeedRequest::SubscribeContractOrderbook(contract_id) => RequestBody::Path {
                p: format!("/contractOrderBook/{contract_id}"),
                q: None,
                t: None,
                h: Some(""),
            },
            // Closing a listen drops the `h` history marker.
            TradeFeedRequest::UnsubscribeContractOrderbook(contract_id) => RequestBody::Path {
                p: format!("/contractOrderBook/{contract_id}"),
                q: None,
                t: None,
                h: None,
            },
        }
    }
}

/// One outbound frame, numbered for its connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRequest {
    pub sequence_number: u64,
    pub action: RequestAction,
    pub path: Option<String>,
    payload: RequestBody,
}

impl SubscriptionRequest {
    /// Render the `{t, d: {r, a, b}}` envelope
    pub fn to_wire(&self) -> Result<String> {
        let envelope = Envelope {
            t: "d",
            d: EnvelopeData {
                r: self.sequence_number.to_string(),
                a: self.action,
                b: &self.payload,
            },
        };
        Ok(serde_json::to_string(&envelope)?)
    }
}

/// Per-connection request counter; a fresh one is created for every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSequence {
    next: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Number the next built request will carry
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Number a request and advance the counter
    pub fn build(&mut self, request: &TradeFeedRequest) -> SubscriptionRequest {
        self.build_at(request, Utc::now())
    }

    pub fn build_at(&mut self, request: &TradeFeedRequest, now: DateTime<Utc>) -> SubscriptionRequest {
        let built = SubscriptionRequest {
            sequence_number: self.next,
            action: request.action(),
            path: request.path(),
            payload: request.body(now),
        };
        self.next += 1;
        built
    }
}

impl Default for RequestSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum RequestBody {
    Client {
        c: std::collections::BTreeMap<&'static str, u32>,
    },
    Path {
        p: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        q: Option<StatsQuery>,
        #[serde(skip_serializing_if = "Option::is_none")]
        t: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        h: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct StatsQuery {
    sp: String,
    i: &'static str,
}

#[derive(Serialize)]
struct Envelope<'a> {
    t: &'static str,
    d: EnvelopeData<'a>,
}

#[derive(Serialize)]
struct EnvelopeData<'a> {
    r: String,
    a: RequestAction,
    b: &'a RequestBody,
}

fn stats_query(path: &str, tag: u32, now: DateTime<Utc>) -> RequestBody {
    RequestBody::Path {
        p: path.to_string(),
        q: Some(StatsQuery {
            sp: format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros()),
            i: "TimeStamp",
        }),
        t: Some(tag),
        h: Some(""),
    }
}
