/*
[INPUT]:  Feed configuration, session context, consumer registrations
[OUTPUT]: Decoded realtime events delivered to the registered consumer
[POS]:    WebSocket layer - trade feed, status feed, keepalive, dispatch
[UPDATE]: When adding feeds or changing how the tasks are composed
*/

pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod keepalive;
pub mod request;
pub mod status_feed;
pub mod stream;
pub mod trade_feed;

pub use client::FeedClient;
pub use config::{FeedConfig, QueueMode};
pub use decode::{decode_status_message, decode_trade_message};
pub use dispatch::{DispatchStats, EventHandler, FnHandler, HandlerError};
pub use keepalive::{KeepaliveLoop, TickOutcome};
pub use request::{RequestSequence, SubscriptionRequest, TradeFeedRequest};
pub use stream::FeedState;
pub use trade_feed::ContractFilter;
