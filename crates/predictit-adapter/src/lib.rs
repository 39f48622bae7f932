/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public PredictIt realtime client surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{Credentials, SessionContext};

// Re-export commonly used types from http
pub use http::{ClientConfig, PredictItClient, PredictItError, Result};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    ContractFilter,
    EventHandler,
    FeedClient,
    FeedConfig,
    FeedState,
    HandlerError,
    QueueMode,
};
