/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST and SignalR handshake communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod session;

pub use error::{PredictItError, Result};

pub use client::{ClientConfig, PredictItClient};
pub use session::{NegotiateResponse, TokenResponse};
