/*
[INPUT]:  Public API exports for predictit-feed crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod consumer;
pub mod runner;

// Re-export main types for convenience
pub use config::{EndpointConfig, FeedSettings};
pub use consumer::{EventCounts, LoggingConsumer};
pub use runner::run_until_shutdown;
