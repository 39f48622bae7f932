/*
[INPUT]:  Config allow-lists and the logging consumer
[OUTPUT]: Stats filter and consumer behavior through the public API
[POS]:    Integration tests - runner building blocks
[UPDATE]: When filter or consumer behavior changes
*/

use predictit_adapter::{ContractStatsEvent, EventHandler, FeedEvent};
use predictit_feed::{FeedSettings, LoggingConsumer};
use tokio_test::assert_ok;

#[test]
fn test_example_config_parses() {
    let path = format!("{}/config/feed.example.yaml", env!("CARGO_MANIFEST_DIR"));
    let settings = assert_ok!(FeedSettings::from_file(&path));
    assert_eq!(settings.contract_id.as_deref(), Some("12345"));

    let filter = settings.stats_filter().expect("allow-list present");
    assert!(!filter("12345"));
    assert!(filter("99"));
}

#[tokio::test]
async fn test_logging_consumer_counts_stats() {
    let consumer = LoggingConsumer::new();
    let event = FeedEvent::ContractStats(ContractStatsEvent {
        contract_id: "12345".to_string(),
        ..Default::default()
    });

    assert_ok!(consumer.on_event(event).await);
    assert_eq!(consumer.counts().contract_stats, 1);
}
