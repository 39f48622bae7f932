/*
[INPUT]:  Credentials file path (PREDICTIT_AUTH_FILE) and optional contract id
[OUTPUT]: Realtime PredictIt events printed for one minute
[POS]:    Examples - feed client usage
[UPDATE]: When the feed client API changes
*/

use std::sync::Arc;

use predictit_adapter::*;
use tokio::time::{Duration, sleep};

/// Example: stream both feeds for a minute, then stop
///
/// PREDICTIT_AUTH_FILE=auth.txt cargo run --example stream_example -- 12345
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== PredictIt Stream Example ===\n");

    let auth_file = std::env::var("PREDICTIT_AUTH_FILE").unwrap_or_else(|_| "auth.txt".into());
    let contract_id = std::env::args().nth(1);

    let credentials = Credentials::from_file(&auth_file)?;
    let http = PredictItClient::new()?;
    let session = SessionContext::establish(&http, &credentials).await?;
    println!("✓ Session established (epoch {})", session.session_epoch);

    let client = Arc::new(FeedClient::new(http, FeedConfig::default()));
    client.set_event_fn(|event| {
        match &event {
            FeedEvent::ContractStats(stats) => {
                println!("stats    {} last={}", stats.contract_id, stats.last_trade_price)
            }
            FeedEvent::Orderbook(book) => println!(
                "book     {} bids={} asks={}",
                book.contract_id,
                book.bids.len(),
                book.asks.len()
            ),
            FeedEvent::OwnershipUpdate(update) => {
                println!("position {} qty={}", update.contract_id, update.quantity)
            }
            FeedEvent::Raw(_) => {}
        }
        Ok(())
    });

    let stopper = Arc::clone(&client);
    tokio::spawn(async move {
        sleep(Duration::from_secs(60)).await;
        stopper.stop();
    });

    client.start(&session, contract_id, None).await?;
    println!("\n✓ Stream example complete");
    Ok(())
}
