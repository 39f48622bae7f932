/*
[INPUT]:  Running feed client, session, shutdown token
[OUTPUT]: Feed outcome once the feeds fail or shutdown is requested
[POS]:    Runtime layer - ties OS shutdown to the feed client lifecycle
[UPDATE]: When changing how shutdown reaches the feed client
*/

use tokio_util::sync::CancellationToken;
use tracing::info;

use predictit_adapter::{ContractFilter, FeedClient, Result, SessionContext};

/// Run the client until it fails or `shutdown` is cancelled.
///
/// A shutdown that arrives before `start` was first polled returns without
/// connecting; one that arrives later stops the client and waits for it.
pub async fn run_until_shutdown(
    client: &FeedClient,
    session: &SessionContext,
    contract_id: Option<String>,
    contract_filter: Option<ContractFilter>,
    shutdown: CancellationToken,
) -> Result<()> {
    let start = client.start(session, contract_id, contract_filter);
    tokio::pin!(start);

    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {}
        outcome = &mut start => return outcome,
    }

    info!("shutdown signal received");
    if !client.is_running() {
        return Ok(());
    }
    client.stop();
    start.await
}
