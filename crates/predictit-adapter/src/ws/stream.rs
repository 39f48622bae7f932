/*
[INPUT]:  Feed endpoint URLs and raw tungstenite message streams
[OUTPUT]: Connected sockets, text frames, connection state notifications
[POS]:    WebSocket layer - transport plumbing shared by both feeds
[UPDATE]: When changing how control frames or closes are treated
*/

use futures_util::{Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};
use url::Url;

use crate::http::{PredictItError, Result};

pub(crate) type FeedSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of one feed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Disconnected,
    Connected,
    Handshaking,
    Streaming,
}

pub(crate) fn state_channel() -> (watch::Sender<FeedState>, watch::Receiver<FeedState>) {
    watch::channel(FeedState::Disconnected)
}

pub(crate) async fn connect(feed: &'static str, endpoint: &Url) -> Result<FeedSocket> {
    info!(feed, host = endpoint.host_str().unwrap_or_default(), "connecting feed");
    let (socket, response) = connect_async(endpoint.as_str()).await?;
    info!(feed, status = %response.status(), "feed connected");
    Ok(socket)
}

/// Wait for the next text frame, skipping control frames.
///
/// A close frame or end of stream is reported as `FeedClosed`.
pub(crate) async fn next_text<S>(feed: &'static str, read: &mut S) -> Result<String>
where
    S: Stream<Item = std::result::Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match read.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(text.as_str().to_owned()),
            Some(Ok(WsMessage::Binary(bytes))) => {
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
            Some(Ok(WsMessage::Frame(_))) => {}
            Some(Ok(WsMessage::Close(frame))) => {
                debug!(feed, ?frame, "close frame received");
                return Err(PredictItError::FeedClosed { feed });
            }
            Some(Err(err)) => return Err(err.into()),
            None => return Err(PredictItError::FeedClosed { feed }),
        }
    }
}
