use super::{Connection, Connector};
use crate::infrastructure::websocket_url;
use crate::types::constants::TRANSPORT_WEBSOCKET;
use crate::types::{Frame, LiveFeedError, Result};
use futures::future::{self, BoxFuture};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// JSON text frames over a WebSocket (`tokio-tungstenite`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn connect<'a>(&'a self, endpoint: &'a Url) -> BoxFuture<'a, Result<Connection>> {
        Box::pin(async move {
            let url = websocket_url(endpoint)?;
            tracing::debug!("Opening WebSocket to {}", url);

            let (ws_stream, response) = tokio_tungstenite::connect_async(url.as_str()).await?;
            tracing::debug!("WebSocket handshake status: {}", response.status());

            let (write_half, read_half) = ws_stream.split();

            let sink = write_half.with(|frame: Frame| future::ready(encode(&frame)));
            let stream = read_half.filter_map(|message| future::ready(decode(message)));

            Ok(Connection {
                transport: TRANSPORT_WEBSOCKET,
                sink: Box::pin(sink),
                stream: stream.boxed(),
            })
        })
    }

    fn name(&self) -> &'static str {
        TRANSPORT_WEBSOCKET
    }
}

fn encode(frame: &Frame) -> Result<Message> {
    let json = serde_json::to_string(frame)?;
    Ok(Message::Text(json.into()))
}

/// Maps one WebSocket message to an inbound item; `None` skips it.
fn decode(message: std::result::Result<Message, tungstenite::Error>) -> Option<Result<Frame>> {
    match message {
        Ok(Message::Text(text)) => match serde_json::from_str::<Frame>(text.as_str()) {
            Ok(frame) => Some(Ok(frame)),
            Err(e) => {
                tracing::warn!("Skipping unparseable frame: {} - Raw: {}", e, text.as_str());
                None
            }
        },
        Ok(Message::Close(frame)) => {
            match frame {
                Some(close_frame) => tracing::warn!(
                    "Server closed connection: code={:?}, reason='{}'",
                    close_frame.code,
                    close_frame.reason
                ),
                None => tracing::warn!("Server closed connection without close frame"),
            }
            Some(Err(LiveFeedError::Closed))
        }
        Ok(Message::Binary(data)) => {
            tracing::warn!("Ignoring binary message ({} bytes)", data.len());
            None
        }
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => None,
        Err(e) => Some(Err(e.into())),
    }
}
