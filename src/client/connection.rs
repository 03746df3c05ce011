use crate::transport::FrameSink;
use crate::types::{Frame, Result};
use futures::SinkExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands for the writer task
#[derive(Debug)]
pub(crate) enum Outbound {
    Frame(Frame),
    Close,
}

/// Background tasks owned by one live connection.
#[derive(Default)]
pub(crate) struct ConnectionTasks {
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl ConnectionTasks {
    pub fn new(reader: JoinHandle<()>, writer: JoinHandle<()>) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
        }
    }

    /// Stops reading immediately; the writer drains and exits on its own
    /// once its queue is closed.
    pub fn shutdown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.writer.take();
    }
}

/// Forwards queued frames to the transport until closed.
///
/// # Errors
///
/// Returns the transport error when a send fails; the connection is unusable
/// from then on.
pub(crate) async fn write_loop(
    mut queue: mpsc::UnboundedReceiver<Outbound>,
    mut sink: FrameSink,
) -> Result<()> {
    while let Some(command) = queue.recv().await {
        match command {
            Outbound::Frame(frame) => {
                let event = frame.event.clone();
                if let Err(e) = sink.send(frame).await {
                    tracing::error!("Failed to send '{}': {}", event, e);
                    return Err(e);
                }
                tracing::debug!("Sent '{}'", event);
            }
            Outbound::Close => {
                if let Err(e) = sink.close().await {
                    tracing::debug!("Error while closing transport: {}", e);
                }
                break;
            }
        }
    }
    tracing::debug!("Writer task finished");
    Ok(())
}
