// Transport module - Pluggable connectors producing framed connections
pub mod fallback;
pub mod memory;
pub mod polling;
pub mod websocket;

pub use fallback::FallbackConnector;
pub use memory::MemoryConnector;
pub use polling::PollingConnector;
pub use websocket::WebSocketConnector;

use crate::types::{Frame, LiveFeedError, Result};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::Sink;
use std::pin::Pin;
use url::Url;

/// Outbound half of a connection
pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = LiveFeedError> + Send>>;

/// Inbound half of a connection; an `Err` item or the end of the stream means
/// the connection is gone.
pub type FrameStream = BoxStream<'static, Result<Frame>>;

/// An established bidirectional connection.
pub struct Connection {
    /// Transport name, for logs
    pub transport: &'static str,
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// Opens connections to a push endpoint.
///
/// The returned future resolves once the handshake is complete. Timeouts are
/// applied by the caller.
pub trait Connector: Send + Sync {
    fn connect<'a>(&'a self, endpoint: &'a Url) -> BoxFuture<'a, Result<Connection>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
