use super::{Connection, Connector};
use crate::infrastructure::lock;
use crate::types::{Frame, LiveFeedError, Result};
use futures::channel::mpsc;
use futures::future::BoxFuture;
use futures::{StreamExt, sink};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Default)]
struct MemoryShared {
    refuse: bool,
    stall: bool,
    fail_sends: bool,
    attempts: usize,
    server_tx: Option<mpsc::UnboundedSender<Result<Frame>>>,
    sent: Vec<Frame>,
}

/// In-process connector; the handle doubles as the "server" side.
///
/// Clones share state, so a test keeps one clone to push frames, drop the
/// connection, or inspect what the client sent.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    shared: Arc<Mutex<MemoryShared>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent handshakes fail immediately.
    pub fn refuse_connections(&self, refuse: bool) {
        lock(&self.shared).refuse = refuse;
    }

    /// Makes subsequent handshakes never complete.
    pub fn stall_connections(&self, stall: bool) {
        lock(&self.shared).stall = stall;
    }

    /// Makes every client send fail on the live connection while the inbound
    /// side stays open.
    pub fn fail_sends(&self, fail: bool) {
        lock(&self.shared).fail_sends = fail;
    }

    pub fn connect_attempts(&self) -> usize {
        lock(&self.shared).attempts
    }

    pub fn is_open(&self) -> bool {
        lock(&self.shared).server_tx.is_some()
    }

    /// Delivers a frame to the client on the live connection.
    pub fn push(&self, event: &str, data: Value) -> bool {
        let shared = lock(&self.shared);
        match &shared.server_tx {
            Some(tx) => tx.unbounded_send(Ok(Frame::new(event, data))).is_ok(),
            None => false,
        }
    }

    /// Ends the live connection from the server side.
    pub fn drop_connection(&self) {
        lock(&self.shared).server_tx = None;
    }

    /// Frames the client has sent, across every connection, in order.
    pub fn sent(&self) -> Vec<Frame> {
        lock(&self.shared).sent.clone()
    }

    pub fn take_sent(&self) -> Vec<Frame> {
        std::mem::take(&mut lock(&self.shared).sent)
    }
}

impl Connector for MemoryConnector {
    fn connect<'a>(&'a self, _endpoint: &'a Url) -> BoxFuture<'a, Result<Connection>> {
        Box::pin(async move {
            let (stall, refuse) = {
                let mut shared = lock(&self.shared);
                shared.attempts += 1;
                (shared.stall, shared.refuse)
            };
            if stall {
                futures::future::pending::<()>().await;
            }
            if refuse {
                return Err(LiveFeedError::Connection("connection refused".to_string()));
            }

            let (server_tx, server_rx) = mpsc::unbounded();
            lock(&self.shared).server_tx = Some(server_tx);

            let outbound = sink::unfold(Arc::clone(&self.shared), |shared, frame: Frame| {
                let accepted = {
                    let mut guard = lock(&shared);
                    if guard.fail_sends {
                        false
                    } else {
                        guard.sent.push(frame);
                        true
                    }
                };
                async move {
                    if accepted {
                        Ok(shared)
                    } else {
                        Err(LiveFeedError::Connection("send rejected".to_string()))
                    }
                }
            });

            Ok(Connection {
                transport: "memory",
                sink: Box::pin(outbound),
                stream: server_rx.boxed(),
            })
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_through_memory_connection() {
        let server = MemoryConnector::new();
        let endpoint = Url::parse("ws://memory/").unwrap();
        let mut connection = server.connect(&endpoint).await.unwrap();
        assert!(server.is_open());

        connection
            .sink
            .send(Frame::new("matches:subscribe", json!({})))
            .await
            .unwrap();
        assert_eq!(server.sent()[0].event, "matches:subscribe");

        assert!(server.push("matches:live", json!({ "id": "m1" })));
        let frame = connection.stream.next().await.unwrap().unwrap();
        assert_eq!(frame.event, "matches:live");

        server.drop_connection();
        assert!(!server.is_open());
        assert!(connection.stream.next().await.is_none());
        assert!(!server.push("matches:live", Value::Null));
    }

    #[tokio::test]
    async fn test_failing_sends_keep_inbound_open() {
        let server = MemoryConnector::new();
        let endpoint = Url::parse("ws://memory/").unwrap();
        let mut connection = server.connect(&endpoint).await.unwrap();

        server.fail_sends(true);
        let result = connection
            .sink
            .send(Frame::new("matches:request", json!({})))
            .await;
        assert!(matches!(result, Err(LiveFeedError::Connection(_))));
        assert!(server.sent().is_empty());

        assert!(server.push("matches:live", json!({ "id": "m1" })));
        assert!(connection.stream.next().await.is_some());
    }
}
