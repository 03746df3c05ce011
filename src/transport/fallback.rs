use super::{Connection, Connector};
use crate::types::{LiveFeedError, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use url::Url;

/// Tries each connector in order and keeps the first handshake that succeeds.
#[derive(Clone)]
pub struct FallbackConnector {
    connectors: Vec<Arc<dyn Connector>>,
}

impl FallbackConnector {
    pub fn new(connectors: Vec<Arc<dyn Connector>>) -> Self {
        Self { connectors }
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl Connector for FallbackConnector {
    fn connect<'a>(&'a self, endpoint: &'a Url) -> BoxFuture<'a, Result<Connection>> {
        Box::pin(async move {
            let mut last_error = None;
            for connector in &self.connectors {
                match connector.connect(endpoint).await {
                    Ok(connection) => return Ok(connection),
                    Err(e) => {
                        tracing::warn!(
                            "{} transport failed, trying next: {}",
                            connector.name(),
                            e
                        );
                        last_error = Some(e);
                    }
                }
            }
            Err(last_error.unwrap_or_else(|| {
                LiveFeedError::Config("no transports configured".to_string())
            }))
        })
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryConnector;

    fn endpoint() -> Url {
        Url::parse("ws://feed.test/socket").unwrap()
    }

    #[tokio::test]
    async fn test_falls_back_to_next_transport() {
        let primary = MemoryConnector::new();
        primary.refuse_connections(true);
        let secondary = MemoryConnector::new();

        let fallback = FallbackConnector::new(vec![
            Arc::new(primary.clone()),
            Arc::new(secondary.clone()),
        ]);
        assert_eq!(fallback.len(), 2);

        let connection = fallback.connect(&endpoint()).await.unwrap();
        assert_eq!(connection.transport, "memory");
        assert_eq!(primary.connect_attempts(), 1);
        assert_eq!(secondary.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let primary = MemoryConnector::new();
        let secondary = MemoryConnector::new();
        let fallback = FallbackConnector::new(vec![
            Arc::new(primary.clone()),
            Arc::new(secondary.clone()),
        ]);

        fallback.connect(&endpoint()).await.unwrap();
        assert_eq!(primary.connect_attempts(), 1);
        assert_eq!(secondary.connect_attempts(), 0);
    }

    #[tokio::test]
    async fn test_reports_last_error_when_all_fail() {
        let only = MemoryConnector::new();
        only.refuse_connections(true);
        let fallback = FallbackConnector::new(vec![Arc::new(only)]);
        assert!(matches!(
            fallback.connect(&endpoint()).await,
            Err(LiveFeedError::Connection(_))
        ));

        let empty = FallbackConnector::new(Vec::new());
        assert!(empty.is_empty());
        assert!(matches!(
            empty.connect(&endpoint()).await,
            Err(LiveFeedError::Config(_))
        ));
    }
}
