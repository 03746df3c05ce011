use super::{ClientState, LiveFeedClient};
use crate::infrastructure::ReconnectConfig;
use crate::messaging::EventDispatcher;
use crate::transport::{
    Connector, FallbackConnector, PollingConnector, WebSocketConnector,
};
use crate::types::constants::{DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::types::{LiveFeedError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Transports the default connector can try, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    WebSocket,
    Polling,
}

#[derive(Debug, Clone)]
pub struct LiveFeedOptions {
    /// Upper bound on one connect handshake (all transports included)
    pub handshake_timeout: Duration,
    pub reconnect: ReconnectConfig,
    /// Tried in order until one completes a handshake
    pub transports: Vec<TransportKind>,
    /// Pause between empty long-poll responses
    pub poll_interval: Duration,
}

impl Default for LiveFeedOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT),
            reconnect: ReconnectConfig::default(),
            transports: vec![TransportKind::WebSocket, TransportKind::Polling],
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl LiveFeedOptions {
    /// Defaults overridden by any of `LIVEFEED_HANDSHAKE_TIMEOUT_MS`,
    /// `LIVEFEED_RECONNECT_MAX_ATTEMPTS`, `LIVEFEED_RECONNECT_BASE_MS`,
    /// `LIVEFEED_RECONNECT_MAX_MS` that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(ms) = parse_var::<u64>(&lookup, "LIVEFEED_HANDSHAKE_TIMEOUT_MS")? {
            options.handshake_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, "LIVEFEED_RECONNECT_MAX_ATTEMPTS")? {
            options.reconnect.max_attempts = attempts;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "LIVEFEED_RECONNECT_BASE_MS")? {
            options.reconnect.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "LIVEFEED_RECONNECT_MAX_MS")? {
            options.reconnect.max_delay = Duration::from_millis(ms);
        }
        Ok(options)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| LiveFeedError::Config(format!("{} has invalid value '{}'", key, raw))),
    }
}

/// Builder for LiveFeedClient that validates configuration
pub struct LiveFeedClientBuilder {
    endpoint: Url,
    options: LiveFeedOptions,
    connector: Option<Arc<dyn Connector>>,
}

impl LiveFeedClientBuilder {
    /// Create a new builder
    pub fn new(endpoint: impl AsRef<str>, options: LiveFeedOptions) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        if !matches!(endpoint.scheme(), "ws" | "wss" | "http" | "https") {
            return Err(LiveFeedError::Config(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }
        options.reconnect.validate()?;
        if options.transports.is_empty() {
            return Err(LiveFeedError::Config(
                "at least one transport is required".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            options,
            connector: None,
        })
    }

    /// Replaces the transport stack built from `options.transports`.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn build(self) -> LiveFeedClient {
        let connector = self
            .connector
            .unwrap_or_else(|| default_connector(&self.options));

        LiveFeedClient {
            endpoint: Arc::new(self.endpoint),
            state: Arc::new(Mutex::new(ClientState::new(self.options.reconnect.clone()))),
            options: Arc::new(self.options),
            connector,
            dispatcher: Arc::new(EventDispatcher::new()),
        }
    }
}

fn default_connector(options: &LiveFeedOptions) -> Arc<dyn Connector> {
    let connectors = options
        .transports
        .iter()
        .map(|kind| -> Arc<dyn Connector> {
            match kind {
                TransportKind::WebSocket => Arc::new(WebSocketConnector),
                TransportKind::Polling => Arc::new(PollingConnector::new(options.poll_interval)),
            }
        })
        .collect();
    Arc::new(FallbackConnector::new(connectors))
}
