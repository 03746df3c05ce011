use thiserror::Error;

/// Errors produced by the live feed client and its REST companion.
#[derive(Error, Debug)]
pub enum LiveFeedError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error (polling transport and REST calls)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The backend answered with `success: false` or an unexpected status
    #[error("API error: {0}")]
    Api(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connect handshake did not complete in time
    #[error("Timeout error")]
    Timeout,

    /// Attempted to send while not connected to the server
    #[error("Not connected")]
    NotConnected,

    /// The connection was closed (by the peer or by an explicit disconnect)
    #[error("Connection closed")]
    Closed,
}

/// Convenience type alias for `Result<T, LiveFeedError>`.
pub type Result<T> = std::result::Result<T, LiveFeedError>;
