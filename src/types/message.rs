use super::error::{LiveFeedError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message on the persistent connection, in either direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Response envelope shared by the REST API and the polling transport:
/// `{success, data}` on success, `{success, message}` on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps `data`, turning `success: false` into [`LiveFeedError::Api`].
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(LiveFeedError::Api(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| LiveFeedError::Api("response is missing `data`".to_string()))
    }

    /// Checks `success` only; used for endpoints that acknowledge with a message.
    pub fn into_ack(self) -> Result<Option<String>> {
        if self.success {
            Ok(self.message)
        } else {
            Err(LiveFeedError::Api(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ))
        }
    }
}
