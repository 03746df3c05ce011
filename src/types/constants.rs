/// Requests the client sends to the backend
pub mod outbound {
    pub const MATCHES_SUBSCRIBE: &str = "matches:subscribe";
    pub const MATCHES_UNSUBSCRIBE: &str = "matches:unsubscribe";
    pub const MATCHES_REQUEST: &str = "matches:request";
    pub const QUESTIONS_SUBSCRIBE: &str = "questions:subscribe";
    pub const QUESTIONS_UNSUBSCRIBE: &str = "questions:unsubscribe";
}

/// Push event names the backend emits
pub mod inbound {
    pub const MATCHES_DATA: &str = "matches:data";
    pub const MATCHES_UPDATE: &str = "matches:update";
    pub const MATCHES_LIVE: &str = "matches:live";
    pub const MATCHES_NEW: &str = "matches:new";
    pub const MATCHES_FINISHED: &str = "matches:finished";
    pub const QUESTIONS_GENERATED: &str = "questions:generated";
    pub const QUESTIONS_NEW: &str = "questions:new";
}

/// Event name prefix owned by the match class
pub const MATCH_TOPIC_PREFIX: &str = "matches:";

/// Event name prefix owned by the question class
pub const QUESTION_TOPIC_PREFIX: &str = "questions:";

/// Subscription topic id for the live match feed
pub const LIVE_MATCHES_TOPIC: &str = "live-matches";

/// Payload field carrying the server-side origin time (epoch milliseconds)
pub const ORIGIN_TIMESTAMP_FIELD: &str = "timestamp";

/// Handshake timeout (milliseconds)
pub const DEFAULT_HANDSHAKE_TIMEOUT: u64 = 20_000;

/// Reconnect backoff defaults (milliseconds)
pub const DEFAULT_RECONNECT_BASE_DELAY: u64 = 1_000;
pub const DEFAULT_RECONNECT_MAX_DELAY: u64 = 30_000;
pub const DEFAULT_RECONNECT_JITTER: u64 = 1_000;
pub const DEFAULT_RECONNECT_GROWTH_FACTOR: f64 = 2.0;
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 10;

/// Interval between empty long-poll requests (milliseconds)
pub const DEFAULT_POLL_INTERVAL: u64 = 1_000;

/// Transport names, in default preference order
pub const TRANSPORT_WEBSOCKET: &str = "websocket";
pub const TRANSPORT_POLLING: &str = "polling";
