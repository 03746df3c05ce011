//! # Cricket Livefeed
//!
//! Realtime client for a live cricket match and question feed: one persistent
//! push connection with backoff-based reconnection, per-class event fan-out,
//! latency tracking, and a REST companion for the same backend.
//!
//! ## Example
//!
//! ```no_run
//! use cricket_livefeed::{EventClass, LiveBoard, LiveFeedClient, LiveFeedOptions, Subscription};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiveFeedClient::new("wss://feed.example.com/socket", LiveFeedOptions::default())?;
//!     let mut updates = client.on_any();
//!
//!     client.connect().await?;
//!     client.subscribe(Subscription::LiveMatches);
//!
//!     let mut board = LiveBoard::new();
//!     while let Some(notification) = updates.recv().await {
//!         if board.apply(&notification) {
//!             println!("{} matches on the board", board.matches().len());
//!         }
//!         if notification.class == EventClass::Generic {
//!             println!("server says: {}", notification.data);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod feed;
pub mod infrastructure;
pub mod messaging;
pub mod stats;
pub mod transport;
pub mod types;

pub use api::ApiClient;
pub use client::{
    ConnectionState, LiveFeedClient, LiveFeedClientBuilder, LiveFeedOptions, Subscription,
    TransportKind,
};
pub use feed::{LiveBoard, Match, Question};
pub use infrastructure::ReconnectConfig;
pub use messaging::{EventClass, EventDispatcher, Notification, PushEvent};
pub use stats::StatsSnapshot;
pub use transport::{Connection, Connector, MemoryConnector};
pub use types::{Frame, LiveFeedError, Result};
