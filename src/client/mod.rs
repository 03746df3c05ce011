// Module declarations
mod builder;
mod connection;
mod core;
mod state;
mod subscriptions;

// Public API exports
pub use builder::{LiveFeedClientBuilder, LiveFeedOptions, TransportKind};
pub use connection::ConnectionState;
pub use self::core::LiveFeedClient;
pub(crate) use state::ClientState;
pub use subscriptions::{Subscription, SubscriptionRegistry};
