use super::connection::{ConnectionState, ConnectionTasks, Outbound};
use super::subscriptions::SubscriptionRegistry;
use crate::infrastructure::{ReconnectConfig, ReconnectPolicy};
use crate::types::{Frame, LiveFeedError, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Consolidated mutable state for LiveFeedClient.
///
/// Guarded by one std mutex that is never held across an await.
pub(crate) struct ClientState {
    pub connection: ConnectionState,

    /// Attempt counter and backoff
    pub policy: ReconnectPolicy,

    /// Set by `disconnect()`, cleared by `connect()`; suppresses reconnects
    pub explicit_close: bool,

    /// Identifies the current connect attempt / live connection; anything
    /// carrying an older value is stale and ignored
    pub session: u64,

    /// Most recent successful connect
    pub connected_at: Option<Instant>,

    /// Queue into the writer task while connected
    pub writer: Option<mpsc::UnboundedSender<Outbound>>,

    pub tasks: ConnectionTasks,

    /// The single pending reconnect, if any
    pub reconnect_task: Option<JoinHandle<()>>,

    pub subscriptions: SubscriptionRegistry,

    state_tx: watch::Sender<ConnectionState>,
}

impl ClientState {
    pub fn new(reconnect: ReconnectConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connection: ConnectionState::Disconnected,
            policy: ReconnectPolicy::new(reconnect),
            explicit_close: false,
            session: 0,
            connected_at: None,
            writer: None,
            tasks: ConnectionTasks::default(),
            reconnect_task: None,
            subscriptions: SubscriptionRegistry::new(),
            state_tx,
        }
    }

    /// Updates the connection state and notifies watchers
    pub fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
        self.state_tx.send_replace(state);
    }

    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected && self.writer.is_some()
    }

    /// Queues a frame on the live connection; fails locally when there is none.
    pub fn send(&self, frame: Frame) -> Result<()> {
        if self.connection != ConnectionState::Connected {
            return Err(LiveFeedError::NotConnected);
        }
        let writer = self.writer.as_ref().ok_or(LiveFeedError::NotConnected)?;
        writer
            .send(Outbound::Frame(frame))
            .map_err(|_| LiveFeedError::Closed)
    }

    /// Forgets the live connection and closes the writer queue.
    ///
    /// With `stop_tasks` the transport is also closed and the reader stopped.
    /// Without it the reader is the caller and is already finishing.
    pub fn release_connection(&mut self, stop_tasks: bool) {
        let writer = self.writer.take();
        let mut tasks = std::mem::take(&mut self.tasks);
        if stop_tasks {
            if let Some(writer) = writer {
                let _ = writer.send(Outbound::Close);
            }
            tasks.shutdown();
        }
    }

    pub fn cancel_reconnect(&mut self) -> bool {
        match self.reconnect_task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}
