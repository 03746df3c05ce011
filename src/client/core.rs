use super::connection::{ConnectionTasks, write_loop};
use super::{
    ClientState, ConnectionState, LiveFeedClientBuilder, LiveFeedOptions, Subscription,
};
use crate::infrastructure::lock;
use crate::messaging::{EventClass, EventDispatcher, Notification};
use crate::stats::StatsSnapshot;
use crate::transport::{Connection, Connector, FrameStream};
use crate::types::constants::outbound;
use crate::types::{Frame, LiveFeedError, Result};
use futures::StreamExt;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep, timeout};
use url::Url;

/// Realtime client for the live match and question feed.
///
/// `LiveFeedClient` owns one persistent connection to the backend push
/// endpoint, reconnects with exponential backoff after involuntary drops,
/// re-issues every active subscription after each reconnect, and republishes
/// inbound pushes to local listeners registered with [`on`](Self::on).
///
/// The handle is cheap to clone; clones share the same connection.
///
/// # Example
///
/// ```no_run
/// use cricket_livefeed::{EventClass, LiveFeedClient, LiveFeedOptions, Subscription};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LiveFeedClient::new("wss://feed.example.com/socket", LiveFeedOptions::default())?;
/// let mut questions = client.on(EventClass::Question);
///
/// client.connect().await?;
/// client.subscribe(Subscription::LiveMatches);
/// client.select_match("m1");
///
/// while let Some(notification) = questions.recv().await {
///     println!("{} ({:?} ms)", notification.event_type, notification.latency);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LiveFeedClient {
    pub(crate) endpoint: Arc<Url>,
    pub(crate) options: Arc<LiveFeedOptions>,
    pub(crate) connector: Arc<dyn Connector>,

    // Consolidated mutable state
    pub(crate) state: Arc<Mutex<ClientState>>,

    pub(crate) dispatcher: Arc<EventDispatcher>,
}

impl LiveFeedClient {
    /// Creates a client with the default transport stack (WebSocket, then polling).
    ///
    /// No connection is made until [`connect()`](Self::connect) is called.
    ///
    /// # Errors
    ///
    /// Returns [`LiveFeedError::UrlParse`] or [`LiveFeedError::Config`] for a bad
    /// endpoint or invalid options.
    pub fn new(endpoint: impl AsRef<str>, options: LiveFeedOptions) -> Result<Self> {
        LiveFeedClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    /// Starts a builder, for swapping the transport stack.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn builder(
        endpoint: impl AsRef<str>,
        options: LiveFeedOptions,
    ) -> Result<LiveFeedClientBuilder> {
        LiveFeedClientBuilder::new(endpoint, options)
    }

    fn lock_state(&self) -> MutexGuard<'_, ClientState> {
        lock(&self.state)
    }

    /// Opens the connection.
    ///
    /// Resolves once the handshake succeeds; every entry in the subscription
    /// set is re-sent before any other command. On failure the error is
    /// returned and a reconnect is scheduled per the backoff policy. Calling
    /// this while already connected is a no-op; calling it while a handshake
    /// is in flight waits for that handshake.
    ///
    /// Cancels any pending reconnect and clears a previous explicit disconnect.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut state = self.lock_state();
            state.explicit_close = false;
            if state.cancel_reconnect() {
                tracing::debug!("Pending reconnect superseded by explicit connect");
            }
        }
        self.attempt_connect().await
    }

    async fn attempt_connect(&self) -> Result<()> {
        let (session, in_flight) = {
            let mut state = self.lock_state();
            match state.connection {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => (state.session, Some(state.watch())),
                ConnectionState::Disconnected => {
                    state.session += 1;
                    state.set_connection(ConnectionState::Connecting);
                    (state.session, None)
                }
            }
        };

        if let Some(rx) = in_flight {
            return Self::wait_for_handshake(rx).await;
        }

        tracing::info!(
            "Connecting to {} (session {}, attempt {})",
            self.endpoint,
            session,
            self.reconnect_attempts()
        );

        let outcome = match timeout(
            self.options.handshake_timeout,
            self.connector.connect(&self.endpoint),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LiveFeedError::Timeout),
        };

        match outcome {
            Ok(connection) => self.on_connected(session, connection),
            Err(e) => {
                self.on_connect_failed(session, &e);
                Err(e)
            }
        }
    }

    async fn wait_for_handshake(mut rx: watch::Receiver<ConnectionState>) -> Result<()> {
        let settled = rx
            .wait_for(|state| *state != ConnectionState::Connecting)
            .await
            .map(|state| *state)
            .map_err(|_| LiveFeedError::Closed)?;
        match settled {
            ConnectionState::Connected => Ok(()),
            _ => Err(LiveFeedError::Connection(
                "concurrent connection attempt failed".to_string(),
            )),
        }
    }

    fn on_connected(&self, session: u64, connection: Connection) -> Result<()> {
        let mut state = self.lock_state();
        if state.session != session || state.explicit_close {
            tracing::debug!("Discarding connection for superseded session {}", session);
            return Err(LiveFeedError::Closed);
        }

        let Connection {
            transport,
            sink,
            stream,
        } = connection;

        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn({
            let client = self.clone();
            async move {
                // A failed send leaves the reader running on a dead connection
                if let Err(e) = write_loop(writer_rx, sink).await {
                    tracing::warn!("Transport write error: {}", e);
                    client.handle_transport_closed(session, true);
                }
            }
        });
        let reader = tokio::spawn(self.clone().read_loop(stream, session));

        state.writer = Some(writer_tx);
        state.tasks = ConnectionTasks::new(reader, writer);
        state.policy.reset();
        state.connected_at = Some(Instant::now());
        state.set_connection(ConnectionState::Connected);

        // Subscriptions do not survive a dropped connection server-side.
        let resubscribe: Vec<Frame> = state
            .subscriptions
            .iter()
            .map(Subscription::subscribe_frame)
            .collect();
        let count = resubscribe.len();
        for frame in resubscribe {
            state.send(frame)?;
        }

        tracing::info!(
            "Connected via {} (session {}), re-subscribed {} topic(s)",
            transport,
            session,
            count
        );
        Ok(())
    }

    fn on_connect_failed(&self, session: u64, error: &LiveFeedError) {
        let mut state = self.lock_state();
        if state.session != session {
            return;
        }
        tracing::error!("Connection attempt failed: {}", error);
        if state.connection == ConnectionState::Connecting {
            state.set_connection(ConnectionState::Disconnected);
        }
        if !state.explicit_close {
            self.schedule_reconnect(&mut state);
        }
    }

    async fn read_loop(self, mut stream: FrameStream, session: u64) {
        tracing::debug!("Starting read task for session {}", session);
        while let Some(item) = stream.next().await {
            match item {
                Ok(frame) => {
                    self.dispatcher.dispatch(frame);
                }
                Err(e) => {
                    tracing::warn!("Transport read error: {}", e);
                    break;
                }
            }
        }
        self.handle_transport_closed(session, false);
        tracing::debug!("Read task for session {} finished", session);
    }

    /// Treats the live connection as lost. `stop_reader` is set when the
    /// writer noticed first and the reader is still running.
    fn handle_transport_closed(&self, session: u64, stop_reader: bool) {
        let mut state = self.lock_state();
        if state.session != session || state.connection != ConnectionState::Connected {
            return;
        }
        tracing::warn!("Connection lost (session {})", session);
        state.release_connection(stop_reader);
        state.set_connection(ConnectionState::Disconnected);
        if !state.explicit_close {
            self.schedule_reconnect(&mut state);
        }
    }

    /// Arms the single reconnect timer, unless one is pending or the attempt
    /// budget is spent.
    fn schedule_reconnect(&self, state: &mut ClientState) {
        if state.reconnect_task.is_some() {
            tracing::debug!("Reconnect already pending");
            return;
        }
        let Some(delay) = state.policy.next_delay() else {
            tracing::warn!(
                "Giving up after {} reconnect attempts; staying disconnected",
                state.policy.attempts()
            );
            return;
        };
        tracing::info!(
            "Reconnect attempt {}/{} in {:?}",
            state.policy.attempts(),
            state.policy.max_attempts(),
            delay
        );

        let client = self.clone();
        state.reconnect_task = Some(tokio::spawn(async move {
            sleep(delay).await;
            {
                let mut state = client.lock_state();
                state.reconnect_task = None;
                if state.explicit_close || state.connection != ConnectionState::Disconnected {
                    return;
                }
            }
            if let Err(e) = client.attempt_connect().await {
                tracing::debug!("Reconnect attempt did not succeed: {}", e);
            }
        }));
    }

    /// Closes the connection on request. Never triggers a reconnect; any
    /// pending reconnect is cancelled. Idempotent.
    pub fn disconnect(&self) {
        let mut state = self.lock_state();
        let was_active = state.connection != ConnectionState::Disconnected;
        state.explicit_close = true;
        state.cancel_reconnect();
        state.session += 1;
        state.release_connection(true);
        if was_active {
            state.set_connection(ConnectionState::Disconnected);
            tracing::info!("Disconnected from {}", self.endpoint);
        }
    }

    /// Sends a request. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Fails locally with [`LiveFeedError::NotConnected`] when there is no live
    /// connection, or [`LiveFeedError::Closed`] if it has just gone away.
    pub fn emit(&self, event: impl Into<String>, payload: Value) -> Result<()> {
        self.lock_state().send(Frame::new(event, payload))
    }

    /// Asks the server for a fresh live-match listing (`matches:request`).
    pub fn request_matches(&self) -> Result<()> {
        self.emit(outbound::MATCHES_REQUEST, serde_json::json!({}))
    }

    /// Adds a subscription. Returns `true` if the request went out now;
    /// `false` means it is deferred until the next successful connect.
    pub fn subscribe(&self, subscription: Subscription) -> bool {
        let mut state = self.lock_state();
        state.subscriptions.insert(subscription.clone());
        Self::send_now(&state, subscription.subscribe_frame(), &subscription)
    }

    /// Removes a subscription. Returns `true` if an unsubscribe request went
    /// out now. Removing an absent entry is a no-op.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut state = self.lock_state();
        if !state.subscriptions.remove(&subscription) {
            return false;
        }
        Self::send_now(&state, subscription.unsubscribe_frame(), &subscription)
    }

    /// Switches the question feed to `match_id`, unsubscribing the previously
    /// selected match first. Returns whether the new subscribe went out now.
    pub fn select_match(&self, match_id: impl Into<String>) -> bool {
        let match_id = match_id.into();
        let mut state = self.lock_state();
        let previous = state.subscriptions.selected_match().map(str::to_string);

        if previous.as_deref() == Some(match_id.as_str()) {
            return false;
        }
        if let Some(previous) = previous {
            let stale = Subscription::questions(previous);
            if state.subscriptions.remove(&stale) {
                Self::send_now(&state, stale.unsubscribe_frame(), &stale);
            }
        }

        let next = Subscription::questions(match_id.clone());
        state.subscriptions.insert(next.clone());
        state.subscriptions.set_selected_match(Some(match_id));
        Self::send_now(&state, next.subscribe_frame(), &next)
    }

    /// Drops the selected match's question subscription, if any.
    pub fn clear_selection(&self) -> bool {
        let selected = self.lock_state().subscriptions.selected_match().map(str::to_string);
        match selected {
            Some(match_id) => self.unsubscribe(Subscription::questions(match_id)),
            None => false,
        }
    }

    fn send_now(state: &ClientState, frame: Frame, subscription: &Subscription) -> bool {
        if !state.is_connected() {
            tracing::debug!("Deferring '{}' for {} until connected", frame.event, subscription);
            return false;
        }
        match state.send(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not send request for {}: {}", subscription, e);
                false
            }
        }
    }

    /// Active subscriptions in the order they were added.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock_state().subscriptions.iter().cloned().collect()
    }

    /// Match whose question feed is currently selected.
    pub fn selected_match(&self) -> Option<String> {
        self.lock_state()
            .subscriptions
            .selected_match()
            .map(str::to_string)
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.lock_state().connection
    }

    /// `true` only while a live connection can accept sends.
    pub fn is_connected(&self) -> bool {
        self.lock_state().is_connected()
    }

    /// Receiver that observes every connection state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.lock_state().watch()
    }

    /// Reconnect attempts made since the last successful connect.
    pub fn reconnect_attempts(&self) -> u32 {
        self.lock_state().policy.attempts()
    }

    /// Whether a reconnect timer is armed.
    pub fn reconnect_pending(&self) -> bool {
        self.lock_state().reconnect_task.is_some()
    }

    /// Registers a listener for one notification class.
    pub fn on(&self, class: EventClass) -> mpsc::UnboundedReceiver<Notification> {
        self.dispatcher.on(class)
    }

    /// Registers a listener for every notification class.
    pub fn on_any(&self) -> mpsc::UnboundedReceiver<Notification> {
        self.dispatcher.on_any()
    }

    /// Connection health, computed now.
    pub fn stats(&self) -> StatsSnapshot {
        let (is_connected, connected_at) = {
            let state = self.lock_state();
            (state.is_connected(), state.connected_at)
        };
        self.dispatcher
            .snapshot(is_connected, connected_at, Instant::now())
    }

    /// Every latency sample recorded so far, in milliseconds.
    pub fn latency_samples(&self) -> Vec<i64> {
        self.dispatcher.latency_samples()
    }

    /// Push endpoint this client connects to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
