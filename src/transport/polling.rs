use super::{Connection, Connector};
use crate::infrastructure::http_base;
use crate::types::constants::{DEFAULT_POLL_INTERVAL, TRANSPORT_POLLING};
use crate::types::{Envelope, Frame, LiveFeedError, Result};
use futures::future::BoxFuture;
use futures::{StreamExt, sink, stream};
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct PollSession {
    sid: String,
}

/// HTTP long-polling fallback.
///
/// Opens a session with `GET /poll/open`, receives with `GET /poll/{sid}`
/// and sends with `POST /poll/{sid}`, all wrapped in the `{success, data}` envelope.
#[derive(Debug, Clone)]
pub struct PollingConnector {
    http: reqwest::Client,
    poll_interval: Duration,
}

impl PollingConnector {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            poll_interval,
        }
    }
}

impl Default for PollingConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL))
    }
}

struct PollState {
    http: reqwest::Client,
    url: Url,
    interval: Duration,
    buffered: VecDeque<Frame>,
    failed: bool,
}

impl PollState {
    async fn fetch(&self) -> Result<Vec<Frame>> {
        let response = self.http.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(LiveFeedError::Connection(format!(
                "poll request failed with status: {}",
                response.status()
            )));
        }
        let envelope: Envelope<Vec<Frame>> = response.json().await?;
        envelope.into_result()
    }
}

impl Connector for PollingConnector {
    fn connect<'a>(&'a self, endpoint: &'a Url) -> BoxFuture<'a, Result<Connection>> {
        Box::pin(async move {
            let base = http_base(endpoint)?;
            let open_url = base.join("poll/open")?;
            tracing::debug!("Opening polling session at {}", open_url);

            let response = self.http.get(open_url).send().await?;
            if !response.status().is_success() {
                return Err(LiveFeedError::Connection(format!(
                    "polling handshake failed with status: {}",
                    response.status()
                )));
            }
            let session = response.json::<Envelope<PollSession>>().await?.into_result()?;
            let session_url = base.join(&format!("poll/{}", session.sid))?;

            let state = PollState {
                http: self.http.clone(),
                url: session_url.clone(),
                interval: self.poll_interval,
                buffered: VecDeque::new(),
                failed: false,
            };

            let inbound = stream::unfold(state, |mut state| async move {
                if state.failed {
                    return None;
                }
                loop {
                    if let Some(frame) = state.buffered.pop_front() {
                        return Some((Ok(frame), state));
                    }
                    match state.fetch().await {
                        Ok(frames) if frames.is_empty() => {
                            tokio::time::sleep(state.interval).await;
                        }
                        Ok(frames) => state.buffered.extend(frames),
                        Err(e) => {
                            state.failed = true;
                            return Some((Err(e), state));
                        }
                    }
                }
            });

            let outbound = sink::unfold(
                (self.http.clone(), session_url),
                |(http, url), frame: Frame| async move {
                    let response = http.post(url.clone()).json(&frame).send().await?;
                    if !response.status().is_success() {
                        return Err(LiveFeedError::Connection(format!(
                            "poll send of '{}' failed with status: {}",
                            frame.event,
                            response.status()
                        )));
                    }
                    Ok::<_, LiveFeedError>((http, url))
                },
            );

            tracing::debug!("Polling session {} established", session.sid);
            Ok(Connection {
                transport: TRANSPORT_POLLING,
                sink: Box::pin(outbound),
                stream: inbound.boxed(),
            })
        })
    }

    fn name(&self) -> &'static str {
        TRANSPORT_POLLING
    }
}
