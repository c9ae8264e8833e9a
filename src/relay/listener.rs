use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::relay::{SseDecoder, StatusEvent, StatusRelay};
use crate::shutdown::ShutdownHandle;

const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Reads one planner's status stream and feeds it to the relay.
///
/// The planner id is fixed at construction, so every event this listener
/// produces is attributed to that planner regardless of stream content.
pub struct StatusListener {
    planner: String,
    status_source: String,
    relay: StatusRelay,
    client: Client,
    reconnect_delay: Duration,
}

impl StatusListener {
    pub fn new(
        planner: impl Into<String>,
        status_source: impl Into<String>,
        relay: StatusRelay,
    ) -> Self {
        Self {
            planner: planner.into(),
            status_source: status_source.into(),
            relay,
            client: Client::new(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Use `client` for the stream. It must not carry a total request
    /// timeout, which would cut the stream off.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn planner(&self) -> &str {
        &self.planner
    }

    /// Hand one payload from this planner to the relay.
    pub fn handle(&self, payload: impl Into<String>) -> bool {
        self.relay
            .relay(StatusEvent::new(self.planner.clone(), payload))
    }

    /// Follow the status stream until shutdown, reconnecting after every
    /// disconnect.
    pub async fn run(self, shutdown: ShutdownHandle) {
        while !shutdown.is_shutting_down() {
            tokio::select! {
                result = self.follow() => {
                    match result {
                        Ok(()) => tracing::warn!(
                            planner = %self.planner,
                            source = %self.status_source,
                            "Status stream ended"
                        ),
                        Err(err) => tracing::warn!(
                            planner = %self.planner,
                            source = %self.status_source,
                            error = %err,
                            "Status stream failed"
                        ),
                    }
                }
                _ = shutdown.wait() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {},
                _ = shutdown.wait() => break,
            }
        }
        tracing::debug!(planner = %self.planner, "Status listener stopped");
    }

    async fn follow(&self) -> Result<(), reqwest::Error> {
        let mut response = self
            .client
            .get(&self.status_source)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(planner = %self.planner, source = %self.status_source, "Status stream connected");

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = response.chunk().await? {
            for payload in decoder.feed(&chunk) {
                self.handle(payload);
            }
        }
        Ok(())
    }
}
