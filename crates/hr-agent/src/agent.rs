//! The reload agent.
//!
//! Keeps one reload channel open to the development server, remembers the
//! first build identifier it receives and reloads once a later identifier
//! differs. Lost or refused connections are retried forever with
//! [`Backoff`].
//!
//! ```text
//! Disconnected ──► Connecting ──► Connected ──► Disconnected ──► …
//!                                     │
//!                                     └──► Reloading (terminal)
//! ```

use std::time::Duration;

use crate::backoff::{Backoff, DEFAULT_CEILING, DEFAULT_FLOOR};
use crate::detector::{ChangeDetector, IdentifierChange, Observation};
use crate::endpoint::{DEFAULT_RELOAD_PATH, EndpointError, resolve_reload_url};
use crate::reloader::Reloader;
use crate::scheduler::Scheduler;
use crate::transport::{Channel, Transport};

/// Message sent after every successful connect. Servers ignore its content.
pub const DEFAULT_GREETING: &str = "Hello";

/// Agent settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Reconnect delay after a successful open.
    pub floor: Duration,
    /// Upper bound for the reconnect delay.
    pub ceiling: Duration,
    /// Text sent once per connection.
    pub greeting: String,
    /// Path of the reload socket on the page's host.
    pub path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            ceiling: DEFAULT_CEILING,
            greeting: DEFAULT_GREETING.to_owned(),
            path: DEFAULT_RELOAD_PATH.to_owned(),
        }
    }
}

/// Connection state of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentState {
    Disconnected,
    Connecting,
    Connected,
    /// A changed identifier was seen. Terminal.
    Reloading,
}

/// Watches a reload endpoint and reloads when the build identifier changes.
pub struct ReloadAgent<T, S, R> {
    url: String,
    greeting: String,
    backoff: Backoff,
    detector: ChangeDetector,
    state: AgentState,
    reloaded: Option<IdentifierChange>,
    transport: T,
    scheduler: S,
    reloader: R,
}

impl<T, S, R> ReloadAgent<T, S, R>
where
    T: Transport,
    S: Scheduler,
    R: Reloader,
{
    /// Create an agent for an already resolved socket URL.
    ///
    /// `config.path` is not used here; the URL is taken as is.
    pub fn new(
        url: impl Into<String>,
        config: AgentConfig,
        transport: T,
        scheduler: S,
        reloader: R,
    ) -> Self {
        Self {
            url: url.into(),
            greeting: config.greeting,
            backoff: Backoff::new(config.floor, config.ceiling),
            detector: ChangeDetector::new(),
            state: AgentState::Disconnected,
            reloaded: None,
            transport,
            scheduler,
            reloader,
        }
    }

    /// Create an agent for the page at `page_url`.
    ///
    /// The socket URL is derived from the page: same host and port, `ws` or
    /// `wss` depending on the page scheme, and `config.path`.
    pub fn for_page(
        page_url: &str,
        config: AgentConfig,
        transport: T,
        scheduler: S,
        reloader: R,
    ) -> Result<Self, EndpointError> {
        let url = resolve_reload_url(page_url, &config.path)?;
        Ok(Self::new(url, config, transport, scheduler, reloader))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&str> {
        self.detector.baseline()
    }

    /// Delay the next retry would wait.
    #[must_use]
    pub fn current_delay(&self) -> Duration {
        self.backoff.current()
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Connect and keep reconnecting until the build identifier changes.
    ///
    /// Calls the reloader once and returns the change that triggered it.
    /// Calling `run` again after a reload returns the same change without
    /// reconnecting or reloading again.
    ///
    /// # Errors
    ///
    /// Only the reloader can fail; channel failures are retried.
    pub async fn run(&mut self) -> Result<IdentifierChange, R::Error> {
        if let Some(change) = &self.reloaded {
            return Ok(change.clone());
        }

        self.backoff.reset();
        loop {
            if let Some(change) = self.attempt().await {
                return self.reload(change).await;
            }
            self.wait_before_retry().await;
        }
    }

    /// Open one channel and follow it until it closes or the identifier changes.
    ///
    /// Returns the change if one was observed. A change is not acted upon here;
    /// [`run`](Self::run) passes it to the reloader.
    pub async fn attempt(&mut self) -> Option<IdentifierChange> {
        self.state = AgentState::Connecting;
        tracing::debug!(url = %self.url, "Connecting to reload endpoint");

        let change = match self.transport.connect(&self.url).await {
            Ok(mut channel) => self.follow(&mut channel).await,
            Err(err) => {
                tracing::debug!(%err, "Reload channel unavailable");
                None
            }
        };

        if change.is_none() {
            self.state = AgentState::Disconnected;
        }
        change
    }

    /// Sleep for the current backoff delay and double it for next time.
    ///
    /// Returns the delay that was waited.
    pub async fn wait_before_retry(&mut self) -> Duration {
        let delay = self.backoff.next_delay();
        tracing::debug!(delay_ms = delay.as_millis(), "Retrying reload channel");
        self.scheduler.sleep(delay).await;
        delay
    }

    async fn follow(&mut self, channel: &mut T::Channel) -> Option<IdentifierChange> {
        self.state = AgentState::Connected;
        self.backoff.reset();

        if let Err(err) = channel.send(&self.greeting).await {
            tracing::debug!(%err, "Greeting failed");
            return None;
        }

        while let Some(identifier) = channel.next_message().await {
            match self.detector.observe(&identifier) {
                Observation::Baseline => {
                    tracing::debug!(%identifier, "Recorded baseline build identifier");
                }
                Observation::Changed(change) => return Some(change),
                Observation::Unchanged | Observation::Ignored => {}
            }
        }

        tracing::debug!("Reload channel closed");
        None
    }

    async fn reload(&mut self, change: IdentifierChange) -> Result<IdentifierChange, R::Error> {
        self.state = AgentState::Reloading;
        tracing::info!(
            baseline = %change.baseline,
            observed = %change.observed,
            "Server changed, reloading"
        );
        self.reloader.reload(&change).await?;
        self.reloaded = Some(change.clone());
        Ok(change)
    }
}
