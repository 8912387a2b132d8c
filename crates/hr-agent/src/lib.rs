//! Reload agent for development servers.
//!
//! The agent keeps a socket open to a development server's reload endpoint.
//! The server answers with its build identifier; the first identifier becomes
//! the baseline and any later, different identifier triggers a reload.
//!
//! # Architecture
//!
//! ```text
//! ReloadAgent ──► Transport (WsTransport) ──► ws[s]://host:port/ws/reload
//!      │
//!      ├─► ChangeDetector (baseline vs. received identifier)
//!      ├─► Backoff + Scheduler (retry delay, floor..ceiling)
//!      └─► Reloader (terminal action)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hr_agent::{AgentConfig, ReloadAgent, TokioScheduler, WsTransport};
//!
//! let mut agent = ReloadAgent::for_page(
//!     "http://localhost:3000/",
//!     AgentConfig::default(),
//!     WsTransport::new(),
//!     TokioScheduler,
//!     |change: &hr_agent::IdentifierChange| {
//!         tracing::info!(%change, "reload");
//!         Ok::<(), std::convert::Infallible>(())
//!     },
//! )?;
//! agent.run().await?;
//! ```

mod agent;
mod backoff;
mod detector;
mod endpoint;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod reloader;
mod scheduler;
mod transport;
mod ws;

pub use agent::{AgentConfig, AgentState, DEFAULT_GREETING, ReloadAgent};
pub use backoff::{Backoff, DEFAULT_CEILING, DEFAULT_FLOOR};
pub use detector::{ChangeDetector, IdentifierChange, Observation};
pub use endpoint::{DEFAULT_RELOAD_PATH, EndpointError, PageLocation, Scheme, resolve_reload_url};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockChannel, MockTransport, RecordingScheduler};
pub use reloader::Reloader;
pub use scheduler::{Scheduler, TokioScheduler};
pub use transport::{Channel, ChannelError, Transport};
pub use ws::{WsChannel, WsTransport};
