//! Duplex channel abstraction.
//!
//! The agent only needs three things from the transport: open a channel to a
//! URL, send text on it, and receive text until it closes. [`WsTransport`]
//! provides them over WebSocket; tests script them in memory.
//!
//! [`WsTransport`]: crate::WsTransport

use std::future::Future;

/// The reload channel is unavailable.
///
/// Covers failed connects, failed sends and unexpected closes alike. The agent
/// does not distinguish between them; every variant leads to a retry.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("Failed to send on reload channel: {0}")]
    Send(String),
    #[error("Reload channel closed")]
    Closed,
}

/// Opens reload channels.
pub trait Transport {
    type Channel: Channel;

    /// Open a new channel to `url`.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<Self::Channel, ChannelError>>;
}

/// One live duplex channel.
pub trait Channel {
    /// Send one text message.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), ChannelError>>;

    /// Wait for the next text message.
    ///
    /// Returns `None` once the channel is closed, for whatever reason.
    fn next_message(&mut self) -> impl Future<Output = Option<String>>;
}
