//! WebSocket transport.
//!
//! Text frames carry build identifiers. Binary frames are decoded as UTF-8
//! (lossy) so servers that send raw bytes still work. Ping/pong is answered by
//! tungstenite itself; close frames and read errors end the channel.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::transport::{Channel, ChannelError, Transport};

/// Opens reload channels over `ws://` or `wss://`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsTransport;

impl WsTransport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transport for WsTransport {
    type Channel = WsChannel;

    async fn connect(&mut self, url: &str) -> Result<WsChannel, ChannelError> {
        let (stream, _response) = connect_async(url).await.map_err(|e| ChannelError::Connect {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
        tracing::debug!(url, "Reload channel connected");
        Ok(WsChannel { stream })
    }
}

/// A connected WebSocket reload channel.
pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Channel for WsChannel {
    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        self.stream
            .send(Message::text(text.to_owned()))
            .await
            .map_err(|e| ChannelError::Send(e.to_string()))
    }

    async fn next_message(&mut self) -> Option<String> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                Ok(Message::Binary(bytes)) => {
                    return Some(String::from_utf8_lossy(&bytes).into_owned());
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Reload channel closed by server");
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(%err, "Reload channel read failed");
                    return None;
                }
            }
        }
        None
    }
}
