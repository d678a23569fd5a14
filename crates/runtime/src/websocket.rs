//! WebSocket transport for the chat channel.
//!
//! Outbound frames go through an unbounded queue drained by a writer task, so
//! [`WebSocketChannel::send_text`] never blocks. Inbound text frames are
//! exposed as a stream for the receive path.

use std::future;
use std::pin::Pin;

use anyhow::Context;
use futures_util::{SinkExt, Stream, StreamExt};
use imagechat_config::ChannelConfig;
use imagechat_messages::{ChannelError, MessageChannel};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

/// Inbound text frames, ending when the socket closes or fails
pub type FrameStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// [`MessageChannel`] backed by a WebSocket writer task
#[derive(Debug, Clone)]
pub struct WebSocketChannel {
    outbound: mpsc::UnboundedSender<String>,
}

impl MessageChannel for WebSocketChannel {
    fn send_text(&self, frame: String) -> Result<(), ChannelError> {
        self.outbound.send_text(frame)
    }
}

/// An open WebSocket split into its send primitive and inbound frames
pub struct ClientSession {
    channel: WebSocketChannel,
    frames: FrameStream,
    writer: JoinHandle<()>,
}

impl ClientSession {
    /// Open the socket named by `config.url`
    pub async fn connect(config: &ChannelConfig) -> anyhow::Result<Self> {
        let (socket, response) = tokio_tungstenite::connect_async(config.url.as_str())
            .await
            .with_context(|| format!("failed to connect to {}", config.url))?;

        info!(url = %config.url, status = %response.status(), "chat channel connected");
        Ok(Self::from_socket(socket))
    }

    /// Wrap a socket that is already open
    pub fn from_socket<S>(socket: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sink, stream) = socket.split();
        let (outbound, mut queue) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            while let Some(frame) = queue.recv().await {
                debug!(bytes = frame.len(), "writing frame");
                if let Err(error) = sink.send(Message::Text(frame)).await {
                    warn!(%error, "websocket write failed");
                    return;
                }
            }
            if let Err(error) = sink.close().await {
                debug!(%error, "websocket close failed");
            }
        });

        Self {
            channel: WebSocketChannel { outbound },
            frames: Box::pin(text_frames(stream)),
            writer,
        }
    }

    pub fn channel(&self) -> WebSocketChannel {
        self.channel.clone()
    }

    /// Split into the send primitive, inbound frames and the writer task.
    ///
    /// The writer drains queued frames and closes the socket once every
    /// channel clone is dropped; await it to make sure nothing is lost.
    pub fn into_parts(self) -> (WebSocketChannel, FrameStream, JoinHandle<()>) {
        (self.channel, self.frames, self.writer)
    }
}

/// Keep text payloads, drop control and binary frames, stop at close or error
pub fn text_frames<S>(messages: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>,
{
    messages
        .take_while(|message| {
            let open = match message {
                Ok(Message::Close(frame)) => {
                    info!(?frame, "chat channel closed by peer");
                    false
                }
                Err(error) => {
                    warn!(%error, "chat channel read failed");
                    false
                }
                Ok(_) => true,
            };
            future::ready(open)
        })
        .filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(text),
                _ => None,
            })
        })
}
