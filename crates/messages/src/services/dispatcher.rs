//! Receive path: route incoming events to rendering or error reporting.

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::types::{ImageDelivered, IncomingChatEvent};

/// UI callbacks for the receive path
#[cfg_attr(test, mockall::automock)]
pub trait ChatEventHandler: Send + Sync {
    /// A stored image is ready to show
    fn render_image(&self, delivered: &ImageDelivered);

    /// The server reported an error
    fn report_error(&self, message: &str);
}

/// Closure-backed [`ChatEventHandler`]
pub struct CallbackHandler<R, E> {
    render: R,
    error: E,
}

impl<R, E> CallbackHandler<R, E>
where
    R: Fn(&ImageDelivered) + Send + Sync,
    E: Fn(&str) + Send + Sync,
{
    pub fn new(render: R, error: E) -> Self {
        Self { render, error }
    }
}

impl<R, E> ChatEventHandler for CallbackHandler<R, E>
where
    R: Fn(&ImageDelivered) + Send + Sync,
    E: Fn(&str) + Send + Sync,
{
    fn render_image(&self, delivered: &ImageDelivered) {
        (self.render)(delivered)
    }

    fn report_error(&self, message: &str) {
        (self.error)(message)
    }
}

/// Dispatch one event. `Other` events are left to the rest of the chat client.
pub fn on_incoming<H>(event: &IncomingChatEvent, handler: &H)
where
    H: ChatEventHandler + ?Sized,
{
    match event {
        IncomingChatEvent::ImageDelivered(delivered) => {
            debug!(
                conversation_id = %delivered.conversation_id,
                sender = %delivered.sender.username,
                "image delivered"
            );
            handler.render_image(delivered);
        }
        IncomingChatEvent::Error { message } => {
            warn!(%message, "server reported an error");
            handler.report_error(message);
        }
        IncomingChatEvent::Other => {}
    }
}

/// Parse and dispatch text frames until the stream ends.
///
/// Undecodable frames are logged and skipped. Returns the number of frames
/// that parsed.
pub async fn receive_events<S, H>(frames: S, handler: &H) -> usize
where
    S: Stream<Item = String>,
    H: ChatEventHandler + ?Sized,
{
    let mut frames = std::pin::pin!(frames);
    let mut dispatched = 0;

    while let Some(frame) = frames.next().await {
        match IncomingChatEvent::from_frame(&frame) {
            Ok(event) => {
                on_incoming(&event, handler);
                dispatched += 1;
            }
            Err(error) => warn!(%error, "skipping undecodable frame"),
        }
    }

    debug!(dispatched, "receive stream ended");
    dispatched
}
