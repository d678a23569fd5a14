//! Send side of an already-open chat channel.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::types::ChannelError;

/// Send primitive of a connected, authenticated chat channel.
///
/// Implementations queue one text frame per call and return without waiting
/// for any acknowledgement. The channel's lifecycle belongs to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait MessageChannel: Send + Sync {
    fn send_text(&self, frame: String) -> Result<(), ChannelError>;
}

impl MessageChannel for mpsc::UnboundedSender<String> {
    fn send_text(&self, frame: String) -> Result<(), ChannelError> {
        self.send(frame).map_err(|_| ChannelError::Closed)
    }
}

impl<T: MessageChannel + ?Sized> MessageChannel for Arc<T> {
    fn send_text(&self, frame: String) -> Result<(), ChannelError> {
        (**self).send_text(frame)
    }
}
