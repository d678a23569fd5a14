//! # imagechat messages
//!
//! Client-side image messaging over an existing chat channel: validate a
//! picked file, encode it as a base64 data URI, wrap it in a JSON envelope,
//! hand the frame to the channel, and route the server's replies to the UI.
//!
//! ## Architecture
//!
//! - **Entities**: picked files, encoded images, senders
//! - **Services**: submission and receive-path dispatch
//! - **Types**: envelopes, incoming events, errors
//! - **Api**: the channel send primitive
//! - **Utils**: validation and content type detection
//!
//! ## Usage
//!
//! ```no_run
//! use imagechat_messages::{ConversationTarget, ImageFile, ImageMessageSubmitter};
//!
//! # async fn run(channel: tokio::sync::mpsc::UnboundedSender<String>) -> imagechat_messages::ImageResult<()> {
//! let submitter = ImageMessageSubmitter::default();
//! let file = ImageFile::open("cat.png").await?;
//! submitter
//!     .send_image(&channel, ConversationTarget::private("c1", "bob"), Some("hi"), &file)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod entities;
pub mod services;
pub mod types;
pub mod utils;

pub use api::MessageChannel;
pub use entities::{EncodedImage, ImageFile, ImageSource, Sender};
pub use services::{
    build_envelope, encode, on_incoming, receive_events, submit, validate, CallbackHandler,
    ChatEventHandler, ImageMessageSubmitter,
};
pub use types::{
    ChannelError, ConversationKind, ConversationTarget, ImageDelivered, ImageError, ImageResult,
    IncomingChatEvent, OutgoingImageMessage, ValidationError,
};
