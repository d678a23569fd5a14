//! Business logic for sending and receiving image messages.

pub mod dispatcher;
pub mod submitter;

pub use dispatcher::{on_incoming, receive_events, CallbackHandler, ChatEventHandler};
pub use submitter::{build_envelope, encode, submit, validate, ImageMessageSubmitter};
