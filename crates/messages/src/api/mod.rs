//! Seams between the submitter and the transport that carries its frames.

pub mod channel;

pub use channel::MessageChannel;
