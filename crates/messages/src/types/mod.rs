//! Shared types for image messaging.
//!
//! Error definitions, outgoing envelopes and incoming events used across
//! the crate.

pub mod errors;
pub mod events;
pub mod requests;
pub mod serde_helpers;

pub use errors::{ChannelError, ImageError, ImageResult, ValidationError};
pub use events::*;
pub use requests::*;
