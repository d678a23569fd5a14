//! Internal utilities for image messaging.

pub mod mime;
pub mod validation;

pub use mime::*;
pub use validation::*;
