//! Domain entities for image messaging.

pub mod image;
pub mod sender;

pub use image::{EncodedImage, ImageFile, ImageSource};
pub use sender::Sender;
