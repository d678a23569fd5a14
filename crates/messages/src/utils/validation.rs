//! Validation utilities.

use crate::entities::ImageFile;
use crate::types::ValidationError;

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate that a declared content type names an image
    pub fn image_content_type(content_type: &str) -> Result<(), ValidationError> {
        if !content_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Validate file size against a ceiling; a file of exactly `max_size_bytes` is rejected
    pub fn file_size(size_bytes: u64, max_size_bytes: u64) -> Result<(), ValidationError> {
        if size_bytes >= max_size_bytes {
            return Err(ValidationError::TooLarge {
                size: size_bytes,
                max: max_size_bytes,
            });
        }

        Ok(())
    }

    /// Validate a picked file: content type first, then size
    pub fn image(file: &ImageFile, max_size_bytes: u64) -> Result<(), ValidationError> {
        Self::image_content_type(file.content_type())?;
        Self::file_size(file.size(), max_size_bytes)
    }
}
