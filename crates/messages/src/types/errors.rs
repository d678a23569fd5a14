//! Error types for image messaging.

use thiserror::Error;

/// Result type alias for image message operations
pub type ImageResult<T> = Result<T, ImageError>;

/// Client-side rejection of a picked file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File is not an image (content type: {content_type})")]
    NotAnImage { content_type: String },

    #[error("Image too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Failure of the channel's send primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Channel is closed")]
    Closed,

    #[error("Transport error: {message}")]
    Transport { message: String },
}

/// Main error type for image messaging
#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data URI: {message}")]
    InvalidDataUri { message: String },

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("Protocol error: {message}")]
    Protocol { message: String },
}

impl ImageError {
    /// Create an invalid data URI error
    pub fn invalid_data_uri(message: impl Into<String>) -> Self {
        Self::InvalidDataUri {
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Whether the failure happened before anything was sent
    pub fn is_client_local(&self) -> bool {
        matches!(
            self,
            ImageError::Validation(_) | ImageError::Io(_) | ImageError::InvalidDataUri { .. }
        )
    }
}

impl ChannelError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_their_details() {
        let error = ValidationError::TooLarge {
            size: 6_000_000,
            max: 5_242_880,
        };
        assert_eq!(
            error.to_string(),
            "Image too large: 6000000 bytes (max 5242880 bytes)"
        );

        let error = ValidationError::NotAnImage {
            content_type: "application/pdf".to_string(),
        };
        assert!(error.to_string().contains("application/pdf"));
    }

    #[test]
    fn client_local_errors_are_flagged() {
        let io = ImageError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_client_local());

        let channel = ImageError::from(ChannelError::Closed);
        assert!(!channel.is_client_local());
    }
}
