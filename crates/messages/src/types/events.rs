//! Incoming events received over the chat channel.

use chrono::NaiveDateTime;
use imagechat_config::AssetConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::entities::Sender;
use crate::types::serde_helpers::{sent_at_format, string_or_number};
use crate::types::{ImageError, ImageResult};

/// Kind of conversation a delivered image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationKind {
    #[serde(rename = "privateChat")]
    Private,
    #[serde(rename = "groupChat")]
    Group,
}

/// Server echo of a stored image message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDelivered {
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub conversation_id: String,
    pub slug: String,
    pub sender: Sender,
    #[serde(rename = "message_text", default)]
    pub caption: Option<String>,
    pub image_url: String,
    #[serde(with = "sent_at_format")]
    pub sent_at: NaiveDateTime,
}

impl ImageDelivered {
    /// Whether `image_url` is an HTTPS URL on the configured asset origin
    pub fn is_served_from(&self, assets: &AssetConfig) -> bool {
        let Ok(url) = url::Url::parse(&self.image_url) else {
            return false;
        };
        url.scheme() == "https" && assets.origin().is_some_and(|origin| origin == url.origin())
    }

    /// Whether this echo was sent by `username`, e.g. our own submission
    pub fn is_from(&self, username: &str) -> bool {
        self.sender.username == username
    }
}

/// One event read off the chat channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingChatEvent {
    /// An image message was stored and is ready to render
    ImageDelivered(ImageDelivered),
    /// The server rejected something; only a human-readable message is given
    Error { message: String },
    /// Any other chat protocol message
    Other,
}

enum FrameShape {
    Image,
    Error,
    Other,
}

impl IncomingChatEvent {
    /// Parse a single text frame.
    ///
    /// ```
    /// use imagechat_messages::IncomingChatEvent;
    ///
    /// let event = IncomingChatEvent::from_frame(r#"{"type":"error","message":"rate limited"}"#).unwrap();
    /// assert_eq!(event, IncomingChatEvent::Error { message: "rate limited".into() });
    /// ```
    pub fn from_frame(frame: &str) -> ImageResult<Self> {
        let value: Value = serde_json::from_str(frame)
            .map_err(|error| ImageError::protocol(format!("frame is not JSON: {error}")))?;

        let shape = match &value {
            Value::Object(object) => {
                let has_image = object.get("image_url").is_some_and(|url| !url.is_null());
                match object.get("type").and_then(Value::as_str) {
                    Some("error") => FrameShape::Error,
                    Some("privateChat" | "groupChat") if has_image => FrameShape::Image,
                    other => {
                        debug!(event_type = ?other, "ignoring non-image frame");
                        FrameShape::Other
                    }
                }
            }
            _ => return Err(ImageError::protocol("frame is not a JSON object")),
        };

        match shape {
            FrameShape::Image => {
                let delivered = serde_json::from_value::<ImageDelivered>(value).map_err(|error| {
                    ImageError::protocol(format!("malformed image delivery: {error}"))
                })?;
                Ok(Self::ImageDelivered(delivered))
            }
            FrameShape::Error => {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ImageError::protocol("error frame without a string message"))?;
                Ok(Self::Error {
                    message: message.to_string(),
                })
            }
            FrameShape::Other => Ok(Self::Other),
        }
    }

    /// Event type name for logging
    pub fn event_type_name(&self) -> &'static str {
        match self {
            IncomingChatEvent::ImageDelivered(_) => "image_delivered",
            IncomingChatEvent::Error { .. } => "error",
            IncomingChatEvent::Other => "other",
        }
    }
}
