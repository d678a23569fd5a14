//! Outgoing request envelopes.

use serde::{Deserialize, Serialize};

use crate::entities::EncodedImage;
use crate::types::ImageResult;

/// Conversation an image is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationTarget {
    /// One-to-one chat with a named receiver
    Private {
        chat_id: String,
        receiver_username: String,
    },
    /// Group conversation
    Group { group_id: String },
}

impl ConversationTarget {
    pub fn private(chat_id: impl Into<String>, receiver_username: impl Into<String>) -> Self {
        Self::Private {
            chat_id: chat_id.into(),
            receiver_username: receiver_username.into(),
        }
    }

    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Group {
            group_id: group_id.into(),
        }
    }
}

/// Image message as sent over the channel.
///
/// The variant decides which identifiers are present, so a frame can never
/// carry both `chat_id` and `group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutgoingImageMessage {
    #[serde(rename = "privateChat")]
    PrivateImage {
        chat_id: String,
        receiver_username: String,
        #[serde(default)]
        message_text: String,
        image_data: String,
    },
    #[serde(rename = "groupChat")]
    GroupImage {
        group_id: String,
        #[serde(default)]
        message_text: String,
        image_data: String,
    },
}

impl OutgoingImageMessage {
    /// Build an envelope for `target`. A missing or blank caption becomes `""`.
    pub fn new(target: ConversationTarget, caption: Option<&str>, image: &EncodedImage) -> Self {
        let message_text = caption.map(str::trim).unwrap_or_default().to_string();
        let image_data = image.to_data_uri();

        match target {
            ConversationTarget::Private {
                chat_id,
                receiver_username,
            } => Self::PrivateImage {
                chat_id,
                receiver_username,
                message_text,
                image_data,
            },
            ConversationTarget::Group { group_id } => Self::GroupImage {
                group_id,
                message_text,
                image_data,
            },
        }
    }

    /// Wire value of the `type` field
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::PrivateImage { .. } => "privateChat",
            Self::GroupImage { .. } => "groupChat",
        }
    }

    pub fn chat_id(&self) -> Option<&str> {
        match self {
            Self::PrivateImage { chat_id, .. } => Some(chat_id),
            Self::GroupImage { .. } => None,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::PrivateImage { .. } => None,
            Self::GroupImage { group_id, .. } => Some(group_id),
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            Self::PrivateImage { message_text, .. } | Self::GroupImage { message_text, .. } => {
                message_text
            }
        }
    }

    pub fn image_data(&self) -> &str {
        match self {
            Self::PrivateImage { image_data, .. } | Self::GroupImage { image_data, .. } => {
                image_data
            }
        }
    }

    /// Serialize to the text frame handed to the channel
    pub fn to_frame(&self) -> ImageResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
