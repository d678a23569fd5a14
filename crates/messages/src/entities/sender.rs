use serde::{Deserialize, Serialize};

use crate::types::serde_helpers::string_or_number;

/// Author of a delivered message, as echoed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl Sender {
    /// Full name, or the username when no name is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
