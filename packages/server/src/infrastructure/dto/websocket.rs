//! WebSocket message DTOs.
//!
//! Field names are capitalized on the wire, so existing browser clients keep working.

use serde::{Deserialize, Serialize};

/// Message pushed to every live connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "AvatarURL")]
    pub avatar_url: String,
    /// RFC 3339, UTC
    #[serde(rename = "When")]
    pub when: String,
}

/// Message typed by a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl IncomingMessage {
    /// Decode a text frame.
    ///
    /// A frame that is not JSON is taken verbatim as the message body.
    pub fn from_frame(text: &str) -> Self {
        match serde_json::from_str::<IncomingMessage>(text) {
            Ok(incoming) => incoming,
            Err(e) => {
                tracing::debug!("Frame is not JSON ({}), using it as plain text", e);
                Self {
                    message: text.to_string(),
                }
            }
        }
    }
}
