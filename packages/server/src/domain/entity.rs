//! Domain entities: the participant identity and the chat message.

use super::value_object::{DisplayName, MessageBody, Timestamp, UniqueId};

/// An already-authenticated participant.
///
/// Produced by the auth collaborator in front of the server and never modified while
/// a connection is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    unique_id: UniqueId,
    name: DisplayName,
    avatar_url: Option<String>,
}

impl Identity {
    /// Create an identity. An empty `avatar_url` counts as absent.
    pub fn new(unique_id: UniqueId, name: DisplayName, avatar_url: Option<String>) -> Self {
        let avatar_url = avatar_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Self {
            unique_id,
            name,
            avatar_url,
        }
    }

    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Avatar URL supplied by the upstream auth provider, if any
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

/// One message broadcast to the room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender
    pub name: DisplayName,
    pub body: MessageBody,
    /// Resolved avatar URL, empty when nothing could be resolved
    pub avatar_url: String,
    pub when: Timestamp,
}

impl ChatMessage {
    pub fn new(
        name: DisplayName,
        body: MessageBody,
        avatar_url: String,
        when: Timestamp,
    ) -> Self {
        Self {
            name,
            body,
            avatar_url,
            when,
        }
    }
}
