//! Conversion logic between domain entities and DTOs.

use hiroba_shared::time::millis_to_rfc3339;

use crate::domain::{ChatMessage, ParticipantSummary, RoomSnapshot};
use crate::infrastructure::dto::{
    http::{ParticipantDetailDto, RoomDetailDto, RoomSummaryDto},
    websocket::OutgoingMessage,
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for OutgoingMessage {
    fn from(model: &ChatMessage) -> Self {
        Self {
            name: model.name.as_str().to_string(),
            message: model.body.as_str().to_string(),
            avatar_url: model.avatar_url.clone(),
            when: millis_to_rfc3339(model.when.value()),
        }
    }
}

impl From<&ParticipantSummary> for ParticipantDetailDto {
    fn from(model: &ParticipantSummary) -> Self {
        Self {
            connection_id: model.connection_id.to_string(),
            user_id: model.identity.unique_id().as_str().to_string(),
            name: model.identity.name().as_str().to_string(),
            joined_at: millis_to_rfc3339(model.joined_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for RoomSummaryDto {
    fn from(model: &RoomSnapshot) -> Self {
        Self {
            id: model.id.to_string(),
            participants: model
                .participants
                .iter()
                .map(|p| p.identity.name().as_str().to_string())
                .collect(),
            participant_count: model.participants.len(),
            created_at: millis_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for RoomDetailDto {
    fn from(model: &RoomSnapshot) -> Self {
        Self {
            id: model.id.to_string(),
            participants: model
                .participants
                .iter()
                .map(ParticipantDetailDto::from)
                .collect(),
            created_at: millis_to_rfc3339(model.created_at.value()),
        }
    }
}
