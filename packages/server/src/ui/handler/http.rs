//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomStateError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = state
        .get_room_state_usecase
        .execute()
        .await
        .map_err(to_status_code)?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.iter().map(RoomSummaryDto::from).collect()))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room = state
        .get_room_state_usecase
        .execute_by_id(&room_id)
        .await
        .map_err(to_status_code)?;

    Ok(Json(RoomDetailDto::from(&room)))
}

fn to_status_code(error: GetRoomStateError) -> StatusCode {
    match error {
        GetRoomStateError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        GetRoomStateError::RoomUnavailable(e) => {
            tracing::error!("Room state unavailable: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
