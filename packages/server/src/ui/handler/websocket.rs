//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{DisplayName, Identity, UniqueId, ValueObjectError},
    ui::{connection::ClientConnection, state::AppState},
};

/// Query parameters for WebSocket connection
///
/// These are trusted as-is. The auth layer in front of the server sets them from the
/// signed session cookie and must strip any the client supplied, otherwise a client can
/// claim any `user_id`.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl TryFrom<ConnectQuery> for Identity {
    type Error = ValueObjectError;

    fn try_from(query: ConnectQuery) -> Result<Self, Self::Error> {
        Ok(Identity::new(
            UniqueId::try_from(query.user_id)?,
            DisplayName::try_from(query.name)?,
            query.avatar_url,
        ))
    }
}

/// `GET /room`: upgrade to WebSocket and join the room.
///
/// Performs no authentication of its own. Deploy this route only behind the auth
/// layer that fills in [`ConnectQuery`]; exposed directly, anyone can chat as anyone.
/// An identity that fails validation is answered with `400 Bad Request`.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = query.user_id.clone();

    // Convert query -> Identity (Domain Model)
    let identity = match Identity::try_from(query) {
        Ok(identity) => Arc::new(identity),
        Err(e) => {
            tracing::warn!("Rejecting connection of '{}': {}", user_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for '{}': {}", user_id, e);
        })
        .on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// Register the upgraded socket with the room, then run its pumps.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Arc<Identity>) {
    let registration = match state
        .connect_participant_usecase
        .execute(identity.clone())
        .await
    {
        Ok(registration) => registration,
        Err(e) => {
            tracing::error!(
                "Failed to register '{}': {}",
                identity.unique_id(),
                e
            );
            return;
        }
    };
    tracing::info!(
        "'{}' ({}) connected as {}",
        identity.name().as_str(),
        identity.unique_id(),
        registration.connection_id
    );

    ClientConnection::new(
        registration.connection_id,
        identity,
        state.send_message_usecase.clone(),
        state.disconnect_participant_usecase.clone(),
        state.write_timeout,
    )
    .serve(socket, registration.outbound)
    .await;
}
