//! Server execution logic.

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    infrastructure::avatar::DEFAULT_AVATAR_URL_PREFIX,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomStateUseCase,
        SendMessageUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Failures of the HTTP server itself
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// WebSocket chat server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_participant_usecase,
///     disconnect_participant_usecase,
///     send_message_usecase,
///     get_room_state_usecase,
///     "avatars",
///     DEFAULT_WRITE_TIMEOUT,
/// );
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomStateUseCase（ルーム状態取得のユースケース）
    get_room_state_usecase: Arc<GetRoomStateUseCase>,
    /// Directory served under `/avatars`
    avatar_dir: PathBuf,
    write_timeout: Duration,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_room_state_usecase: Arc<GetRoomStateUseCase>,
        avatar_dir: impl Into<PathBuf>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            send_message_usecase,
            get_room_state_usecase,
            avatar_dir: avatar_dir.into(),
            write_timeout,
        }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            connect_participant_usecase: self.connect_participant_usecase.clone(),
            disconnect_participant_usecase: self.disconnect_participant_usecase.clone(),
            send_message_usecase: self.send_message_usecase.clone(),
            get_room_state_usecase: self.get_room_state_usecase.clone(),
            write_timeout: self.write_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/room", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            // アバター画像（読み取り専用）
            .nest_service(DEFAULT_AVATAR_URL_PREFIX, ServeDir::new(&self.avatar_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Connect to: ws://{}/room?user_id=<id>&name=<name>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Serving avatars from {:?}", self.avatar_dir);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
