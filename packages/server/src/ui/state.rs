//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomStateUseCase,
    SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomStateUseCase（ルーム状態取得のユースケース）
    pub get_room_state_usecase: Arc<GetRoomStateUseCase>,
    /// Deadline for writing one frame to a participant
    pub write_timeout: Duration,
}
