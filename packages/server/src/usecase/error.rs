//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RoomError;

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("cannot join the room: {0}")]
    RoomUnavailable(#[from] RoomError),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("cannot broadcast the message: {0}")]
    RoomUnavailable(#[from] RoomError),
}

/// 参加者切断のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("cannot leave the room: {0}")]
    RoomUnavailable(#[from] RoomError),
}

/// ルーム状態取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomStateError {
    #[error("cannot read the room: {0}")]
    RoomUnavailable(#[from] RoomError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),
}
