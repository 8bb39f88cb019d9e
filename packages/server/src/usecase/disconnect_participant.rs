//! UseCase: 参加者切断処理
//!
//! 読み込み・書き込みのどちらかのポンプが終了した時に一度だけ呼ばれます。
//! 既に Room から取り除かれている接続（バックプレッシャーで切断された場合など）に対して
//! 呼んでも問題ありません。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomGateway};

use super::error::DisconnectError;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    room: Arc<dyn RoomGateway>,
}

impl DisconnectParticipantUseCase {
    pub fn new(room: Arc<dyn RoomGateway>) -> Self {
        Self { room }
    }

    /// 参加者切断を実行（冪等）
    pub async fn execute(&self, connection_id: ConnectionId) -> Result<(), DisconnectError> {
        self.room.leave(connection_id).await?;
        Ok(())
    }
}
