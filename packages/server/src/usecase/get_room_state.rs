//! UseCase: ルーム状態取得処理（HTTP API 用）

use std::sync::Arc;

use crate::domain::{RoomGateway, RoomSnapshot};

use super::error::GetRoomStateError;

/// ルーム状態取得のユースケース
pub struct GetRoomStateUseCase {
    room: Arc<dyn RoomGateway>,
}

impl GetRoomStateUseCase {
    pub fn new(room: Arc<dyn RoomGateway>) -> Self {
        Self { room }
    }

    /// 全てのルームの状態を取得する（現在はルームが 1 つだけ）
    pub async fn execute(&self) -> Result<Vec<RoomSnapshot>, GetRoomStateError> {
        let snapshot = self.room.snapshot().await?;
        Ok(vec![snapshot])
    }

    /// ID を指定してルームの状態を取得する
    ///
    /// # Returns
    ///
    /// * `Err(GetRoomStateError::RoomNotFound)` - ID に一致するルームがない
    pub async fn execute_by_id(&self, room_id: &str) -> Result<RoomSnapshot, GetRoomStateError> {
        let snapshot = self.room.snapshot().await?;
        if snapshot.id.to_string() == room_id {
            Ok(snapshot)
        } else {
            Err(GetRoomStateError::RoomNotFound(room_id.to_string()))
        }
    }
}
