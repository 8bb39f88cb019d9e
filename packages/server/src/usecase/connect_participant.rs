//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 送信キューの作成と Room への登録
//!
//! ### なぜこのテストが必要か
//! - 登録後の接続だけがブロードキャストを受け取ることを保証
//! - 同じユーザーの複数接続が別の参加者として扱われることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の接続
//! - エッジケース：同じ unique id での 2 回目の接続
//! - 異常系：Room の調停ループが停止している

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, Identity, Member, OutboundReceiver, RoomGateway, Timestamp,
};

use super::error::ConnectError;

/// Default capacity of a connection's outbound queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// 登録結果（書き込みポンプが使う受信側キューを含む）
#[derive(Debug)]
pub struct Registration {
    pub connection_id: ConnectionId,
    pub outbound: OutboundReceiver,
    pub joined_at: Timestamp,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Room の調停ループへのハンドル
    room: Arc<dyn RoomGateway>,
    clock: Arc<dyn Clock>,
    /// 接続ごとの送信キューの容量
    queue_capacity: usize,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(room: Arc<dyn RoomGateway>, clock: Arc<dyn Clock>, queue_capacity: usize) -> Self {
        Self {
            room,
            clock,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// 参加者接続を実行
    ///
    /// 接続ごとに新しい `ConnectionId` と送信キューを作り、Room に登録します。
    /// 同じ unique id の参加者が既にいても拒否しません。
    ///
    /// # Returns
    ///
    /// * `Ok(Registration)` - 登録成功
    /// * `Err(ConnectError)` - Room が停止している
    pub async fn execute(&self, identity: Arc<Identity>) -> Result<Registration, ConnectError> {
        let connection_id = ConnectionId::generate();
        let joined_at = Timestamp::new(self.clock.now_millis());
        let (tx, rx) = tokio::sync::mpsc::channel(self.queue_capacity);

        self.room
            .join(Member::new(connection_id, identity, joined_at, tx))
            .await?;

        Ok(Registration {
            connection_id,
            outbound: rx,
            joined_at,
        })
    }
}
