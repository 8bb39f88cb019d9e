//! RoomGateway trait 定義
//!
//! Room の調停ループへのインターフェースを定義します。
//! UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装（`RoomHandle`）には依存しない。
//!
//! 参加中の接続集合は調停ループだけが所有し、この trait のメソッドはイベントを
//! ループへ送るだけです。ロックは一切取りません。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    entity::ChatMessage,
    error::RoomError,
    room::{Member, RoomSnapshot},
    value_object::ConnectionId,
};

#[async_trait]
pub trait RoomGateway: Send + Sync {
    /// 接続を参加中の集合に追加する
    async fn join(&self, member: Member) -> Result<(), RoomError>;

    /// 接続を参加中の集合から取り除く（冪等）
    async fn leave(&self, connection_id: ConnectionId) -> Result<(), RoomError>;

    /// メッセージを参加中の全ての接続へ配信する
    async fn broadcast(
        &self,
        from: ConnectionId,
        message: Arc<ChatMessage>,
    ) -> Result<(), RoomError>;

    /// Room の現在の状態を取得する
    async fn snapshot(&self) -> Result<RoomSnapshot, RoomError>;
}
