//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - アバター URL の解決、時刻の付与、Room へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者を含む参加中の全員に同じメッセージが届くことを保証
//! - アバターが見つからなくてもメッセージが送られることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証プロバイダの URL 付きで送信
//! - エッジケース：どの戦略でもアバターが見つからない（空文字列）
//! - 異常系：Room の調停ループが停止している

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    AvatarResolver, ChatMessage, ConnectionId, Identity, MessageBody, RoomGateway, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    room: Arc<dyn RoomGateway>,
    /// アバター取得チェーン（全接続で共有）
    avatars: Arc<AvatarResolver>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        room: Arc<dyn RoomGateway>,
        avatars: Arc<AvatarResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room,
            avatars,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信元の接続
    /// * `identity` - 送信者（アバター解決と表示名に使う）
    /// * `body` - 検証済みの本文
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<ChatMessage>)` - Room に渡したメッセージ
    /// * `Err(SendMessageError)` - Room が停止している
    pub async fn execute(
        &self,
        from: ConnectionId,
        identity: &Identity,
        body: MessageBody,
    ) -> Result<Arc<ChatMessage>, SendMessageError> {
        // 1. アバター URL を解決（見つからなければ空文字列）
        let avatar_url = self.avatars.resolve_or_empty(identity).await;

        // 2. 時刻を付与してメッセージを作成
        let message = Arc::new(ChatMessage::new(
            identity.name().clone(),
            body,
            avatar_url,
            Timestamp::new(self.clock.now_millis()),
        ));

        // 3. Room にブロードキャストを依頼
        self.room.broadcast(from, message.clone()).await?;

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Avatar, DisplayName, Member, OutboundReceiver, Room, RoomError, RoomId, UniqueId,
        },
        infrastructure::{
            avatar::{AuthAvatar, GravatarAvatar},
            hub::{RoomHandle, RoomHub},
        },
    };
    use hiroba_shared::time::FixedClock;

    fn create_test_room() -> RoomHandle {
        let (handle, _task) = RoomHub::spawn(Room::new(RoomId::generate(), Timestamp::new(0)), 16);
        handle
    }

    fn create_test_identity(name: &str, avatar_url: Option<&str>) -> Arc<Identity> {
        Arc::new(Identity::new(
            UniqueId::new(name.to_lowercase()).unwrap(),
            DisplayName::new(name.to_string()).unwrap(),
            avatar_url.map(str::to_string),
        ))
    }

    async fn join(room: &RoomHandle, identity: Arc<Identity>) -> (ConnectionId, OutboundReceiver) {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let connection_id = ConnectionId::generate();
        room.join(Member::new(connection_id, identity, Timestamp::new(0), tx))
            .await
            .unwrap();
        (connection_id, rx)
    }

    fn create_test_usecase(room: &RoomHandle, strategies: Vec<Arc<dyn Avatar>>) -> SendMessageUseCase {
        SendMessageUseCase::new(
            Arc::new(room.clone()),
            Arc::new(AvatarResolver::new(strategies)),
            Arc::new(FixedClock::new(1672531200000)),
        )
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // テスト項目: 送信者を含む全員に、アバター URL と時刻付きのメッセージが届く
        // given (前提条件):
        let room = create_test_room();
        let alice = create_test_identity("Alice", Some("https://example.com/alice.png"));
        let (alice_id, mut alice_rx) = join(&room, alice.clone()).await;
        let (_bob_id, mut bob_rx) = join(&room, create_test_identity("Bob", None)).await;
        let strategies: Vec<Arc<dyn Avatar>> =
            vec![Arc::new(AuthAvatar), Arc::new(GravatarAvatar::new())];
        let usecase = create_test_usecase(&room, strategies);

        // when (操作):
        let body = MessageBody::new("Hello!".to_string()).unwrap();
        let sent = usecase.execute(alice_id, &alice, body).await.unwrap();

        // then (期待する結果):
        assert_eq!(sent.name.as_str(), "Alice");
        assert_eq!(sent.avatar_url, "https://example.com/alice.png");
        assert_eq!(sent.when, Timestamp::new(1672531200000));
        assert_eq!(alice_rx.recv().await.unwrap(), sent);
        assert_eq!(bob_rx.recv().await.unwrap(), sent);
    }

    #[tokio::test]
    async fn test_send_message_without_avatar() {
        // テスト項目: どの戦略でもアバターが見つからない場合は空の URL で送られる
        // given (前提条件): 認証プロバイダのみのチェーンで、URL を持たない参加者
        let room = create_test_room();
        let bob = create_test_identity("Bob", None);
        let (bob_id, mut bob_rx) = join(&room, bob.clone()).await;
        let strategies: Vec<Arc<dyn Avatar>> = vec![Arc::new(AuthAvatar)];
        let usecase = create_test_usecase(&room, strategies);

        // when (操作):
        let body = MessageBody::new("hi".to_string()).unwrap();
        let result = usecase.execute(bob_id, &bob, body).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(bob_rx.recv().await.unwrap().avatar_url, "");
    }

    #[tokio::test]
    async fn test_send_message_to_stopped_room() {
        // テスト項目: 調停ループが停止していると RoomUnavailable が返される
        // given (前提条件):
        let (hub, handle) = RoomHub::new(Room::new(RoomId::generate(), Timestamp::new(0)), 4);
        drop(hub);
        let usecase = create_test_usecase(&handle, Vec::new());
        let alice = create_test_identity("Alice", None);

        // when (操作):
        let body = MessageBody::new("hi".to_string()).unwrap();
        let result = usecase.execute(ConnectionId::generate(), &alice, body).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::RoomUnavailable(RoomError::Closed))
        );
    }
}
