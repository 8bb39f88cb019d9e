//! ClientConnection: one participant's socket and its two pumps.
//!
//! The read pump turns inbound frames into broadcasts; the write pump drains the
//! connection's outbound queue onto the socket. Neither pump ever touches the room's
//! live set directly.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::timeout;

use crate::{
    domain::{ConnectionId, Identity, MessageBody, OutboundReceiver},
    infrastructure::dto::websocket::{IncomingMessage, OutgoingMessage},
    usecase::{DisconnectParticipantUseCase, SendMessageUseCase},
};

/// Default deadline for writing one frame to a participant
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// A registered participant connection
pub struct ClientConnection {
    connection_id: ConnectionId,
    identity: Arc<Identity>,
    send_message_usecase: Arc<SendMessageUseCase>,
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// A peer that does not accept a frame within this deadline is dropped
    write_timeout: Duration,
}

impl ClientConnection {
    pub fn new(
        connection_id: ConnectionId,
        identity: Arc<Identity>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            connection_id,
            identity,
            send_message_usecase,
            disconnect_participant_usecase,
            write_timeout,
        }
    }

    /// Run both pumps on an upgraded socket until either ends, then leave the room.
    pub async fn serve(self, socket: WebSocket, outbound: OutboundReceiver) {
        let (sink, stream) = socket.split();
        self.run(stream, sink, outbound).await;
    }

    /// Run both pumps until either ends, then leave the room.
    ///
    /// Consumes the connection: once this returns the participant is gone and
    /// a reconnect goes through a fresh upgrade.
    pub async fn run<R, E, W>(self, frames: R, sink: W, outbound: OutboundReceiver)
    where
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display,
    {
        let connection_id = self.connection_id;

        let identity = self.identity.clone();
        let send_message_usecase = self.send_message_usecase.clone();
        let mut read_task = tokio::spawn(async move {
            read_pump(frames, connection_id, &identity, &send_message_usecase).await;
        });
        let mut write_task = tokio::spawn(write_pump(
            outbound,
            sink,
            connection_id,
            self.write_timeout,
        ));

        // If any one of the tasks completes, abort the other
        tokio::select! {
            _ = &mut read_task => write_task.abort(),
            _ = &mut write_task => read_task.abort(),
        };

        match self
            .disconnect_participant_usecase
            .execute(connection_id)
            .await
        {
            Ok(()) => tracing::info!(
                "'{}' ({}) disconnected",
                self.identity.name().as_str(),
                connection_id
            ),
            Err(e) => tracing::warn!("Failed to remove {} from the room: {}", connection_id, e),
        }
    }
}

/// Read frames from the participant and hand each message body to the room.
///
/// Returns on read error, close frame, end of stream, or when the room has stopped.
pub async fn read_pump<R, E>(
    mut frames: R,
    connection_id: ConnectionId,
    identity: &Identity,
    send_message_usecase: &SendMessageUseCase,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = frames.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("WebSocket read error on {}: {}", connection_id, e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let incoming = IncomingMessage::from_frame(text.as_str());
                let body = match MessageBody::new(incoming.message) {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!("Skipping message from {}: {}", connection_id, e);
                        continue;
                    }
                };

                if let Err(e) = send_message_usecase
                    .execute(connection_id, identity, body)
                    .await
                {
                    tracing::error!("Failed to send message from {}: {}", connection_id, e);
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame from {}", connection_id);
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("{} requested close", connection_id);
                break;
            }
        }
    }
}

/// Write every queued message to the participant as one JSON text frame.
///
/// Returns on write error or when a frame is not accepted within `write_timeout`.
/// When the queue closes (evicted, or the room stopped) a close frame is sent.
pub async fn write_pump<W>(
    mut outbound: OutboundReceiver,
    mut sink: W,
    connection_id: ConnectionId,
    write_timeout: Duration,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    while let Some(message) = outbound.recv().await {
        let json = match serde_json::to_string(&OutgoingMessage::from(message.as_ref())) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize message for {}: {}", connection_id, e);
                continue;
            }
        };

        match timeout(write_timeout, sink.send(Message::Text(json.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("WebSocket write error on {}: {}", connection_id, e);
                return;
            }
            Err(_) => {
                tracing::warn!(
                    "{} did not accept a frame within {:?}, dropping it",
                    connection_id,
                    write_timeout
                );
                return;
            }
        }
    }

    tracing::info!("Outbound queue of {} closed, closing socket", connection_id);
    match timeout(write_timeout, sink.send(Message::Close(None))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Failed to send close frame to {}: {}", connection_id, e),
        Err(_) => tracing::debug!("Timed out sending close frame to {}", connection_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        convert::Infallible,
        pin::Pin,
        task::{Context, Poll},
    };

    use crate::{
        domain::{
            Avatar, AvatarResolver, BackpressurePolicy, ChatMessage, DisplayName, Member, Room,
            RoomGateway, RoomId, RoomPolicy, Timestamp, UniqueId,
        },
        infrastructure::{
            avatar::AuthAvatar,
            hub::{RoomHandle, RoomHub},
        },
    };
    use hiroba_shared::time::FixedClock;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 読み込みポンプ: フレームの解釈、不正な本文のスキップ、終了条件
    // - 書き込みポンプ: キューの内容をワイヤ形式で順に書き出し、クローズ時に Close を送る
    // - 書き込みポンプ: 書き込みエラーと書き込み期限切れで即座に終了する
    // - run: どちらのポンプが先に終わっても Room から一度だけ退出する
    //
    // 【なぜこのテストが必要か】
    // - ソケットを使わずにポンプ単体の振る舞いを固定する
    //   （ストリームは futures の iter、シンクは Vec<Message> で代用）
    // - 受け取らない相手を追い出したとき、接続が本当に終わることを保証する
    // ========================================

    fn create_test_identity() -> Arc<Identity> {
        Arc::new(Identity::new(
            UniqueId::new("u42".to_string()).unwrap(),
            DisplayName::new("Alice".to_string()).unwrap(),
            Some("/avatars/u42.png".to_string()),
        ))
    }

    async fn create_test_room() -> (RoomHandle, ConnectionId, OutboundReceiver) {
        let (room, _task) = RoomHub::spawn(Room::new(RoomId::generate(), Timestamp::new(0)), 16);
        let (tx, rx) = mpsc::channel(16);
        let connection_id = ConnectionId::generate();
        room.join(Member::new(
            connection_id,
            create_test_identity(),
            Timestamp::new(0),
            tx,
        ))
        .await
        .unwrap();
        (room, connection_id, rx)
    }

    fn create_test_usecase(room: &RoomHandle) -> SendMessageUseCase {
        let strategies: Vec<Arc<dyn Avatar>> = vec![Arc::new(AuthAvatar)];
        SendMessageUseCase::new(
            Arc::new(room.clone()),
            Arc::new(AvatarResolver::new(strategies)),
            Arc::new(FixedClock::new(1672531200000)),
        )
    }

    fn text(value: &str) -> Result<Message, Infallible> {
        Ok(Message::Text(value.into()))
    }

    fn create_test_message(body: &str) -> Arc<ChatMessage> {
        Arc::new(ChatMessage::new(
            DisplayName::new("Alice".to_string()).unwrap(),
            MessageBody::new(body.to_string()).unwrap(),
            "/avatars/u42.png".to_string(),
            Timestamp::new(1672531200000),
        ))
    }

    fn create_test_connection(room: &RoomHandle, connection_id: ConnectionId) -> ClientConnection {
        ClientConnection::new(
            connection_id,
            create_test_identity(),
            Arc::new(create_test_usecase(room)),
            Arc::new(DisconnectParticipantUseCase::new(Arc::new(room.clone()))),
            Duration::from_millis(50),
        )
    }

    /// A peer that never accepts a frame
    struct StalledSink;

    impl Sink<Message> for StalledSink {
        type Error = Infallible;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    /// A peer whose socket is already broken
    #[derive(Default)]
    struct FailingSink {
        attempts: usize,
    }

    impl Sink<Message> for FailingSink {
        type Error = &'static str;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(mut self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
            self.attempts += 1;
            Err("broken pipe")
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn drain(rx: &mut OutboundReceiver) -> Vec<String> {
        let mut bodies = Vec::new();
        while let Ok(message) = rx.try_recv() {
            bodies.push(message.body.as_str().to_string());
        }
        bodies
    }

    #[tokio::test]
    async fn test_read_pump_broadcasts_valid_frames_in_order() {
        // テスト項目: JSON とプレーンテキストのフレームが順に配信され、不正な本文はスキップされる
        // given (前提条件):
        let (room, connection_id, mut rx) = create_test_room().await;
        let usecase = create_test_usecase(&room);
        let too_long = "a".repeat(crate::domain::value_object::MAX_MESSAGE_LENGTH + 1);
        let frames = futures_util::stream::iter(vec![
            text(r#"{"Message":"first"}"#),
            text("   "),
            Ok(Message::Binary(vec![1, 2, 3].into())),
            text(&too_long),
            text("second"),
        ]);

        // when (操作):
        read_pump(frames, connection_id, &create_test_identity(), &usecase).await;
        room.snapshot().await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_read_pump_stops_at_close_frame() {
        // テスト項目: Close フレーム以降のフレームは処理されない
        // given (前提条件):
        let (room, connection_id, mut rx) = create_test_room().await;
        let usecase = create_test_usecase(&room);
        let frames = futures_util::stream::iter(vec![
            text("before"),
            Ok(Message::Close(None)),
            text("after"),
        ]);

        // when (操作):
        read_pump(frames, connection_id, &create_test_identity(), &usecase).await;
        room.snapshot().await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec!["before"]);
    }

    #[tokio::test]
    async fn test_read_pump_stops_at_read_error() {
        // テスト項目: 読み込みエラーでポンプが終了する
        // given (前提条件):
        let (room, connection_id, mut rx) = create_test_room().await;
        let usecase = create_test_usecase(&room);
        let frames = futures_util::stream::iter(vec![
            Ok(Message::Text("before".into())),
            Err("connection reset"),
            Ok(Message::Text("after".into())),
        ]);

        // when (操作):
        read_pump(frames, connection_id, &create_test_identity(), &usecase).await;
        room.snapshot().await.unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec!["before"]);
    }

    #[tokio::test]
    async fn test_write_pump_writes_wire_format_then_closes() {
        // テスト項目: キューのメッセージがワイヤ形式の JSON で順に書き出され、最後に Close が送られる
        // given (前提条件):
        let (tx, rx) = mpsc::channel(4);
        for body in ["one", "two"] {
            tx.send(Arc::new(ChatMessage::new(
                DisplayName::new("Alice".to_string()).unwrap(),
                MessageBody::new(body.to_string()).unwrap(),
                "/avatars/u42.png".to_string(),
                Timestamp::new(1672531200000),
            )))
            .await
            .unwrap();
        }
        drop(tx);
        let mut written: Vec<Message> = Vec::new();

        // when (操作):
        write_pump(rx, &mut written, ConnectionId::generate(), DEFAULT_WRITE_TIMEOUT).await;

        // then (期待する結果):
        assert_eq!(written.len(), 3);
        let Message::Text(first) = &written[0] else {
            panic!("expected a text frame, got {:?}", written[0]);
        };
        let first: serde_json::Value = serde_json::from_str(first.as_str()).unwrap();
        assert_eq!(
            first,
            serde_json::json!({
                "Name": "Alice",
                "Message": "one",
                "AvatarURL": "/avatars/u42.png",
                "When": "2023-01-01T00:00:00.000Z",
            })
        );
        assert!(matches!(&written[1], Message::Text(t) if t.as_str().contains("\"two\"")));
        assert!(matches!(written[2], Message::Close(None)));
    }

    #[tokio::test]
    async fn test_write_pump_stops_at_write_error() {
        // テスト項目: 書き込みエラーで即座に終了し、後続のメッセージは書き込まない
        // given (前提条件):
        let (tx, rx) = mpsc::channel(4);
        tx.send(create_test_message("one")).await.unwrap();
        tx.send(create_test_message("two")).await.unwrap();
        let mut sink = FailingSink::default();

        // when (操作): 送信側は開いたままなので、キューの終端では終わらない
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            write_pump(rx, &mut sink, ConnectionId::generate(), DEFAULT_WRITE_TIMEOUT),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(sink.attempts, 1);
        drop(tx);
    }

    #[tokio::test]
    async fn test_write_pump_gives_up_on_stalled_peer() {
        // テスト項目: フレームを受け取らない相手には書き込み期限で諦めて終了する
        // given (前提条件):
        let (tx, rx) = mpsc::channel(4);
        tx.send(create_test_message("one")).await.unwrap();
        drop(tx);

        // when (操作):
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            write_pump(rx, StalledSink, ConnectionId::generate(), Duration::from_millis(50)),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_leaves_room_when_read_side_ends() {
        // テスト項目: 読み込み側が先に終わると、Room から退出する
        // given (前提条件):
        let (room, _task) = RoomHub::spawn(Room::new(RoomId::generate(), Timestamp::new(0)), 16);
        let (tx, rx) = mpsc::channel(16);
        let connection_id = ConnectionId::generate();
        room.join(Member::new(connection_id, create_test_identity(), Timestamp::new(0), tx))
            .await
            .unwrap();
        let frames = futures_util::stream::iter(vec![text("hi"), Ok(Message::Close(None))]);

        // when (操作):
        tokio::time::timeout(
            Duration::from_secs(2),
            create_test_connection(&room, connection_id).run(
                frames,
                futures_util::sink::drain(),
                rx,
            ),
        )
        .await
        .unwrap();

        // then (期待する結果):
        let snapshot = room.snapshot().await.unwrap();
        assert!(!snapshot.connection_ids().contains(&connection_id));
    }

    #[tokio::test]
    async fn test_run_leaves_room_when_write_side_ends() {
        // テスト項目: 書き込み側が先に終わると、読み込み側も止めて Room から退出する
        // given (前提条件): 読み込み側は何も届かないまま待ち続ける
        let (room, _task) = RoomHub::spawn(Room::new(RoomId::generate(), Timestamp::new(0)), 16);
        let (tx, rx) = mpsc::channel(16);
        let connection_id = ConnectionId::generate();
        room.join(Member::new(
            connection_id,
            create_test_identity(),
            Timestamp::new(0),
            tx.clone(),
        ))
        .await
        .unwrap();
        tx.send(create_test_message("one")).await.unwrap();
        let frames = futures_util::stream::pending::<Result<Message, Infallible>>();

        // when (操作):
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            create_test_connection(&room, connection_id).run(frames, FailingSink::default(), rx),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let snapshot = room.snapshot().await.unwrap();
        assert!(!snapshot.connection_ids().contains(&connection_id));
    }

    #[tokio::test]
    async fn test_run_ends_after_eviction_of_stalled_peer() {
        // テスト項目: キューが溢れて追い出された相手がフレームを受け取らなくても、接続は終わる
        // given (前提条件): キュー容量 1、溢れたら切断するポリシー
        let policy = RoomPolicy {
            backpressure: BackpressurePolicy::Disconnect,
            ..RoomPolicy::default()
        };
        let (room, _task) = RoomHub::spawn(
            Room::with_policy(RoomId::generate(), Timestamp::new(0), policy),
            16,
        );
        let (tx, rx) = mpsc::channel(1);
        let connection_id = ConnectionId::generate();
        room.join(Member::new(connection_id, create_test_identity(), Timestamp::new(0), tx))
            .await
            .unwrap();
        let frames = futures_util::stream::pending::<Result<Message, Infallible>>();
        let connection = tokio::spawn(create_test_connection(&room, connection_id).run(
            frames,
            StalledSink,
            rx,
        ));

        // when (操作): 別の参加者から 5 通ブロードキャスト
        let other = ConnectionId::generate();
        for i in 0..5 {
            room.broadcast(other, create_test_message(&format!("m{}", i)))
                .await
                .unwrap();
        }

        // then (期待する結果):
        let result = tokio::time::timeout(Duration::from_secs(2), connection).await;
        assert!(matches!(result, Ok(Ok(()))));
        let snapshot = room.snapshot().await.unwrap();
        assert!(!snapshot.connection_ids().contains(&connection_id));
    }
}
