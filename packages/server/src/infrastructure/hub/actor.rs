//! mpsc チャンネルを使った RoomGateway 実装
//!
//! ## 責務
//!
//! - `Room`（参加中の接続集合）を 1 つのタスクだけが所有する
//! - join / leave / broadcast / snapshot を到着順に 1 つずつ処理する
//!
//! ## 設計ノート
//!
//! 全てのイベントは 1 本の FIFO チャンネルを通るため、ある接続の join は
//! その接続が送る最初の broadcast より必ず先に処理されます。
//! ループ自身は送信キューへの書き込みで待つことはありません（`try_send` のみ）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{
    ChatMessage, ConnectionId, Member, Room, RoomError, RoomGateway, RoomSnapshot,
};

/// Default capacity of the room's event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Input of the coordination loop
#[derive(Debug)]
pub enum RoomEvent {
    Join(Member),
    Leave(ConnectionId),
    Broadcast {
        from: ConnectionId,
        message: Arc<ChatMessage>,
    },
    Snapshot(oneshot::Sender<RoomSnapshot>),
}

/// Cloneable handle to the coordination loop
#[derive(Debug, Clone)]
pub struct RoomHandle {
    events: mpsc::Sender<RoomEvent>,
}

impl RoomHandle {
    async fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.events.send(event).await.map_err(|_| RoomError::Closed)
    }
}

#[async_trait]
impl RoomGateway for RoomHandle {
    async fn join(&self, member: Member) -> Result<(), RoomError> {
        self.send(RoomEvent::Join(member)).await
    }

    async fn leave(&self, connection_id: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomEvent::Leave(connection_id)).await
    }

    async fn broadcast(
        &self,
        from: ConnectionId,
        message: Arc<ChatMessage>,
    ) -> Result<(), RoomError> {
        self.send(RoomEvent::Broadcast { from, message }).await
    }

    async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomEvent::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| RoomError::Closed)
    }
}

/// The coordination loop: sole owner of the live set
pub struct RoomHub {
    room: Room,
    events: mpsc::Receiver<RoomEvent>,
}

impl RoomHub {
    /// Create the loop and its first handle without starting it
    pub fn new(room: Room, event_capacity: usize) -> (Self, RoomHandle) {
        let (tx, rx) = mpsc::channel(event_capacity.max(1));
        (Self { room, events: rx }, RoomHandle { events: tx })
    }

    /// Start the loop on the tokio runtime.
    ///
    /// The task ends once every `RoomHandle` is dropped and yields the final room.
    pub fn spawn(room: Room, event_capacity: usize) -> (RoomHandle, JoinHandle<Room>) {
        let (hub, handle) = Self::new(room, event_capacity);
        (handle, tokio::spawn(hub.run()))
    }

    pub async fn run(mut self) -> Room {
        tracing::info!(
            "Room {} is running (policy: {:?})",
            self.room.id,
            self.room.policy()
        );

        while let Some(event) = self.events.recv().await {
            self.handle(event);
        }

        tracing::info!("Room {} stopped: no handles left", self.room.id);
        self.room
    }

    fn handle(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Join(member) => {
                let connection_id = member.connection_id;
                let name = member.identity.name().as_str().to_string();
                self.room.join(member);
                tracing::info!(
                    "'{}' ({}) joined, {} connection(s) live",
                    name,
                    connection_id,
                    self.room.len()
                );
            }
            RoomEvent::Leave(connection_id) => {
                if self.room.leave(&connection_id) {
                    tracing::info!(
                        "{} left, {} connection(s) live",
                        connection_id,
                        self.room.len()
                    );
                } else {
                    tracing::debug!("{} already left, ignoring", connection_id);
                }
            }
            RoomEvent::Broadcast { from, message } => {
                let report = self.room.broadcast(&from, message);
                tracing::debug!(
                    "Broadcast from {}: delivered={}, dropped={}, evicted={}",
                    from,
                    report.delivered.len(),
                    report.dropped.len(),
                    report.evicted.len()
                );
            }
            RoomEvent::Snapshot(reply) => {
                // The requester may have given up waiting.
                let _ = reply.send(self.room.snapshot());
            }
        }
    }
}
