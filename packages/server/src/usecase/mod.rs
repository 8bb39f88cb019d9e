//! UseCase 層
//!
//! UI 層（WebSocket / HTTP ハンドラ）から呼ばれるアプリケーションロジックです。
//! Domain 層の trait（`RoomGateway`）と `AvatarResolver` にのみ依存します。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_state;
pub mod send_message;

pub use connect_participant::{ConnectParticipantUseCase, Registration};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, DisconnectError, GetRoomStateError, SendMessageError};
pub use get_room_state::GetRoomStateUseCase;
pub use send_message::SendMessageUseCase;
