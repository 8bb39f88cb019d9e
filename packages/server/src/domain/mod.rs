//! Domain layer for the chat server.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod avatar;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod room;
pub mod value_object;

pub use avatar::{Avatar, AvatarResolver};
pub use entity::{ChatMessage, Identity};
pub use error::{AvatarError, RoomError, ValueObjectError};
pub use gateway::RoomGateway;
pub use room::{
    BackpressurePolicy, EchoPolicy, FanOutReport, Member, OutboundQueue, OutboundReceiver,
    ParticipantSummary, Room, RoomPolicy, RoomSnapshot,
};
pub use value_object::{ConnectionId, DisplayName, MessageBody, RoomId, Timestamp, UniqueId};
