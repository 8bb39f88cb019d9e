//! Infrastructure layer: avatar strategies, the room coordination loop and DTOs.

pub mod avatar;
pub mod dto;
pub mod hub;
