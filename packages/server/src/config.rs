//! Server configuration.

use std::{path::PathBuf, time::Duration};

use crate::{
    domain::{BackpressurePolicy, EchoPolicy, RoomPolicy},
    infrastructure::{
        avatar::{AvatarKind, DEFAULT_AVATAR_CHAIN},
        hub::DEFAULT_EVENT_CAPACITY,
    },
    ui::connection::DEFAULT_WRITE_TIMEOUT,
    usecase::connect_participant::DEFAULT_QUEUE_CAPACITY,
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AVATAR_DIR: &str = "avatars";

/// Everything needed to build and run the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `<user id>.<ext>` avatar files
    pub avatar_dir: PathBuf,
    /// Avatar strategies, highest priority first
    pub avatar_chain: Vec<AvatarKind>,
    /// Capacity of each connection's outbound queue
    pub queue_capacity: usize,
    /// Capacity of the room's event channel
    pub event_capacity: usize,
    /// Deadline for writing one frame; a peer that misses it is disconnected
    pub write_timeout: Duration,
    pub echo: EchoPolicy,
    pub backpressure: BackpressurePolicy,
}

impl ServerConfig {
    pub fn room_policy(&self) -> RoomPolicy {
        RoomPolicy {
            echo: self.echo,
            backpressure: self.backpressure,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            avatar_dir: PathBuf::from(DEFAULT_AVATAR_DIR),
            avatar_chain: DEFAULT_AVATAR_CHAIN.to_vec(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            echo: EchoPolicy::default(),
            backpressure: BackpressurePolicy::default(),
        }
    }
}
