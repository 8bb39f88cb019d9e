//! Dependency wiring.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{Room, RoomGateway, RoomId, Timestamp},
    infrastructure::{avatar::build_resolver, hub::RoomHub},
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomStateUseCase,
        SendMessageUseCase,
    },
};

/// Build the server from its configuration.
///
/// Spawns the room's coordination loop, so this must run inside a tokio runtime.
/// The loop stops once the returned server (and every connection) is dropped.
pub fn build_server(config: &ServerConfig) -> Server {
    // Initialize dependencies in order:
    // 1. Room and its coordination loop
    // 2. Avatar chain
    // 3. UseCases
    // 4. Server
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Create the room
    let room = Room::with_policy(
        RoomId::generate(),
        Timestamp::new(clock.now_millis()),
        config.room_policy(),
    );
    tracing::info!("Room {} created!", room.id);
    let (handle, _room_task) = RoomHub::spawn(room, config.event_capacity);
    let room: Arc<dyn RoomGateway> = Arc::new(handle);

    // 2. Create the avatar chain
    let avatars = Arc::new(build_resolver(&config.avatar_chain, &config.avatar_dir));
    tracing::info!("Avatar chain: {:?}", avatars.strategy_names());

    // 3. Create UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        room.clone(),
        clock.clone(),
        config.queue_capacity,
    ));
    let disconnect_participant_usecase =
        Arc::new(DisconnectParticipantUseCase::new(room.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        room.clone(),
        avatars,
        clock.clone(),
    ));
    let get_room_state_usecase = Arc::new(GetRoomStateUseCase::new(room));

    // 4. Create the server
    Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        send_message_usecase,
        get_room_state_usecase,
        config.avatar_dir.clone(),
        config.write_timeout,
    )
}
