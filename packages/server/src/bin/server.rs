//! Hiroba group chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --avatars file,gravatar
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use hiroba_server::{
    bootstrap::build_server,
    config::{DEFAULT_AVATAR_DIR, DEFAULT_HOST, DEFAULT_PORT, ServerConfig},
    domain::{BackpressurePolicy, EchoPolicy},
    infrastructure::{
        avatar::{AvatarKind, DEFAULT_AVATAR_CHAIN},
        hub::DEFAULT_EVENT_CAPACITY,
    },
    ui::connection::DEFAULT_WRITE_TIMEOUT,
    usecase::connect_participant::DEFAULT_QUEUE_CAPACITY,
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Group chat server with WebSocket fan-out", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory of `<user id>.<ext>` avatar files, also served under /avatars
    #[arg(long, default_value = DEFAULT_AVATAR_DIR)]
    avatar_dir: PathBuf,

    /// Avatar strategies in priority order
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = DEFAULT_AVATAR_CHAIN)]
    avatars: Vec<AvatarKind>,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_capacity)]
    queue_capacity: usize,

    /// Capacity of the room's event channel
    #[arg(long, default_value_t = DEFAULT_EVENT_CAPACITY, value_parser = parse_capacity)]
    event_capacity: usize,

    /// Milliseconds a connection may take to accept one frame before it is dropped
    #[arg(long, default_value_t = DEFAULT_WRITE_TIMEOUT.as_millis() as u64, value_parser = parse_millis)]
    write_timeout_ms: u64,

    /// Who receives a broadcast message
    #[arg(long, value_enum, default_value_t = Echo::All)]
    echo: Echo,

    /// What to do when a connection's outbound queue is full
    #[arg(long, value_enum, default_value_t = OnFullQueue::Disconnect)]
    on_full_queue: OnFullQueue,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Echo {
    /// Everyone, the sender included
    All,
    /// Everyone but the sender
    Others,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnFullQueue {
    /// Disconnect the slow connection
    Disconnect,
    /// Drop the message for the slow connection only
    Drop,
}

impl From<Echo> for EchoPolicy {
    fn from(echo: Echo) -> Self {
        match echo {
            Echo::All => EchoPolicy::All,
            Echo::Others => EchoPolicy::Others,
        }
    }
}

impl From<OnFullQueue> for BackpressurePolicy {
    fn from(on_full_queue: OnFullQueue) -> Self {
        match on_full_queue {
            OnFullQueue::Disconnect => BackpressurePolicy::Disconnect,
            OnFullQueue::Drop => BackpressurePolicy::DropMessage,
        }
    }
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("capacity must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_millis(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 ms".to_string()),
        Ok(millis) => Ok(millis),
        Err(e) => Err(e.to_string()),
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            avatar_dir: args.avatar_dir,
            avatar_chain: args.avatars,
            queue_capacity: args.queue_capacity,
            event_capacity: args.event_capacity,
            write_timeout: Duration::from_millis(args.write_timeout_ms),
            echo: args.echo.into(),
            backpressure: args.on_full_queue.into(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    tracing::debug!("{:?}", config);

    let server = build_server(&config);
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
