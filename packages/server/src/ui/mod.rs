//! WebSocket chat server implementation.

pub mod connection;
mod handler;
mod server;
mod signal;
pub mod state;

pub use connection::ClientConnection;
pub use handler::ConnectQuery;
pub use server::{Server, ServerError};
pub use signal::shutdown_signal;
