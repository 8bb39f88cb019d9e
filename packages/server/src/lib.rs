//! Hiroba chat server.
//!
//! A single shared room: every message a participant sends over its WebSocket is
//! fanned out to every live connection, stamped with the sender's avatar URL.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
