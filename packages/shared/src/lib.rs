//! Utilities shared by the Hiroba crates: logging setup and time handling.

pub mod logger;
pub mod time;
