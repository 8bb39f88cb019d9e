//! Room の調停ループの実装
//!
//! ## 概要
//!
//! このモジュールは `RoomGateway` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `actor`: tokio の mpsc チャンネルで Room を単一タスクに閉じ込める実装

pub mod actor;

pub use actor::{DEFAULT_EVENT_CAPACITY, RoomEvent, RoomHandle, RoomHub};
