//! Domain errors.

use thiserror::Error;

/// Validation failures of value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("unique id must not be empty")]
    EmptyUniqueId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("display name is too long ({actual} > {max} characters)")]
    DisplayNameTooLong { max: usize, actual: usize },

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("message is too long ({actual} > {max} characters)")]
    MessageTooLong { max: usize, actual: usize },
}

/// Avatar resolution failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
    /// No strategy could produce a URL for the participant
    #[error("no avatar URL is available for '{0}'")]
    NotFound(String),
}

/// Room coordination failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The coordination loop has stopped and no longer accepts events
    #[error("room coordination loop is no longer running")]
    Closed,
}
