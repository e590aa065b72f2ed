//! Error types for the session layer.

use oddword_protocol::PlayerId;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("no session for player {0}")]
    NotFound(PlayerId),

    /// The player already joined on this connection.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),
}
