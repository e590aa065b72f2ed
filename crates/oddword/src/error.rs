//! Unified error type for the Oddword server.

use oddword_game::GameError;
use oddword_protocol::ProtocolError;
use oddword_session::SessionError;
use oddword_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (registry operations).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game-level error (deck, roster, round setup).
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ServerError {
    /// Returns `true` if this is the non-fatal "address in use" class
    /// of startup failure — the process logs it and continues without
    /// serving.
    pub fn is_bind_failure(&self) -> bool {
        matches!(self, Self::Transport(TransportError::BindFailed(_)))
    }
}
