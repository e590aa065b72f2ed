//! Game configuration and the phase state machine.

use std::fmt;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Behavioral switches for the game machine.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// When `true`, rejected commands (a non-host starting the game, a
    /// player speaking out of turn, a vote outside the voting phase)
    /// produce an explicit `error` message to the sender. When `false`
    /// they are silently ignored, matching the original behavior.
    pub notify_rejections: bool,
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The coarse game state — one value for the whole session, not
/// per-player.
///
/// ```text
/// Lobby → Playing → Voting → Result
///   ↑                ↓  ↑      │
///   │            (resolution)  │
///   └────────── (host reset) ──┘
/// ```
///
/// `Playing ↔ Voting` cycles as describing rounds and vote resolutions
/// alternate; `Result` is reached by a win condition or an abort, and
/// only an explicit host reset returns to `Lobby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Lobby,
    Playing,
    Voting,
    Result,
}

impl GamePhase {
    /// Returns `true` while a round is in progress (describing or
    /// voting) — the phases where disconnects can abort the game.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Voting)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Playing => write!(f, "Playing"),
            Self::Voting => write!(f, "Voting"),
            Self::Result => write!(f, "Result"),
        }
    }
}
