//! Session types: the server's record of one joined player.

use oddword_protocol::{PlayerId, PlayerInfo};

/// One connected identity and its per-round state.
///
/// Created on a successful join; mutated by round start (`word`,
/// `is_undercover`), turn messages (`last_message`), and vote resolution
/// (`eliminated`); removed on disconnect or explicit quit. Per-round
/// fields reset only through [`SessionRegistry::reset_all`].
///
/// [`SessionRegistry::reset_all`]: crate::SessionRegistry::reset_all
#[derive(Debug, Clone)]
pub struct PlayerSession {
    /// Server-assigned identity, unique for the process lifetime.
    pub id: PlayerId,

    /// Display name supplied at join time. Not validated for uniqueness.
    pub name: String,

    /// At most one session in the registry holds `true` at any time.
    pub is_host: bool,

    /// The word assigned for the current round; empty before a round
    /// starts.
    pub word: String,

    /// True for exactly one session per round once roles are assigned.
    pub is_undercover: bool,

    /// Set only by vote resolution; cleared only by an explicit reset.
    pub eliminated: bool,

    /// Most recent describing-turn text, kept for display.
    pub last_message: String,
}

impl PlayerSession {
    pub(crate) fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            word: String::new(),
            is_undercover: false,
            eliminated: false,
            last_message: String::new(),
        }
    }

    /// The wire-format roster entry for this session.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            is_host: self.is_host,
        }
    }

    /// Clears the per-round fields, preserving identity.
    pub(crate) fn reset_round(&mut self) {
        self.word.clear();
        self.is_undercover = false;
        self.eliminated = false;
        self.last_message.clear();
    }
}
