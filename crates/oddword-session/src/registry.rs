//! The session registry: every joined player, in roster order.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it is one piece of
//! the single shared game aggregate, guarded by one mutex at a higher
//! level. Keeping it a plain map avoids hidden locking here.

use std::collections::BTreeMap;

use oddword_protocol::{PlayerId, PlayerInfo};

use crate::{PlayerSession, SessionError};

/// Maps player identity to player record, ordered by ascending id.
///
/// The `BTreeMap` ordering is a load-bearing choice: iteration order is
/// the turn order and the broadcast enumeration order, stable and
/// deterministic across the whole server.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: BTreeMap<PlayerId, PlayerSession>,
    next_id: u64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Creates an empty registry. Identities start at 1.
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Assigns the next identity, strictly increasing and never reused
    /// within the process lifetime.
    ///
    /// Called synchronously at accept time, before the client has said
    /// anything — an id is burned even if the connection never joins.
    pub fn allocate_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Registers a joined player under a previously allocated id.
    ///
    /// If a host already exists, `proposed_is_host` is demoted to false
    /// and the second tuple element is `true` so the caller can send the
    /// non-fatal warning to the offending client.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyJoined`] on a duplicate join for
    /// the same id.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: String,
        proposed_is_host: bool,
    ) -> Result<(&PlayerSession, bool), SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyJoined(id));
        }

        let demoted = proposed_is_host && self.host_exists();
        let is_host = proposed_is_host && !demoted;

        let session = PlayerSession::new(id, name, is_host);
        tracing::info!(player_id = %id, is_host, demoted, "player joined");
        self.sessions.insert(id, session);

        Ok((self.sessions.get(&id).expect("just inserted"), demoted))
    }

    /// Removes a session, returning it if present.
    pub fn remove(&mut self, id: PlayerId) -> Option<PlayerSession> {
        let removed = self.sessions.remove(&id);
        if removed.is_some() {
            tracing::info!(player_id = %id, "player removed from roster");
        }
        removed
    }

    /// Looks up a session by id.
    pub fn get(&self, id: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(&id)
    }

    /// Looks up a session by id, mutably.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&id)
    }

    /// Returns `true` if the id has joined.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// All sessions in ascending-id order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values()
    }

    /// All sessions in ascending-id order, mutably.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerSession> {
        self.sessions.values_mut()
    }

    /// Registered ids in roster order.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.sessions.keys().copied().collect()
    }

    /// Wire-format roster entries in roster order.
    pub fn infos(&self) -> Vec<PlayerInfo> {
        self.sessions.values().map(PlayerSession::info).collect()
    }

    /// Ids of non-eliminated sessions, in roster order.
    pub fn survivor_ids(&self) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|s| !s.eliminated)
            .map(|s| s.id)
            .collect()
    }

    /// Returns `true` if any session currently holds host status.
    pub fn host_exists(&self) -> bool {
        self.sessions.values().any(|s| s.is_host)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nobody has joined.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Clears per-round fields on every session (`word`,
    /// `is_undercover`, `eliminated`, `last_message`), preserving `id`,
    /// `name`, and `is_host`.
    pub fn reset_all(&mut self) {
        for session in self.sessions.values_mut() {
            session.reset_round();
        }
    }
}
