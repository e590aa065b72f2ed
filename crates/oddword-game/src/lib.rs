//! Game rules for Oddword: turn rotation, voting, and win conditions.
//!
//! # Key types
//!
//! - [`GameMachine`] — the authoritative phase/turn/vote state machine
//! - [`VoteLedger`] — one active vote per voter, tallies derived
//! - [`WordDeck`] / [`pick_assignment`] — the word allocator
//! - [`GamePhase`] — Lobby → Playing → Voting → Result
//! - [`GameConfig`] — rejection-feedback policy
//!
//! Every operation is a deterministic function of (phase, event, roster
//! snapshot). The single random draw happens at round start and is
//! injected as an `Rng`, which doubles as the deterministic test seam.
//! Operations return `(Recipient, Message)` pairs; delivering them is
//! the dispatcher's problem, so the machine never touches a socket.

mod config;
mod error;
mod machine;
mod vote;
mod words;

pub use config::{GameConfig, GamePhase};
pub use error::GameError;
pub use machine::{GameMachine, Outbound};
pub use vote::VoteLedger;
pub use words::{RoundAssignment, WordDeck, WordPair, pick_assignment};
