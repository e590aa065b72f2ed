//! Core protocol types for Oddword's wire format.
//!
//! Every structure in this module is serialized to JSON, framed with a
//! line feed, and sent over the network. [`Message`] is the single
//! tagged union covering every message kind in both directions; each
//! instance is a self-describing event, never partially applied.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Assigned by the server in strictly increasing order starting at 1 and
/// never reused within a process lifetime. `#[serde(transparent)]` makes
/// `PlayerId(42)` serialize as the plain number `42`.
///
/// `Ord` is derived because the roster is kept in ascending-id order —
/// that ordering IS the turn order and the broadcast order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A roster entry as it appears on the wire.
///
/// Embedded in `player_list`, `game_start`, and `game_reset` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive an outbound message.
///
/// State-machine operations return `(Recipient, Message)` pairs; the
/// dispatcher resolves WHERE each one goes. Never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every registered player, in roster order.
    All,
    /// One specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Winner
// ---------------------------------------------------------------------------

/// The outcome reported in a `game_over` broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The outlier was voted out — the majority wins.
    Majority,
    /// Two or fewer players remain and the outlier is among them.
    Outlier,
    /// Too few active players remain to continue (disconnects).
    Aborted,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Majority => write!(f, "majority"),
            Self::Outlier => write!(f, "outlier"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Message — the tagged union of every protocol message
// ---------------------------------------------------------------------------

/// Every message kind on the wire, client-to-server and server-to-client.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces internally
/// tagged JSON with snake_case discriminators:
///
/// ```text
/// { "type": "next_turn", "current_turn": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// C→S: first message on a connection. `is_host` defaults to false
    /// when omitted.
    Join {
        name: String,
        #[serde(default)]
        is_host: bool,
    },

    /// S→C: reply to a join — the existing roster (excluding the joiner),
    /// the joiner's assigned id, and their host status after any demotion.
    PlayerList {
        players: Vec<PlayerInfo>,
        your_id: PlayerId,
        is_host: bool,
    },

    /// S→broadcast: a player joined.
    PlayerJoined {
        id: PlayerId,
        name: String,
        is_host: bool,
    },

    /// S→broadcast: a player left or disconnected.
    PlayerLeft {
        player_id: PlayerId,
        player_name: String,
    },

    /// S→C: a non-fatal condition the client should surface (e.g. host
    /// demotion on join).
    Error { message: String },

    /// C→S (host only): start the round.
    StartGame,

    /// S→C (one per player): the round began. Each player sees only
    /// their own word and role.
    GameStart {
        your_id: PlayerId,
        word: String,
        is_undercover: bool,
        players: Vec<PlayerInfo>,
    },

    /// S→broadcast: whose turn it is, as an index into the roster.
    NextTurn { current_turn: usize },

    /// S→broadcast: describing turns are over, voting begins.
    VotingStart,

    /// C→S (current turn holder only): the sender's description of
    /// their word.
    SendMessage { message: String },

    /// C→S: free chat, any phase.
    ChatMessage { message: String },

    /// S→broadcast: a description or chat line from a player.
    NewMessage {
        player_id: PlayerId,
        message: String,
    },

    /// C→S: cast or change a vote (`voter_id` ignored inbound).
    /// S→broadcast: a vote was cast (`voter_id` filled by the server).
    Vote {
        #[serde(default)]
        voter_id: Option<PlayerId>,
        target_id: PlayerId,
    },

    /// S→broadcast: the round ended. `player_words` reveals every
    /// registered player's true word. `undercover_id` is omitted when
    /// the game was aborted.
    GameOver {
        winner: Winner,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        undercover_id: Option<PlayerId>,
        #[serde(with = "word_map")]
        player_words: BTreeMap<PlayerId, String>,
    },

    /// S→broadcast: the host reset the game back to the lobby.
    GameReset { players: Vec<PlayerInfo> },

    /// C→S: the client is leaving.
    Quit,

    /// C→S (host only): reset the finished game back to the lobby.
    RestartGame,
}

/// JSON object keys are strings, so the id→word reveal map converts
/// keys explicitly ( `{"1": "apple"}` on the wire).
mod word_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::PlayerId;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<PlayerId, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let by_key: BTreeMap<String, &String> =
            map.iter().map(|(id, word)| (id.0.to_string(), word)).collect();
        by_key.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PlayerId, String>, D::Error> {
        let by_key = BTreeMap::<String, String>::deserialize(deserializer)?;
        by_key
            .into_iter()
            .map(|(key, word)| {
                key.parse::<u64>()
                    .map(|id| (PlayerId(id), word))
                    .map_err(|_| D::Error::custom(format!("invalid player id key: {key}")))
            })
            .collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
