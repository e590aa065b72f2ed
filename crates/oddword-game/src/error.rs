//! Error types for the game layer.

/// Errors that can occur in game configuration and round setup.
///
/// A round-start failure is fatal to that attempt only — the server
/// stays up and the game stays in its current phase.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The word pool has no pairs to draw from.
    #[error("word deck is empty")]
    EmptyDeck,

    /// A round cannot start with nobody in the roster.
    #[error("cannot start a round with an empty roster")]
    EmptyRoster,

    /// Reading a word deck file failed.
    #[error("failed to read word deck: {0}")]
    DeckIo(#[from] std::io::Error),

    /// A word deck line was not a `majority,outlier` pair.
    #[error("malformed word pair at line {line}")]
    DeckParse { line: usize },
}
