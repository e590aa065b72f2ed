//! The word allocator: decks of paired words and the round draw.
//!
//! The encrypted word-list format of the original game is out of scope;
//! a deck is just a non-empty pool of pairs, built in or loaded from a
//! plain-text file.

use std::fs;
use std::path::Path;

use oddword_protocol::PlayerId;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::GameError;

/// One majority/outlier word pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    /// The word everyone except the outlier receives.
    pub majority: String,
    /// The paired word the outlier receives.
    pub outlier: String,
}

impl WordPair {
    pub fn new(majority: impl Into<String>, outlier: impl Into<String>) -> Self {
        Self {
            majority: majority.into(),
            outlier: outlier.into(),
        }
    }
}

/// A non-empty pool of word pairs to draw rounds from.
#[derive(Debug, Clone)]
pub struct WordDeck {
    pairs: Vec<WordPair>,
}

impl WordDeck {
    /// Builds a deck from the given pairs.
    ///
    /// # Errors
    /// Returns [`GameError::EmptyDeck`] when `pairs` is empty — the
    /// emptiness check happens at construction so round starts can rely
    /// on a populated pool.
    pub fn new(pairs: Vec<WordPair>) -> Result<Self, GameError> {
        if pairs.is_empty() {
            return Err(GameError::EmptyDeck);
        }
        Ok(Self { pairs })
    }

    /// A small built-in deck so the server runs without any files.
    pub fn builtin() -> Self {
        let pairs = [
            ("apple", "pear"),
            ("coffee", "tea"),
            ("piano", "violin"),
            ("ocean", "lake"),
            ("novel", "poem"),
            ("soccer", "rugby"),
            ("winter", "autumn"),
            ("bicycle", "scooter"),
        ]
        .into_iter()
        .map(|(a, b)| WordPair::new(a, b))
        .collect();
        Self { pairs }
    }

    /// Loads a deck from a text file: one `majority,outlier` pair per
    /// line; blank lines and `#` comments are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = fs::read_to_string(path)?;
        let mut pairs = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (majority, outlier) = line
                .split_once(',')
                .ok_or(GameError::DeckParse { line: idx + 1 })?;
            let (majority, outlier) = (majority.trim(), outlier.trim());
            if majority.is_empty() || outlier.is_empty() {
                return Err(GameError::DeckParse { line: idx + 1 });
            }
            pairs.push(WordPair::new(majority, outlier));
        }
        Self::new(pairs)
    }

    /// Number of pairs in the deck.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[WordPair] {
        &self.pairs
    }
}

/// The word pair and outlier chosen for one round.
///
/// Recomputed fresh on every round start; consecutive rounds may repeat
/// a pair or an outlier.
#[derive(Debug, Clone)]
pub struct RoundAssignment {
    pub pair: WordPair,
    pub outlier: PlayerId,
}

/// Draws one pair and one outlier id, each uniformly at random.
///
/// # Errors
/// [`GameError::EmptyDeck`] / [`GameError::EmptyRoster`] when a pool is
/// empty. Both are fatal to this round-start attempt only.
pub fn pick_assignment(
    deck: &WordDeck,
    roster_ids: &[PlayerId],
    rng: &mut impl Rng,
) -> Result<RoundAssignment, GameError> {
    let pair = deck.pairs.choose(rng).ok_or(GameError::EmptyDeck)?;
    let outlier = roster_ids.choose(rng).ok_or(GameError::EmptyRoster)?;
    Ok(RoundAssignment {
        pair: pair.clone(),
        outlier: *outlier,
    })
}
