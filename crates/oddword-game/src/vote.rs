//! The vote ledger: who currently votes for whom.

use std::collections::BTreeMap;

use oddword_protocol::PlayerId;

/// Maps each voter to the single target they currently have selected.
///
/// A voter has at most one active entry; casting again overwrites. The
/// per-target tally is *derived* from the ledger on demand, so there is
/// no intermediate state where a re-cast vote counts for both targets
/// or for neither.
#[derive(Debug, Default)]
pub struct VoteLedger {
    votes: BTreeMap<PlayerId, PlayerId>,
}

impl VoteLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `voter`'s vote for `target`, replacing any previous
    /// selection. Returns the previous target, if any.
    pub fn cast(&mut self, voter: PlayerId, target: PlayerId) -> Option<PlayerId> {
        self.votes.insert(voter, target)
    }

    /// Removes `voter`'s entry (e.g. when they disconnect mid-vote).
    pub fn retract(&mut self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.remove(&voter)
    }

    /// Per-target vote counts derived from the current entries.
    pub fn tally(&self) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for target in self.votes.values() {
            *counts.entry(*target).or_insert(0) += 1;
        }
        counts
    }

    /// Number of voters with an active entry.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Returns `true` if no votes have been cast.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Discards every entry.
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}
