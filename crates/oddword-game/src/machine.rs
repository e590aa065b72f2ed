//! The authoritative turn/voting state machine.
//!
//! `Lobby → Playing → Voting → Result`, with `Playing ↔ Voting` cycling
//! until a win condition lands. Every operation takes the roster as an
//! explicit argument and returns the messages to deliver — the machine
//! owns no sockets, no timers, and no randomness beyond the round-start
//! draw injected by the caller.

use std::collections::BTreeMap;

use oddword_protocol::{Message, PlayerId, Recipient, Winner};
use oddword_session::SessionRegistry;
use rand::Rng;

use crate::{
    GameConfig, GameError, GamePhase, RoundAssignment, VoteLedger, WordDeck,
    pick_assignment,
};

/// Messages produced by one state-machine operation, in delivery order.
pub type Outbound = Vec<(Recipient, Message)>;

/// Owns game phase, turn rotation, the vote ledger, and the round
/// assignment. One instance per server process.
pub struct GameMachine {
    phase: GamePhase,
    /// Position into the ordered roster. While `Playing` this always
    /// resolves to a non-eliminated session.
    current_turn: usize,
    /// Turns completed in the current describing round; resets when a
    /// vote resolution sends the game back to describing.
    turns_taken: u32,
    ledger: VoteLedger,
    assignment: Option<RoundAssignment>,
    config: GameConfig,
}

impl GameMachine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            phase: GamePhase::Lobby,
            current_turn: 0,
            turns_taken: 0,
            ledger: VoteLedger::new(),
            assignment: None,
            config,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Roster position of the player whose turn it is.
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    /// The session currently holding the describing turn.
    pub fn current_holder(&self, registry: &SessionRegistry) -> Option<PlayerId> {
        registry.ids().get(self.current_turn).copied()
    }

    /// Host-issued round start: draws a fresh assignment and enters
    /// `Playing`.
    ///
    /// Non-host issuers and starts outside the lobby are rejected per
    /// the configured feedback policy. An empty deck or roster fails
    /// this attempt only.
    pub fn start_game(
        &mut self,
        issuer: PlayerId,
        registry: &mut SessionRegistry,
        deck: &WordDeck,
        rng: &mut impl Rng,
    ) -> Result<Outbound, GameError> {
        if !registry.get(issuer).is_some_and(|s| s.is_host) {
            return Ok(self.reject(issuer, "only the host can start the game"));
        }
        if self.phase != GamePhase::Lobby {
            return Ok(self.reject(issuer, "the game is already in progress"));
        }
        if registry.is_empty() {
            return Err(GameError::EmptyRoster);
        }
        let assignment = pick_assignment(deck, &registry.ids(), rng)?;
        Ok(self.begin_round(assignment, registry))
    }

    /// Enters `Playing` with a fixed assignment: every session receives
    /// its word and role, the cursor moves to roster position 0, and
    /// each player gets their private `game_start` view.
    ///
    /// [`start_game`](Self::start_game) delegates here after the random
    /// draw; callers that need a predetermined round (tests, scripted
    /// games) can use this directly.
    pub fn begin_round(
        &mut self,
        assignment: RoundAssignment,
        registry: &mut SessionRegistry,
    ) -> Outbound {
        for session in registry.players_mut() {
            session.is_undercover = session.id == assignment.outlier;
            session.word = if session.is_undercover {
                assignment.pair.outlier.clone()
            } else {
                assignment.pair.majority.clone()
            };
        }
        self.phase = GamePhase::Playing;
        self.current_turn = 0;
        self.turns_taken = 0;
        self.ledger.clear();
        tracing::info!(
            outlier = %assignment.outlier,
            players = registry.len(),
            "round started"
        );
        self.assignment = Some(assignment);

        let roster = registry.infos();
        let mut out: Outbound = registry
            .players()
            .map(|s| {
                (
                    Recipient::Player(s.id),
                    Message::GameStart {
                        your_id: s.id,
                        word: s.word.clone(),
                        is_undercover: s.is_undercover,
                        players: roster.clone(),
                    },
                )
            })
            .collect();
        out.push((Recipient::All, Message::NextTurn { current_turn: 0 }));
        out
    }

    /// A describing turn from the current holder: records the text,
    /// broadcasts it, and advances the rotation.
    pub fn take_turn(
        &mut self,
        sender: PlayerId,
        text: String,
        registry: &mut SessionRegistry,
    ) -> Outbound {
        if self.phase != GamePhase::Playing {
            return self.reject(sender, "no describing turn in progress");
        }
        if self.current_holder(registry) != Some(sender) {
            return self.reject(sender, "not your turn");
        }
        if let Some(session) = registry.get_mut(sender) {
            session.last_message = text.clone();
        }
        let mut out: Outbound = vec![(
            Recipient::All,
            Message::NewMessage {
                player_id: sender,
                message: text,
            },
        )];
        out.extend(self.advance_turn(registry));
        out
    }

    /// Free chat, any phase.
    pub fn chat(&self, sender: PlayerId, text: String) -> Outbound {
        vec![(
            Recipient::All,
            Message::NewMessage {
                player_id: sender,
                message: text,
            },
        )]
    }

    /// Records (or re-records) a vote and broadcasts it. When every
    /// registered session has an entry — eliminated players included,
    /// mirroring the original's inclusive count — resolution runs.
    pub fn cast_vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
        registry: &mut SessionRegistry,
    ) -> Outbound {
        if self.phase != GamePhase::Voting {
            return self.reject(voter, "voting is not open");
        }
        if !registry.contains(target) {
            return self.reject(voter, "unknown vote target");
        }
        let previous = self.ledger.cast(voter, target);
        tracing::debug!(
            %voter,
            %target,
            ?previous,
            votes = self.ledger.len(),
            "vote cast"
        );
        let mut out: Outbound = vec![(
            Recipient::All,
            Message::Vote {
                voter_id: Some(voter),
                target_id: target,
            },
        )];
        if self.ledger.len() >= registry.len() {
            out.extend(self.resolve_votes(registry));
        }
        out
    }

    /// Removes a departed player and repairs game state around the gap.
    ///
    /// Always broadcasts `player_left`. In an active phase: fewer than
    /// two survivors aborts the game; otherwise a departed turn holder
    /// forfeits their turn, and a departed voter's ledger entry is
    /// retracted.
    pub fn disconnect(
        &mut self,
        departed: PlayerId,
        registry: &mut SessionRegistry,
    ) -> Outbound {
        let pos = registry.ids().iter().position(|&id| id == departed);
        let Some(session) = registry.remove(departed) else {
            return Vec::new();
        };
        let mut out: Outbound = vec![(
            Recipient::All,
            Message::PlayerLeft {
                player_id: departed,
                player_name: session.name,
            },
        )];

        if !self.phase.is_active() {
            return out;
        }

        if registry.survivor_ids().len() < 2 {
            self.phase = GamePhase::Result;
            tracing::info!("too few active players, aborting game");
            out.push((
                Recipient::All,
                Message::GameOver {
                    winner: Winner::Aborted,
                    undercover_id: None,
                    player_words: self.player_words(registry),
                },
            ));
            return out;
        }

        match self.phase {
            GamePhase::Playing => {
                let pos = pos.expect("removed session had a roster position");
                let n = registry.len();
                if pos == self.current_turn {
                    // The departed player held the turn: re-anchor one
                    // slot back so the advance lands on their natural
                    // successor.
                    self.current_turn = (pos + n - 1) % n;
                    out.extend(self.advance_turn(registry));
                } else if pos < self.current_turn {
                    self.current_turn -= 1;
                }
            }
            GamePhase::Voting => {
                self.ledger.retract(departed);
            }
            _ => {}
        }
        out
    }

    /// Host-issued reset from `Result` back to the lobby. Clears
    /// per-round session fields; connections stay open.
    pub fn reset(
        &mut self,
        issuer: PlayerId,
        registry: &mut SessionRegistry,
    ) -> Outbound {
        if !registry.get(issuer).is_some_and(|s| s.is_host) {
            return self.reject(issuer, "only the host can restart the game");
        }
        if self.phase != GamePhase::Result {
            return self.reject(issuer, "no finished game to restart");
        }
        registry.reset_all();
        self.phase = GamePhase::Lobby;
        self.current_turn = 0;
        self.turns_taken = 0;
        self.ledger.clear();
        self.assignment = None;
        tracing::info!("game reset to lobby");
        vec![(
            Recipient::All,
            Message::GameReset {
                players: registry.infos(),
            },
        )]
    }

    /// Moves the cursor to the next non-eliminated roster position,
    /// cyclically, or enters `Voting` once every roster slot has had
    /// two turns this round.
    ///
    /// The search terminates because `Voting`/`Result` are entered
    /// before a state with zero survivors can occur.
    fn advance_turn(&mut self, registry: &SessionRegistry) -> Outbound {
        let roster: Vec<_> = registry.players().collect();
        let n = roster.len();
        if n == 0 {
            return Vec::new();
        }
        self.turns_taken += 1;
        if self.turns_taken >= 2 * n as u32 {
            self.phase = GamePhase::Voting;
            self.ledger.clear();
            tracing::info!(turns = self.turns_taken, "describing over, voting begins");
            return vec![(Recipient::All, Message::VotingStart)];
        }
        let mut idx = (self.current_turn + 1) % n;
        while roster[idx].eliminated {
            idx = (idx + 1) % n;
        }
        self.current_turn = idx;
        vec![(Recipient::All, Message::NextTurn { current_turn: idx })]
    }

    /// Tallies the ledger and applies the outcome: a unique maximum
    /// eliminates that player and may end the game; a tie (or no votes)
    /// eliminates nobody. Either way the ledger is cleared and, if no
    /// win condition fired, play resumes with a fresh describing round.
    fn resolve_votes(&mut self, registry: &mut SessionRegistry) -> Outbound {
        let tally = self.ledger.tally();
        let max_votes = tally.values().copied().max().unwrap_or(0);
        let candidates: Vec<PlayerId> = tally
            .iter()
            .filter(|&(_, &count)| count == max_votes)
            .map(|(&id, _)| id)
            .collect();
        self.ledger.clear();

        let Some(outlier) = self.assignment.as_ref().map(|a| a.outlier) else {
            return Vec::new();
        };

        if let [eliminated] = candidates[..] {
            if let Some(session) = registry.get_mut(eliminated) {
                session.eliminated = true;
            }
            tracing::info!(
                player_id = %eliminated,
                votes = max_votes,
                "player eliminated"
            );

            if eliminated == outlier {
                return self.finish(Winner::Majority, Some(outlier), registry);
            }
            let survivors = registry.survivor_ids();
            if survivors.len() <= 2 && survivors.contains(&outlier) {
                return self.finish(Winner::Outlier, Some(outlier), registry);
            }
        } else {
            tracing::info!(candidates = candidates.len(), "vote tied, nobody eliminated");
        }

        self.phase = GamePhase::Playing;
        self.turns_taken = 0;
        self.advance_turn(registry)
    }

    fn finish(
        &mut self,
        winner: Winner,
        undercover_id: Option<PlayerId>,
        registry: &SessionRegistry,
    ) -> Outbound {
        self.phase = GamePhase::Result;
        tracing::info!(%winner, "game over");
        vec![(
            Recipient::All,
            Message::GameOver {
                winner,
                undercover_id,
                player_words: self.player_words(registry),
            },
        )]
    }

    /// Every registered player's true word, for the `game_over` reveal.
    fn player_words(&self, registry: &SessionRegistry) -> BTreeMap<PlayerId, String> {
        registry
            .players()
            .map(|s| (s.id, s.word.clone()))
            .collect()
    }

    fn reject(&self, who: PlayerId, why: &str) -> Outbound {
        tracing::debug!(player_id = %who, why, "command rejected");
        if self.config.notify_rejections {
            vec![(
                Recipient::Player(who),
                Message::Error {
                    message: why.to_string(),
                },
            )]
        } else {
            Vec::new()
        }
    }
}

impl Default for GameMachine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WordPair;

    fn roster(n: u64) -> SessionRegistry {
        let mut reg = SessionRegistry::new();
        for i in 1..=n {
            let id = reg.allocate_id();
            reg.join(id, format!("player-{i}"), i == 1).unwrap();
        }
        reg
    }

    fn fixed(outlier: u64) -> RoundAssignment {
        RoundAssignment {
            pair: WordPair::new("apple", "pear"),
            outlier: PlayerId(outlier),
        }
    }

    #[test]
    fn non_host_start_is_silently_rejected() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        let mut rng = rand::rng();
        let out = machine
            .start_game(PlayerId(2), &mut reg, &WordDeck::builtin(), &mut rng)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(machine.phase(), GamePhase::Lobby);
    }

    #[test]
    fn rejection_feedback_is_configurable() {
        let mut reg = roster(3);
        let mut machine = GameMachine::new(GameConfig {
            notify_rejections: true,
        });
        let mut rng = rand::rng();
        let out = machine
            .start_game(PlayerId(2), &mut reg, &WordDeck::builtin(), &mut rng)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(
            &out[0],
            (Recipient::Player(PlayerId(2)), Message::Error { .. })
        ));
    }

    #[test]
    fn begin_round_assigns_words_and_one_outlier() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        let out = machine.begin_round(fixed(2), &mut reg);

        assert_eq!(machine.phase(), GamePhase::Playing);
        assert_eq!(machine.current_holder(&reg), Some(PlayerId(1)));

        assert_eq!(reg.get(PlayerId(1)).unwrap().word, "apple");
        assert_eq!(reg.get(PlayerId(2)).unwrap().word, "pear");
        assert!(reg.get(PlayerId(2)).unwrap().is_undercover);
        assert_eq!(reg.players().filter(|s| s.is_undercover).count(), 1);

        // Three private game_start views plus the opening next_turn.
        assert_eq!(out.len(), 4);
        assert!(matches!(
            out.last().unwrap(),
            (Recipient::All, Message::NextTurn { current_turn: 0 })
        ));
    }

    #[test]
    fn out_of_turn_message_is_ignored() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        let out = machine.take_turn(PlayerId(3), "me first".into(), &mut reg);
        assert!(out.is_empty());
        assert_eq!(machine.current_holder(&reg), Some(PlayerId(1)));
    }

    #[test]
    fn turn_rotation_skips_eliminated_players() {
        let mut reg = roster(4);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(4), &mut reg);
        reg.get_mut(PlayerId(2)).unwrap().eliminated = true;

        // Player 1 holds the turn; the next holder must be 3, never 2.
        let out = machine.take_turn(PlayerId(1), "round and red".into(), &mut reg);
        assert_eq!(machine.current_holder(&reg), Some(PlayerId(3)));
        assert!(out.iter().any(|(_, m)| matches!(
            m,
            Message::NextTurn { current_turn: 2 }
        )));
    }

    #[test]
    fn take_turn_records_last_message() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        machine.take_turn(PlayerId(1), "grows on trees".into(), &mut reg);
        assert_eq!(reg.get(PlayerId(1)).unwrap().last_message, "grows on trees");
    }

    #[test]
    fn voting_starts_after_two_full_rotations() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        for turn in 0..6 {
            assert_eq!(machine.phase(), GamePhase::Playing, "turn {turn}");
            let holder = machine.current_holder(&reg).unwrap();
            let out = machine.take_turn(holder, format!("turn {turn}"), &mut reg);
            if turn == 5 {
                assert!(out
                    .iter()
                    .any(|(_, m)| matches!(m, Message::VotingStart)));
            }
        }
        assert_eq!(machine.phase(), GamePhase::Voting);
    }

    #[test]
    fn vote_outside_voting_phase_is_ignored() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        let out = machine.cast_vote(PlayerId(1), PlayerId(2), &mut reg);
        assert!(out.is_empty());
    }

    #[test]
    fn tie_with_abstention_eliminates_nobody_and_resumes_play() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);
        machine.phase = GamePhase::Voting;

        // 1→3 and 3→1 with player 2 abstaining; resolution forced.
        machine.ledger.cast(PlayerId(1), PlayerId(3));
        machine.ledger.cast(PlayerId(3), PlayerId(1));
        let out = machine.resolve_votes(&mut reg);

        assert!(reg.players().all(|s| !s.eliminated));
        assert_eq!(machine.phase(), GamePhase::Playing);
        assert!(machine.ledger.is_empty());
        assert!(out
            .iter()
            .any(|(_, m)| matches!(m, Message::NextTurn { .. })));
    }

    #[test]
    fn resolution_with_no_votes_eliminates_nobody() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);
        machine.phase = GamePhase::Voting;

        let out = machine.resolve_votes(&mut reg);
        assert!(reg.players().all(|s| !s.eliminated));
        assert_eq!(machine.phase(), GamePhase::Playing);
        assert!(out
            .iter()
            .any(|(_, m)| matches!(m, Message::NextTurn { .. })));
    }

    #[test]
    fn disconnect_of_turn_holder_advances_past_them() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);
        machine.take_turn(PlayerId(1), "first".into(), &mut reg);
        assert_eq!(machine.current_holder(&reg), Some(PlayerId(2)));

        let out = machine.disconnect(PlayerId(2), &mut reg);

        assert!(matches!(
            &out[0],
            (Recipient::All, Message::PlayerLeft { player_id: PlayerId(2), .. })
        ));
        assert_eq!(machine.phase(), GamePhase::Playing);
        let holder = machine.current_holder(&reg).unwrap();
        assert_ne!(holder, PlayerId(2));
        assert_eq!(holder, PlayerId(3));
    }

    #[test]
    fn disconnect_below_two_survivors_aborts() {
        let mut reg = roster(2);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        let out = machine.disconnect(PlayerId(2), &mut reg);
        assert_eq!(machine.phase(), GamePhase::Result);
        assert!(out.iter().any(|(_, m)| matches!(
            m,
            Message::GameOver {
                winner: Winner::Aborted,
                undercover_id: None,
                ..
            }
        )));
    }

    #[test]
    fn disconnect_in_lobby_only_announces() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        let out = machine.disconnect(PlayerId(2), &mut reg);
        assert_eq!(out.len(), 1);
        assert_eq!(machine.phase(), GamePhase::Lobby);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn disconnect_of_voter_retracts_their_ballot() {
        let mut reg = roster(4);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);
        machine.phase = GamePhase::Voting;
        machine.cast_vote(PlayerId(3), PlayerId(1), &mut reg);

        machine.disconnect(PlayerId(3), &mut reg);
        assert!(machine.ledger.is_empty());
        assert_eq!(machine.phase(), GamePhase::Voting);
    }

    #[test]
    fn reset_requires_result_phase_and_host() {
        let mut reg = roster(3);
        let mut machine = GameMachine::default();
        machine.begin_round(fixed(2), &mut reg);

        // Mid-game reset attempt: ignored.
        assert!(machine.reset(PlayerId(1), &mut reg).is_empty());
        assert_eq!(machine.phase(), GamePhase::Playing);

        machine.phase = GamePhase::Result;
        // Non-host: ignored.
        assert!(machine.reset(PlayerId(2), &mut reg).is_empty());

        let out = machine.reset(PlayerId(1), &mut reg);
        assert_eq!(machine.phase(), GamePhase::Lobby);
        assert!(matches!(&out[0], (Recipient::All, Message::GameReset { players }) if players.len() == 3));
        assert!(reg.players().all(|s| s.word.is_empty() && !s.eliminated));
    }
}
