//! The shared game aggregate: registry + machine + dispatcher.
//!
//! One `GameSession` per server process, guarded by a single mutex in
//! the server state. Every mutating
//! operation runs to completion under the lock, so no connection ever
//! observes a partially-applied transition, and broadcast payloads are
//! always built from the same snapshot as the write that triggered
//! them. There are no ambient globals — handlers receive the aggregate
//! explicitly.

use oddword_game::{GameConfig, GameMachine, Outbound, WordDeck};
use oddword_protocol::{Message, PlayerId, Recipient};
use oddword_session::SessionRegistry;
use rand::rngs::StdRng;

use crate::dispatcher::Dispatcher;

/// All mutable server-side game state.
pub struct GameSession {
    pub(crate) registry: SessionRegistry,
    pub(crate) machine: GameMachine,
    pub(crate) dispatcher: Dispatcher,
    deck: WordDeck,
    rng: StdRng,
}

impl GameSession {
    pub(crate) fn new(deck: WordDeck, config: GameConfig, rng: StdRng) -> Self {
        Self {
            registry: SessionRegistry::new(),
            machine: GameMachine::new(config),
            dispatcher: Dispatcher::new(),
            deck,
            rng,
        }
    }

    /// Applies one decoded inbound message from `sender`.
    ///
    /// Returns `true` when the connection should close (an explicit
    /// `quit`).
    pub(crate) fn apply(&mut self, sender: PlayerId, msg: Message) -> bool {
        match msg {
            Message::Join { name, is_host } => self.handle_join(sender, name, is_host),
            Message::StartGame => self.handle_start(sender),
            Message::SendMessage { message } => {
                let out = self.machine.take_turn(sender, message, &mut self.registry);
                self.deliver(out);
            }
            Message::ChatMessage { message } => {
                // Pre-join connections have no roster entry and nothing
                // to say to it.
                if self.registry.contains(sender) {
                    let out = self.machine.chat(sender, message);
                    self.deliver(out);
                }
            }
            Message::Vote { target_id, .. } => {
                // voter_id on the inbound copy is ignored; the sender's
                // identity is authoritative.
                let out = self.machine.cast_vote(sender, target_id, &mut self.registry);
                self.deliver(out);
            }
            Message::RestartGame => {
                let out = self.machine.reset(sender, &mut self.registry);
                self.deliver(out);
            }
            Message::Quit => return true,
            _ => {
                tracing::debug!(
                    player_id = %sender,
                    "ignoring server-to-client message kind from client"
                );
            }
        }
        false
    }

    /// A connection ended (clean close, read error, or quit): detach
    /// its queue, drop its session, and let the machine repair the game
    /// around the gap.
    pub(crate) fn connection_closed(&mut self, id: PlayerId) {
        self.dispatcher.detach(id);
        let out = self.machine.disconnect(id, &mut self.registry);
        self.deliver(out);
    }

    fn handle_join(&mut self, sender: PlayerId, name: String, is_host: bool) {
        let (is_host, demoted) = match self.registry.join(sender, name.clone(), is_host) {
            Ok((session, demoted)) => (session.is_host, demoted),
            Err(e) => {
                tracing::debug!(player_id = %sender, error = %e, "join rejected");
                return;
            }
        };

        if demoted {
            self.dispatcher.send_to(
                sender,
                &Message::Error {
                    message: "a host already exists; you joined as a regular player"
                        .to_string(),
                },
            );
        }

        let others = self
            .registry
            .players()
            .filter(|s| s.id != sender)
            .map(|s| s.info())
            .collect();
        self.dispatcher.send_to(
            sender,
            &Message::PlayerList {
                players: others,
                your_id: sender,
                is_host,
            },
        );

        self.deliver(vec![(
            Recipient::All,
            Message::PlayerJoined {
                id: sender,
                name,
                is_host,
            },
        )]);
    }

    fn handle_start(&mut self, sender: PlayerId) {
        match self
            .machine
            .start_game(sender, &mut self.registry, &self.deck, &mut self.rng)
        {
            Ok(out) => self.deliver(out),
            Err(e) => {
                // Fatal to this attempt only; the server and the lobby
                // stay up.
                tracing::warn!(player_id = %sender, error = %e, "round start failed");
                self.dispatcher.send_to(
                    sender,
                    &Message::Error {
                        message: format!("could not start the round: {e}"),
                    },
                );
            }
        }
    }

    /// Resolves recipients against the current roster order and hands
    /// the messages to the dispatcher queues.
    fn deliver(&self, out: Outbound) {
        for (recipient, msg) in out {
            match recipient {
                Recipient::All => {
                    self.dispatcher.broadcast(&self.registry.ids(), &msg);
                }
                Recipient::Player(id) => self.dispatcher.send_to(id, &msg),
            }
        }
    }
}
