//! The dispatcher: best-effort delivery of messages to sessions.
//!
//! Each connection owns an unbounded outbound queue drained by its
//! writer task. The dispatcher only enqueues — actual socket writes
//! happen outside the game-state critical section, so a slow or dead
//! peer never stalls a state transition or another player's delivery.

use std::collections::HashMap;

use oddword_protocol::{Message, PlayerId};
use tokio::sync::mpsc;

/// Per-player outbound queues.
#[derive(Debug, Default)]
pub struct Dispatcher {
    senders: HashMap<PlayerId, mpsc::UnboundedSender<Message>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound queue for a newly accepted connection.
    pub fn attach(&mut self, id: PlayerId, sender: mpsc::UnboundedSender<Message>) {
        self.senders.insert(id, sender);
    }

    /// Drops the outbound queue for a closed connection.
    pub fn detach(&mut self, id: PlayerId) {
        self.senders.remove(&id);
    }

    /// Enqueues a message for one session. A missing or closed queue is
    /// logged and swallowed — one session's failure never reaches the
    /// caller or the other sessions.
    pub fn send_to(&self, id: PlayerId, msg: &Message) {
        match self.senders.get(&id) {
            Some(sender) => {
                if sender.send(msg.clone()).is_err() {
                    tracing::debug!(player_id = %id, "outbound queue closed, dropping message");
                }
            }
            None => {
                tracing::debug!(player_id = %id, "no outbound queue, dropping message");
            }
        }
    }

    /// Enqueues a message for every id, in the given (registry) order.
    /// Partial failure of some recipients does not abort the rest.
    pub fn broadcast(&self, ids: &[PlayerId], msg: &Message) {
        for id in ids {
            self.send_to(*id, msg);
        }
    }
}
