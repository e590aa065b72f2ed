//! # Oddword
//!
//! Authoritative server for "who holds the different word": N clients
//! connect over TCP, one secretly receives the paired outlier word,
//! players describe their word in turns, then vote to eliminate a
//! suspect until a win condition lands.
//!
//! The server is the single authority — clients are renderers of the
//! broadcast events and hold no transition logic of their own.
//!
//! ## Layers
//!
//! ```text
//! oddword-transport   raw TCP byte streams
//! oddword-protocol    line-framed JSON messages
//! oddword-session     roster registry (who is connected, in order)
//! oddword-game        turn/voting state machine, word allocator
//! oddword (this)      connection supervisor + dispatcher + binary
//! ```
//!
//! ## Concurrency model
//!
//! One task per connection. All of them mutate a single shared
//! `GameSession` aggregate behind one mutex; outbound delivery goes
//! through per-connection queues so
//! socket writes happen outside the critical section with a snapshot
//! taken inside it.

mod dispatcher;
mod error;
mod handler;
mod server;
mod state;

pub use dispatcher::Dispatcher;
pub use error::ServerError;
pub use server::{GameServer, GameServerBuilder};
