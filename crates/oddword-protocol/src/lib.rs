//! Wire protocol for Oddword.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Message`], [`PlayerInfo`], [`Winner`], etc.) — the
//!   structures that travel on the wire.
//! - **Framing** ([`encode_frame`], [`FrameBuffer`]) — how messages are
//!   delimited on a raw byte stream.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Wire format
//!
//! Each message is a compact JSON object with a `type` discriminator,
//! terminated by a single line feed. The delimiter never appears inside
//! a valid frame because JSON string escaping turns embedded newlines
//! into `\n`.
//!
//! ```text
//! {"type":"join","name":"ada","is_host":true}\n
//! ```
//!
//! The protocol layer sits between transport (raw bytes) and the game
//! state machine. It doesn't know about connections or turns — it only
//! knows how to frame and parse messages.

mod codec;
mod error;
mod types;

pub use codec::{FrameBuffer, encode_frame};
pub use error::ProtocolError;
pub use types::{Message, PlayerId, PlayerInfo, Recipient, Winner};
