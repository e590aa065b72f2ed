//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
///
/// A `Decode` error applies to a single frame only — the framing layer
/// discards the offending frame and resumes at the next delimiter, so
/// one malformed message never costs a connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, a missing field, or an
    /// unknown `type` discriminator.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
