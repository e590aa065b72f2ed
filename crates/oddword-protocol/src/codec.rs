//! Line framing: turning a raw byte stream into discrete messages.
//!
//! Each frame is one JSON-encoded [`Message`] followed by a single line
//! feed. [`FrameBuffer`] is the incremental half: reads arrive in
//! arbitrary chunks, partial frames are buffered until the delimiter
//! shows up, and several complete frames in one read all decode before
//! yielding control.

use crate::{Message, ProtocolError};

/// Encodes one message as a delimited frame, ready to write to a socket.
///
/// JSON string escaping guarantees the delimiter byte never occurs
/// inside the encoded body.
pub fn encode_frame(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    let mut bytes = serde_json::to_vec(msg).map_err(ProtocolError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Incremental, resumable frame decoder for one connection.
///
/// Feed every read into [`extend`](Self::extend), then drain complete
/// frames with [`next_frame`](Self::next_frame):
///
/// ```
/// use oddword_protocol::{FrameBuffer, Message};
///
/// let mut buf = FrameBuffer::new();
/// buf.extend(b"{\"type\":\"quit\"}\n{\"type\":\"sta");
/// assert_eq!(buf.next_frame().unwrap().unwrap(), Message::Quit);
/// assert!(buf.next_frame().is_none()); // rest is still partial
/// buf.extend(b"rt_game\"}\n");
/// assert_eq!(buf.next_frame().unwrap().unwrap(), Message::StartGame);
/// ```
///
/// A malformed frame yields `Some(Err(_))` for that frame only; the
/// buffer resumes at the next delimiter, so the caller can log and keep
/// the connection alive.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of raw bytes from the stream.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete frame, if one is buffered.
    ///
    /// Returns `None` when no delimiter is present — the remaining
    /// bytes stay buffered for the next read.
    pub fn next_frame(&mut self) -> Option<Result<Message, ProtocolError>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let frame: Vec<u8> = self.buf.drain(..=pos).collect();
        let body = &frame[..frame.len() - 1];
        Some(serde_json::from_slice(body).map_err(ProtocolError::Decode))
    }

    /// Number of buffered bytes not yet forming a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerId;

    fn frame(msg: &Message) -> Vec<u8> {
        encode_frame(msg).unwrap()
    }

    #[test]
    fn encode_appends_single_delimiter() {
        let bytes = frame(&Message::Quit);
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn embedded_newline_is_escaped_not_framed() {
        // A chat line containing a literal newline must not split the
        // frame in two.
        let msg = Message::ChatMessage {
            message: "line one\nline two".into(),
        };
        let bytes = frame(&msg);
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);

        let mut buf = FrameBuffer::new();
        buf.extend(&bytes);
        assert_eq!(buf.next_frame().unwrap().unwrap(), msg);
    }

    #[test]
    fn partial_frame_is_buffered_across_reads() {
        let bytes = frame(&Message::NextTurn { current_turn: 3 });
        let (a, b) = bytes.split_at(7);

        let mut buf = FrameBuffer::new();
        buf.extend(a);
        assert!(buf.next_frame().is_none());
        assert_eq!(buf.pending(), 7);

        buf.extend(b);
        assert_eq!(
            buf.next_frame().unwrap().unwrap(),
            Message::NextTurn { current_turn: 3 }
        );
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn multiple_frames_in_one_read_all_decode() {
        let mut bytes = frame(&Message::StartGame);
        bytes.extend(frame(&Message::Vote {
            voter_id: None,
            target_id: PlayerId(2),
        }));
        bytes.extend(frame(&Message::Quit));

        let mut buf = FrameBuffer::new();
        buf.extend(&bytes);
        assert_eq!(buf.next_frame().unwrap().unwrap(), Message::StartGame);
        assert!(matches!(
            buf.next_frame().unwrap().unwrap(),
            Message::Vote { target_id: PlayerId(2), .. }
        ));
        assert_eq!(buf.next_frame().unwrap().unwrap(), Message::Quit);
        assert!(buf.next_frame().is_none());
    }

    #[test]
    fn malformed_frame_is_dropped_and_decoding_resumes() {
        let mut bytes = b"this is not json\n".to_vec();
        bytes.extend(frame(&Message::Quit));

        let mut buf = FrameBuffer::new();
        buf.extend(&bytes);
        assert!(matches!(
            buf.next_frame(),
            Some(Err(ProtocolError::Decode(_)))
        ));
        // The bad frame cost nothing but itself.
        assert_eq!(buf.next_frame().unwrap().unwrap(), Message::Quit);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let mut buf = FrameBuffer::new();
        assert!(buf.next_frame().is_none());
    }
}
