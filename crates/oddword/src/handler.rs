//! Per-connection receive loop: bytes → frames → game operations.
//!
//! Each accepted connection gets its own task running this handler.
//! The loop reads raw chunks, feeds them to the framing buffer, and
//! applies every decoded message to the shared aggregate under its
//! lock. Disconnection is detected reactively — the read returning
//! end-of-stream or an error — and fed back into the game as an event.

use std::sync::Arc;

use oddword_protocol::{FrameBuffer, PlayerId};
use oddword_transport::{Connection, TcpConnection};

use crate::server::ServerState;

/// Handles one connection from just-after-accept to close. Never
/// returns an error: every failure mode ends in the same disconnect
/// path.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    player_id: PlayerId,
    state: Arc<ServerState>,
) {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, %player_id, "connection handler started");

    let mut frames = FrameBuffer::new();

    'recv: loop {
        let chunk = match conn.recv().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        frames.extend(&chunk);
        while let Some(decoded) = frames.next_frame() {
            let msg = match decoded {
                Ok(msg) => msg,
                Err(e) => {
                    // One bad frame costs itself, not the connection.
                    tracing::debug!(%player_id, error = %e, "dropping malformed frame");
                    continue;
                }
            };

            let quit = state.session.lock().await.apply(player_id, msg);
            if quit {
                tracing::info!(%player_id, "player quit");
                let _ = conn.close().await;
                break 'recv;
            }
        }
    }

    state.session.lock().await.connection_closed(player_id);
    tracing::debug!(%conn_id, %player_id, "connection handler finished");
}
