//! `GameServer` builder and accept loop.
//!
//! This ties the layers together: transport → framing → session →
//! game machine → dispatcher.

use std::sync::Arc;

use oddword_game::{GameConfig, WordDeck};
use oddword_protocol::encode_frame;
use oddword_transport::{Connection, TcpTransport, Transport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, mpsc};

use crate::ServerError;
use crate::handler::handle_connection;
use crate::state::GameSession;

/// Shared server state passed to each connection handler task.
///
/// The whole game aggregate sits behind ONE mutex: registry, machine,
/// vote ledger, and dispatcher mutate together or not at all.
pub struct ServerState {
    pub(crate) session: Mutex<GameSession>,
}

/// Builder for configuring and starting an Oddword server.
///
/// # Example
///
/// ```rust,no_run
/// use oddword::GameServerBuilder;
/// use oddword_game::WordDeck;
///
/// # async fn run() -> Result<(), oddword::ServerError> {
/// let server = GameServerBuilder::new()
///     .bind("[::]:12345")
///     .deck(WordDeck::builtin())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GameServerBuilder {
    bind_addr: String,
    deck: WordDeck,
    game_config: GameConfig,
    rng_seed: Option<u64>,
}

impl GameServerBuilder {
    /// Creates a new builder with the built-in deck and defaults.
    pub fn new() -> Self {
        Self {
            bind_addr: "[::]:12345".to_string(),
            deck: WordDeck::builtin(),
            game_config: GameConfig::default(),
            rng_seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the word deck rounds are drawn from.
    pub fn deck(mut self, deck: WordDeck) -> Self {
        self.deck = deck;
        self
    }

    /// Sets the game configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Seeds the round-start draws, making word and outlier selection
    /// deterministic. Intended for tests.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<GameServer, ServerError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;

        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let state = Arc::new(ServerState {
            session: Mutex::new(GameSession::new(self.deck, self.game_config, rng)),
        });

        Ok(GameServer { transport, state })
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Oddword game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GameServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl GameServer {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop until the process is terminated.
    ///
    /// Each accepted connection synchronously receives the next
    /// identity and an outbound queue, then gets an independent writer
    /// task and receive loop.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("oddword server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let (player_id, outbound) = {
                        let mut session = self.state.session.lock().await;
                        let id = session.registry.allocate_id();
                        let (tx, rx) = mpsc::unbounded_channel();
                        session.dispatcher.attach(id, tx);
                        (id, rx)
                    };
                    tracing::info!(%player_id, conn_id = %conn.id(), "connection accepted");

                    spawn_writer(conn.clone(), player_id, outbound);

                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, player_id, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Spawns the writer task draining one player's outbound queue to the
/// socket. Encoding or write failures end the task; the read side
/// notices the dead connection and runs the disconnect path.
fn spawn_writer(
    conn: oddword_transport::TcpConnection,
    player_id: oddword_protocol::PlayerId,
    mut outbound: mpsc::UnboundedReceiver<oddword_protocol::Message>,
) {
    tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let bytes = match encode_frame(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(%player_id, error = %e, "encode failed, skipping message");
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(%player_id, error = %e, "outbound write failed");
                break;
            }
        }
    });
}
