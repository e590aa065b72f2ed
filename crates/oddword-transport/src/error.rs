/// Errors that can occur in the transport layer.
///
/// Every variant is scoped to one listener or one connection — a send
/// failure on one socket never says anything about the others.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening endpoint failed (e.g. address in use).
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Accepting an inbound connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
