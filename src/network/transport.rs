//! Transport Abstraction
//!
//! The handshake core sends named messages through the `Transport` trait
//! and receives them through handlers registered on a `Router`. Delivery
//! is message-oriented and best-effort; loss and duplication are the
//! protocol's problem, not the transport's.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use tracing::debug;

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Socket-level failure.
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Datagram framing failure.
    #[error("failed to encode datagram: {0}")]
    Encode(#[from] bincode::Error),

    /// Outgoing queue is full.
    #[error("outgoing queue full")]
    QueueFull,

    /// Endpoint task has shut down.
    #[error("endpoint closed")]
    Closed,
}

/// Outbound half of a message-oriented transport.
pub trait Transport: Send + Sync {
    /// Send a named message to `target`.
    ///
    /// Returns once the message is queued; delivery is best-effort.
    fn send(&self, target: SocketAddr, message: &str, payload: &[u8])
        -> Result<(), TransportError>;
}

/// Handler invoked per inbound message with the sender address and the
/// raw payload.
pub type MessageHandler = Box<dyn FnMut(SocketAddr, &[u8]) + Send>;

/// Routes inbound messages to the handler registered for their name.
///
/// Exactly one handler per message name; registering a name twice
/// replaces the previous handler. Handlers run inline on the dispatching
/// context, one message at a time, in arrival order.
#[derive(Default)]
pub struct Router {
    handlers: BTreeMap<String, MessageHandler>,
    dropped: u64,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a message name.
    pub fn on<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(SocketAddr, &[u8]) + Send + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    /// Dispatch one inbound message.
    ///
    /// Returns false if no handler is registered for the name; the
    /// message is dropped.
    pub fn dispatch(&mut self, sender: SocketAddr, name: &str, payload: &[u8]) -> bool {
        match self.handlers.get_mut(name) {
            Some(handler) => {
                handler(sender, payload);
                true
            }
            None => {
                self.dropped += 1;
                debug!("dropping message {:?} from {}: no handler", name, sender);
                false
            }
        }
    }

    /// Messages dropped for want of a handler.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
