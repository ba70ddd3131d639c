//! UDP Endpoint
//!
//! Datagram transport carrying bincode `Envelope` frames. A single task
//! owns the socket: inbound datagrams are dispatched through the router
//! inline, one at a time, in arrival order; outbound messages are queued
//! on a channel and drained by the same task.

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::network::protocol::Envelope;
use crate::network::transport::{Router, Transport, TransportError};

/// Endpoint configuration.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Outgoing queue depth.
    pub outgoing_queue: usize,
    /// Largest datagram accepted; longer ones are truncated by the
    /// socket and fail framing.
    pub max_datagram: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:28960".parse().unwrap(),
            outgoing_queue: 64,
            max_datagram: 1400,
        }
    }
}

impl EndpointConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("PARTYLINK_BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            outgoing_queue: std::env::var("PARTYLINK_OUTGOING_QUEUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.outgoing_queue),
            max_datagram: std::env::var("PARTYLINK_MAX_DATAGRAM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_datagram),
        }
    }
}

struct Outgoing {
    target: SocketAddr,
    frame: Vec<u8>,
}

/// Sending handle for a `UdpEndpoint`.
///
/// Cheap to clone and usable from any thread while the endpoint task
/// runs; sends fail with `Closed` once the endpoint is gone.
#[derive(Clone)]
pub struct UdpSender {
    tx: mpsc::Sender<Outgoing>,
}

impl Transport for UdpSender {
    fn send(
        &self,
        target: SocketAddr,
        message: &str,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let frame = Envelope::new(message, payload).to_bytes()?;
        self.tx
            .try_send(Outgoing { target, frame })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => TransportError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
            })
    }
}

/// A bound UDP socket plus the router for its inbound messages.
pub struct UdpEndpoint {
    socket: UdpSocket,
    router: Router,
    config: EndpointConfig,
    outgoing_rx: mpsc::Receiver<Outgoing>,
    sender: UdpSender,
}

impl UdpEndpoint {
    /// Bind the socket and set up the outgoing queue.
    pub async fn bind(config: EndpointConfig) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(config.bind_addr).await?;
        let (tx, outgoing_rx) = mpsc::channel(config.outgoing_queue);
        Ok(Self {
            socket,
            router: Router::new(),
            config,
            outgoing_rx,
            sender: UdpSender { tx },
        })
    }

    /// Address the socket actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Handle for sending through this endpoint.
    pub fn sender(&self) -> UdpSender {
        self.sender.clone()
    }

    /// Register message handlers before starting the endpoint.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Run the endpoint until the socket fails or every sending handle
    /// is dropped and the queue has drained.
    ///
    /// Inbound datagrams are dispatched inline, so handlers observe
    /// messages one at a time in arrival order.
    pub async fn run(self) -> Result<(), TransportError> {
        let UdpEndpoint {
            socket,
            mut router,
            config,
            mut outgoing_rx,
            sender,
        } = self;
        // Dropping the endpoint's own handle lets the queue close once
        // external senders are gone.
        drop(sender);

        info!("endpoint listening on {}", socket.local_addr()?);
        let mut buf = vec![0u8; config.max_datagram];

        loop {
            tokio::select! {
                received = socket.recv_from(&mut buf) => {
                    let (len, from) = received?;
                    match Envelope::from_bytes(&buf[..len]) {
                        Ok(envelope) => {
                            router.dispatch(from, &envelope.name, &envelope.payload);
                        }
                        Err(err) => {
                            debug!("unframeable datagram from {} ({} bytes): {}", from, len, err);
                        }
                    }
                }
                queued = outgoing_rx.recv() => {
                    match queued {
                        Some(out) => {
                            if let Err(err) = socket.send_to(&out.frame, out.target).await {
                                warn!("send to {} failed: {}", out.target, err);
                            }
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::engine::{JoinAction, LoggingJoin, StaticSessionMetadata, Unrestricted};
    use crate::party::handshake::PartyHandshake;

    fn ephemeral() -> EndpointConfig {
        EndpointConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..EndpointConfig::default()
        }
    }

    struct ChannelJoin(mpsc::UnboundedSender<(SocketAddr, String, String)>);

    impl JoinAction for ChannelJoin {
        fn perform_join(&self, target: SocketAddr, mapname: &str, gametype: &str) {
            let _ = self
                .0
                .send((target, mapname.to_string(), gametype.to_string()));
        }
    }

    #[tokio::test]
    async fn test_named_message_delivery() {
        let mut receiver = UdpEndpoint::bind(ephemeral()).await.unwrap();
        let sender_endpoint = UdpEndpoint::bind(ephemeral()).await.unwrap();
        let receiver_addr = receiver.local_addr().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        receiver.router_mut().on("ping", move |from, payload| {
            let _ = tx.send((from, payload.to_vec()));
        });

        let sender = sender_endpoint.sender();
        tokio::spawn(receiver.run());
        tokio::spawn(sender_endpoint.run());

        sender.send(receiver_addr, "ping", b"hello").unwrap();

        let (_, payload) = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn test_endpoint_pair_completes_handshake() {
        let mut host = UdpEndpoint::bind(ephemeral()).await.unwrap();
        let mut client = UdpEndpoint::bind(ephemeral()).await.unwrap();
        let host_addr = host.local_addr().unwrap();

        let host_party = Arc::new(PartyHandshake::new(
            Arc::new(host.sender()),
            Arc::new(StaticSessionMetadata::new("dm", "mp_rust")),
            Arc::new(LoggingJoin),
            Arc::new(Unrestricted),
        ));
        host_party.register(host.router_mut());

        let (join_tx, mut join_rx) = mpsc::unbounded_channel();
        let client_party = Arc::new(PartyHandshake::new(
            Arc::new(client.sender()),
            Arc::new(StaticSessionMetadata::default()),
            Arc::new(ChannelJoin(join_tx)),
            Arc::new(Unrestricted),
        ));
        client_party.register(client.router_mut());

        tokio::spawn(host.run());
        tokio::spawn(client.run());

        client_party.initiate(host_addr).unwrap();

        let (joined, mapname, gametype) = timeout(Duration::from_secs(5), join_rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        assert_eq!(joined, host_addr);
        assert_eq!(mapname, "mp_rust");
        assert_eq!(gametype, "dm");
    }

    #[tokio::test]
    async fn test_send_after_endpoint_drop_reports_closed() {
        let endpoint = UdpEndpoint::bind(ephemeral()).await.unwrap();
        let sender = endpoint.sender();
        drop(endpoint);

        let result = sender.send("127.0.0.1:1".parse().unwrap(), "ping", b"x");
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn test_config_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.bind_addr.port(), 28960);
        assert!(config.outgoing_queue > 0);
        assert!(config.max_datagram >= 1200);
    }
}
