//! Network Layer
//!
//! Wire protocol, transport abstraction, and the UDP datagram endpoint.
//! This layer never interprets session metadata - all handshake policy
//! lives in `party/`.

pub mod protocol;
pub mod transport;
pub mod udp;

pub use protocol::{Envelope, SessionInfo, MSG_CONNECT_REQUEST, MSG_CONNECT_RESPONSE};
pub use transport::{MessageHandler, Router, Transport, TransportError};
pub use udp::{EndpointConfig, UdpEndpoint, UdpSender};
