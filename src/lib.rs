//! # Partylink
//!
//! Client-side challenge/response handshake for joining another peer's
//! in-progress multiplayer session ("party").
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        PARTYLINK                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  └── challenge.rs- Random challenge tokens                   │
//! │                                                              │
//! │  party/          - Handshake protocol                        │
//! │  ├── state.rs    - Pending-attempt slot                      │
//! │  └── handshake.rs- Initiator, responder, verifier            │
//! │                                                              │
//! │  network/        - Wire format and transport                 │
//! │  ├── protocol.rs - Session info codec, message names         │
//! │  ├── transport.rs- Transport trait, message router           │
//! │  └── udp.rs      - UDP datagram endpoint                     │
//! │                                                              │
//! │  engine/         - Host-environment seams                    │
//! │  └── mod.rs      - Metadata, join action, mode guard traits  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trust Model
//!
//! A response is acted on only when it arrives from the host that was
//! actually asked and echoes the exact challenge issued for the current
//! attempt. Everything else - stray hosts, stale responses after a newer
//! attempt, replays, malformed payloads - is logged and dropped without
//! disturbing state. One attempt is pending at a time; a new initiation
//! silently supersedes the old one.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod network;
pub mod party;

// Re-export commonly used types
pub use crate::core::challenge::{Challenge, CHALLENGE_LEN};
pub use crate::engine::{JoinAction, ModeGuard, SessionMetadata};
pub use crate::network::protocol::{SessionInfo, MSG_CONNECT_REQUEST, MSG_CONNECT_RESPONSE};
pub use crate::network::transport::{Router, Transport, TransportError};
pub use crate::network::udp::{EndpointConfig, UdpEndpoint, UdpSender};
pub use crate::party::handshake::{HandshakeError, HandshakeReject, PartyHandshake};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
