//! Party Join Protocol
//!
//! Client-side handshake for joining a remote peer's in-progress
//! session. Policy lives here; wire format and delivery live in
//! `network/`, engine effects behind the traits in `engine/`.

pub mod handshake;
pub mod state;

pub use handshake::{HandshakeError, HandshakeReject, PartyHandshake};
pub use state::{PendingHandshake, PendingSlot};
