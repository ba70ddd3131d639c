//! Pending Handshake State
//!
//! Single-slot record of the one outstanding connection attempt. A new
//! initiation overwrites the slot; nothing ever clears it. There is no
//! queue - the product supports one in-flight join attempt at a time.

use std::net::SocketAddr;
use std::sync::Mutex;

use crate::core::challenge::Challenge;

/// The outstanding connection attempt: who was asked, and with which
/// challenge.
#[derive(Debug, Clone)]
pub struct PendingHandshake {
    /// Host the connect request was sent to.
    pub target: SocketAddr,
    /// Challenge issued for this attempt.
    pub challenge: Challenge,
}

/// Holder for the pending attempt.
///
/// The slot is written only when a handshake is initiated and read only
/// when a response is verified. The mutex keeps those two atomic even if
/// a transport dispatches handlers from more than one thread.
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingHandshake>>,
}

impl PendingSlot {
    /// An empty slot: no attempt pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot unconditionally, superseding any prior attempt.
    pub fn set(&self, target: SocketAddr, challenge: Challenge) {
        let mut slot = self.inner.lock().expect("pending slot lock poisoned");
        *slot = Some(PendingHandshake { target, challenge });
    }

    /// Read-only copy of the pending attempt, if any.
    pub fn snapshot(&self) -> Option<PendingHandshake> {
        self.inner.lock().expect("pending slot lock poisoned").clone()
    }
}
