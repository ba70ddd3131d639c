//! Party Handshake
//!
//! Two-message challenge/response exchange for joining a remote party.
//! `initiate` sends a fresh challenge to the target host; the responder
//! echoes it back together with its session metadata; the verifier acts
//! on a response only when it comes from the pending target, carries the
//! pending challenge, and the responder could actually answer.

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::challenge::Challenge;
use crate::engine::{JoinAction, ModeGuard, SessionMetadata};
use crate::network::protocol::{SessionInfo, MSG_CONNECT_REQUEST, MSG_CONNECT_RESPONSE};
use crate::network::transport::{Router, Transport, TransportError};
use crate::party::state::{PendingHandshake, PendingSlot};

/// Operational failures while starting or answering a handshake.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Session info could not be encoded.
    #[error("failed to encode session info: {0}")]
    Encode(#[from] bincode::Error),

    /// Transport refused the outgoing message.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Reasons a connect response is dropped.
///
/// Every rejection is terminal for that response; nothing is retried and
/// nothing propagates past the message handler.
#[derive(Debug, Error)]
pub enum HandshakeReject {
    /// Response from a host nobody currently asked.
    #[error("stray response from {from}, expected {expected:?}")]
    Stray {
        /// Sender of the unsolicited response.
        from: SocketAddr,
        /// Target of the pending attempt, if any.
        expected: Option<SocketAddr>,
    },

    /// Payload did not decode as session info.
    #[error("malformed session info: {0}")]
    Malformed(#[from] bincode::Error),

    /// Responder explicitly declined to provide metadata.
    #[error("responder declined: no session metadata available")]
    Declined,

    /// Echoed challenge does not match the pending one.
    #[error("challenge mismatch")]
    ChallengeMismatch,
}

/// The handshake protocol handler.
///
/// Owns the pending-attempt slot and the collaborator seams. One
/// instance per client; independent instances share no state.
pub struct PartyHandshake {
    transport: Arc<dyn Transport>,
    metadata: Arc<dyn SessionMetadata>,
    join: Arc<dyn JoinAction>,
    guard: Arc<dyn ModeGuard>,
    pending: PendingSlot,
}

impl PartyHandshake {
    /// Create a handler wired to its collaborators.
    pub fn new(
        transport: Arc<dyn Transport>,
        metadata: Arc<dyn SessionMetadata>,
        join: Arc<dyn JoinAction>,
        guard: Arc<dyn ModeGuard>,
    ) -> Self {
        Self {
            transport,
            metadata,
            join,
            guard,
            pending: PendingSlot::new(),
        }
    }

    /// Register both message handlers on a router.
    ///
    /// Rejections and send failures are logged here and go no further.
    pub fn register(self: &Arc<Self>, router: &mut Router) {
        let handler = Arc::clone(self);
        router.on(MSG_CONNECT_REQUEST, move |sender, payload| {
            if let Err(err) = handler.handle_request(sender, payload) {
                warn!("failed to answer connect request from {}: {}", sender, err);
            }
        });

        let handler = Arc::clone(self);
        router.on(MSG_CONNECT_RESPONSE, move |sender, payload| {
            if let Err(err) = handler.handle_response(sender, payload) {
                warn!("dropping connect response from {}: {}", sender, err);
            }
        });
    }

    /// Begin a handshake with `target`.
    ///
    /// Supersedes any previously pending attempt. In restricted mode this
    /// is a no-op: no state is touched and nothing is sent.
    pub fn initiate(&self, target: SocketAddr) -> Result<(), HandshakeError> {
        if self.guard.is_restricted() {
            debug!("party join disabled in restricted mode, ignoring connect to {}", target);
            return Ok(());
        }

        let challenge = Challenge::generate();
        self.pending.set(target, challenge.clone());

        info!("requesting party info from {} (challenge {})", target, challenge);
        self.transport
            .send(target, MSG_CONNECT_REQUEST, challenge.as_bytes())?;
        Ok(())
    }

    /// Answer a connect request: echo the challenge, attach local session
    /// metadata.
    ///
    /// All-or-nothing: if either metadata lookup comes back empty the
    /// whole response is marked invalid, but the challenge is still
    /// echoed so the requester can correlate the refusal.
    pub fn handle_request(
        &self,
        sender: SocketAddr,
        challenge: &[u8],
    ) -> Result<(), HandshakeError> {
        let info = self.build_session_info(challenge);
        if !info.valid {
            warn!("session metadata unavailable, declining party request from {}", sender);
        }

        let bytes = info.to_bytes()?;
        self.transport.send(sender, MSG_CONNECT_RESPONSE, &bytes)?;
        Ok(())
    }

    fn build_session_info(&self, challenge: &[u8]) -> SessionInfo {
        let gametype = self.metadata.current_gametype().filter(|s| !s.is_empty());
        let mapname = self.metadata.current_map().filter(|s| !s.is_empty());

        match (mapname, gametype) {
            (Some(mapname), Some(gametype)) => {
                SessionInfo::complete(challenge.to_vec(), mapname, gametype)
            }
            _ => SessionInfo::declined(challenge.to_vec()),
        }
    }

    /// Validate a connect response and, if every check passes, trigger
    /// the join.
    pub fn handle_response(
        &self,
        sender: SocketAddr,
        payload: &[u8],
    ) -> Result<(), HandshakeReject> {
        let pending = match self.pending.snapshot() {
            Some(p) if p.target == sender => p,
            other => {
                return Err(HandshakeReject::Stray {
                    from: sender,
                    expected: other.map(|p| p.target),
                });
            }
        };

        let info = SessionInfo::from_bytes(payload)?;

        if !info.valid {
            return Err(HandshakeReject::Declined);
        }

        if !pending.challenge.matches(&info.challenge) {
            return Err(HandshakeReject::ChallengeMismatch);
        }

        if self.guard.is_restricted() {
            debug!("party join disabled in restricted mode, not joining {}", sender);
            return Ok(());
        }

        info!(
            "party info verified, joining {} (map {:?}, gametype {:?})",
            sender, info.mapname, info.gametype
        );
        self.join.perform_join(sender, &info.mapname, &info.gametype);
        Ok(())
    }

    /// Read-only view of the pending attempt.
    pub fn pending(&self) -> Option<PendingHandshake> {
        self.pending.snapshot()
    }
}
