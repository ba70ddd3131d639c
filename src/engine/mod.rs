//! Engine Integration
//!
//! Seams to the host environment: the session metadata lookups a
//! responder needs, the join action that actually loads a verified
//! session, and the restricted-mode guard. The handshake core only ever
//! talks to these traits; adapters for a real engine live with the
//! embedding application.

use std::net::SocketAddr;
use tracing::info;

/// Read-only view of the local session metadata.
pub trait SessionMetadata: Send + Sync {
    /// Name of the current game mode, if one is set.
    fn current_gametype(&self) -> Option<String>;

    /// Name of the currently loaded map, if one is loaded.
    fn current_map(&self) -> Option<String>;
}

/// Performs the actual join once a handshake has been verified.
pub trait JoinAction: Send + Sync {
    /// Load the remote session. `mapname` and `gametype` come from a
    /// verified response.
    fn perform_join(&self, target: SocketAddr, mapname: &str, gametype: &str);
}

/// Gate for contexts where party joining must not run (offline,
/// single-player).
pub trait ModeGuard: Send + Sync {
    /// When true, initiation and the join trigger become no-ops.
    fn is_restricted(&self) -> bool;
}

/// Fixed metadata values, for hosts whose session never changes and for
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionMetadata {
    /// Game mode to report, if any.
    pub gametype: Option<String>,
    /// Map to report, if any.
    pub mapname: Option<String>,
}

impl StaticSessionMetadata {
    /// Metadata with both fields present.
    pub fn new(gametype: &str, mapname: &str) -> Self {
        Self {
            gametype: Some(gametype.to_string()),
            mapname: Some(mapname.to_string()),
        }
    }
}

impl SessionMetadata for StaticSessionMetadata {
    fn current_gametype(&self) -> Option<String> {
        self.gametype.clone()
    }

    fn current_map(&self) -> Option<String> {
        self.mapname.clone()
    }
}

/// Mode guard that never restricts (plain multiplayer context).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl ModeGuard for Unrestricted {
    fn is_restricted(&self) -> bool {
        false
    }
}

/// Join action that only logs the verified session, for demos and hosts
/// that never join anyone themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingJoin;

impl JoinAction for LoggingJoin {
    fn perform_join(&self, target: SocketAddr, mapname: &str, gametype: &str) {
        info!(
            "joining {} (map {:?}, gametype {:?})",
            target, mapname, gametype
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_metadata_reports_values() {
        let metadata = StaticSessionMetadata::new("dm", "mp_rust");
        assert_eq!(metadata.current_gametype().as_deref(), Some("dm"));
        assert_eq!(metadata.current_map().as_deref(), Some("mp_rust"));
    }

    #[test]
    fn test_default_metadata_is_absent() {
        let metadata = StaticSessionMetadata::default();
        assert!(metadata.current_gametype().is_none());
        assert!(metadata.current_map().is_none());
    }

    #[test]
    fn test_unrestricted_guard() {
        assert!(!Unrestricted.is_restricted());
    }
}
