//! Protocol Messages
//!
//! Wire format for the party handshake. Session info travels as bincode
//! for compactness, with a JSON rendering available for debugging ease.
//! The request direction carries no structured payload at all - just the
//! raw challenge bytes.

use serde::{Deserialize, Serialize};

/// Message name for the initiator's challenge datagram.
pub const MSG_CONNECT_REQUEST: &str = "connect-request";

/// Message name for the responder's session info datagram.
pub const MSG_CONNECT_RESPONSE: &str = "connect-response";

// =============================================================================
// SESSION INFO
// =============================================================================

/// Session metadata exchanged during the handshake.
///
/// `mapname` and `gametype` are only meaningful when `valid` is true; a
/// declining responder leaves them empty. The challenge is echoed verbatim
/// from the request so the initiator can correlate the reply with its own
/// pending attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Whether the responder could produce complete metadata.
    pub valid: bool,
    /// Token echoed from the connect request.
    pub challenge: Vec<u8>,
    /// Currently loaded map (empty unless valid).
    pub mapname: String,
    /// Current game mode (empty unless valid).
    pub gametype: String,
}

impl SessionInfo {
    /// Build a complete, joinable response.
    pub fn complete(challenge: Vec<u8>, mapname: String, gametype: String) -> Self {
        Self {
            valid: true,
            challenge,
            mapname,
            gametype,
        }
    }

    /// Build a declined response.
    ///
    /// The challenge is still echoed so the requester's correlation check
    /// stays meaningful even when no metadata is available.
    pub fn declined(challenge: Vec<u8>) -> Self {
        Self {
            valid: false,
            challenge,
            mapname: String::new(),
            gametype: String::new(),
        }
    }

    /// Serialize to the binary wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(&WireSessionInfo::from(self))
    }

    /// Deserialize from the binary wire form.
    ///
    /// Absent `mapname`/`gametype` decode to empty strings rather than an
    /// error; declined responses omit them on the wire.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        let wire: WireSessionInfo = bincode::deserialize(data)?;
        Ok(wire.into())
    }

    /// Serialize to JSON. Debugging only; the wire carries bincode.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&WireSessionInfo::from(self))
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let wire: WireSessionInfo = serde_json::from_str(s)?;
        Ok(wire.into())
    }
}

/// On-the-wire representation.
///
/// Map and gametype are optional so a declined response omits them
/// instead of shipping empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireSessionInfo {
    valid: bool,
    challenge: Vec<u8>,
    mapname: Option<String>,
    gametype: Option<String>,
}

impl From<&SessionInfo> for WireSessionInfo {
    fn from(info: &SessionInfo) -> Self {
        Self {
            valid: info.valid,
            challenge: info.challenge.clone(),
            mapname: (!info.mapname.is_empty()).then(|| info.mapname.clone()),
            gametype: (!info.gametype.is_empty()).then(|| info.gametype.clone()),
        }
    }
}

impl From<WireSessionInfo> for SessionInfo {
    fn from(wire: WireSessionInfo) -> Self {
        Self {
            valid: wire.valid,
            challenge: wire.challenge,
            mapname: wire.mapname.unwrap_or_default(),
            gametype: wire.gametype.unwrap_or_default(),
        }
    }
}

// =============================================================================
// DATAGRAM FRAMING
// =============================================================================

/// A named datagram as carried by the UDP transport.
///
/// The name routes the payload to whatever handler is registered for it;
/// the payload stays opaque to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Message name, e.g. `connect-request`.
    pub name: String,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Wrap a payload under a message name.
    pub fn new(name: &str, payload: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            payload: payload.to_vec(),
        }
    }

    /// Serialize to the datagram wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from the datagram wire form.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_complete_roundtrip() {
        let info = SessionInfo::complete(vec![1, 2, 3], "mp_rust".into(), "dm".into());
        let bytes = info.to_bytes().unwrap();
        assert_eq!(SessionInfo::from_bytes(&bytes).unwrap(), info);
    }

    #[test]
    fn test_declined_roundtrip() {
        let info = SessionInfo::declined(vec![9; 32]);
        let bytes = info.to_bytes().unwrap();
        let decoded = SessionInfo::from_bytes(&bytes).unwrap();
        assert!(!decoded.valid);
        assert_eq!(decoded.challenge, vec![9; 32]);
        assert_eq!(decoded.mapname, "");
        assert_eq!(decoded.gametype, "");
        assert_eq!(decoded, info);
    }

    #[test]
    fn test_absent_fields_decode_to_empty_strings() {
        let wire = WireSessionInfo {
            valid: false,
            challenge: vec![0xAB, 0xCD],
            mapname: None,
            gametype: None,
        };
        let bytes = bincode::serialize(&wire).unwrap();

        let decoded = SessionInfo::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.mapname, "");
        assert_eq!(decoded.gametype, "");
        assert_eq!(decoded.challenge, vec![0xAB, 0xCD]);
    }

    #[test]
    fn test_declined_omits_fields_on_wire() {
        let bytes = SessionInfo::declined(vec![1]).to_bytes().unwrap();
        let wire: WireSessionInfo = bincode::deserialize(&bytes).unwrap();
        assert!(wire.mapname.is_none());
        assert!(wire.gametype.is_none());
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let info = SessionInfo::complete(vec![7; 16], "mp_rust".into(), "dm".into());
        let bytes = info.to_bytes().unwrap();

        assert!(SessionInfo::from_bytes(&bytes[..bytes.len() / 2]).is_err());
        assert!(SessionInfo::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let info = SessionInfo::complete(vec![4, 5], "mp_dome".into(), "sd".into());
        let json = info.to_json().unwrap();
        assert_eq!(SessionInfo::from_json(&json).unwrap(), info);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let envelope = Envelope::new(MSG_CONNECT_REQUEST, &[1, 2, 3, 4]);
        let bytes = envelope.to_bytes().unwrap();
        let decoded = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.name, MSG_CONNECT_REQUEST);
        assert_eq!(decoded.payload, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_envelope_rejects_garbage() {
        assert!(Envelope::from_bytes(&[0xFF; 3]).is_err());
    }

    proptest! {
        #[test]
        fn prop_session_info_roundtrips(
            valid in any::<bool>(),
            challenge in proptest::collection::vec(any::<u8>(), 0..64),
            mapname in "[a-zA-Z0-9_]{0,24}",
            gametype in "[a-zA-Z0-9_]{0,24}",
        ) {
            let info = SessionInfo { valid, challenge, mapname, gametype };
            let bytes = info.to_bytes().unwrap();
            let decoded = SessionInfo::from_bytes(&bytes).unwrap();
            prop_assert_eq!(decoded, info);
        }
    }
}
