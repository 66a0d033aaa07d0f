//! Text-frame codec for the companion wire protocol.
//!
//! Wire format: each WebSocket text frame carries exactly one JSON object
//! with a `"type"` discriminator field, e.g.
//!
//! ```text
//! {"type":"moveBy","dx":10.5,"dy":-3.2}
//! ```
//!
//! The codec is stateless; frames carry no sequence numbers or timestamps.
//! Ordering is inherited from the transport, which delivers frames in order
//! per connection.

use crate::protocol::messages::{RelayCommand, RelayResponse};
use thiserror::Error;

/// Errors that can occur while decoding or encoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not a recognizable command: broken JSON, an unknown or
    /// missing `"type"`, or a missing/ill-typed field.  The inner string is
    /// serde's description, for logs only; it is never sent to the peer.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),

    /// A value could not be serialized to JSON.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one companion command from a WebSocket text frame.
///
/// Any syntactically valid JSON that does not carry a known `"type"` and the
/// exact fields of that variant is rejected.  Extra unknown fields are
/// tolerated so newer companions keep working against older hosts.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidFormat`] if the frame is malformed.
///
/// # Examples
///
/// ```rust
/// use relay_core::protocol::{decode_command, messages::RelayCommand};
///
/// let cmd = decode_command(r#"{"type":"moveBy","dx":4.0,"dy":-2.5}"#).unwrap();
/// assert_eq!(cmd, RelayCommand::MoveBy { dx: 4.0, dy: -2.5 });
///
/// assert!(decode_command("not json at all").is_err());
/// ```
pub fn decode_command(text: &str) -> Result<RelayCommand, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::InvalidFormat(e.to_string()))
}

/// Encodes a command as a JSON text frame.
///
/// Used by companion-side tooling and tests; the host itself only decodes
/// commands.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_command(command: &RelayCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Encodes a host response as a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use relay_core::protocol::{encode_response, messages::RelayResponse};
///
/// let frame = encode_response(&RelayResponse::error("Invalid token")).unwrap();
/// assert_eq!(frame, r#"{"success":false,"message":"Invalid token"}"#);
/// ```
pub fn encode_response(response: &RelayResponse) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes a host response from a JSON text frame.
///
/// The host never receives responses; this is the companion-side half of the
/// codec, kept here so both directions live next to each other.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidFormat`] if the frame is malformed.
pub fn decode_response(text: &str) -> Result<RelayResponse, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::InvalidFormat(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
