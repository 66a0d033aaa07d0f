//! JSON message types for the companion-facing wire protocol.
//!
//! The companion app (phone or tablet) and the relay host exchange WebSocket
//! text frames.  Each frame is a single JSON object with a `"type"` field
//! that identifies the message; all other fields sit flat in the same object.
//!
//! # Message flow
//!
//! ```text
//! Companion → Host:  JSON text frame  →  RelayCommand
//! Host → Companion:  RelayResponse    →  JSON text frame
//! ```
//!
//! The host only ever answers auth outcomes and malformed frames.  Pointer
//! commands that are dispatched successfully produce no response at all,
//! which keeps the hot path (a continuous stream of `moveBy` frames while a
//! finger is on the glass) a one-way flood.
//!
//! # JSON discriminant
//!
//! ```json
//! {"type":"auth","token":"..."}
//! {"type":"moveTo","x":100.0,"y":200.0}
//! {"type":"moveBy","dx":10.5,"dy":-3.2}
//! {"type":"click","button":"left","clickType":"click"}
//! {"type":"scroll","dx":0,"dy":-5}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles the discriminator
//! automatically, so decoding is an exhaustive match over known variants:
//! an unknown or missing `"type"` is a hard decode error, never a fallback.

use serde::{Deserialize, Serialize};

/// Version of the companion wire protocol this host speaks.
///
/// Carried in discovery advertisements so a companion can refuse to pair
/// with a host it does not understand.
pub const PROTOCOL_VERSION: u32 = 1;

// ── Companion → Host commands ─────────────────────────────────────────────────

/// All commands a companion device can send to the relay host.
///
/// The first frame on every connection must be [`RelayCommand::Auth`]; the
/// session layer closes the connection if anything else arrives first.
///
/// # Serde representation
///
/// ```json
/// {"type":"auth","token":"8f14e45f-ceea-467f-a34e-cbb70f7a2d78"}
/// {"type":"moveBy","dx":4.0,"dy":-2.5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
// `tag = "type"` means serde will look for a `"type"` field in the JSON object
// to determine which enum variant to use when deserializing.
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RelayCommand {
    /// Companion proves it knows the shared secret.
    ///
    /// Must be the first command of the session.  Sending it again after a
    /// successful handshake is harmless and answered with
    /// `{"success":true,"message":"Already authenticated"}`.
    Auth {
        /// The shared secret token, exactly as printed by the host at startup.
        token: String,
    },

    /// Move the cursor to an absolute screen position.
    MoveTo {
        /// Target X in the host's global coordinate space (pixels).
        x: f64,
        /// Target Y in the host's global coordinate space (pixels).
        y: f64,
    },

    /// Move the cursor relative to where it currently is.
    ///
    /// This is the trackpad hot path; deltas are fractional because the
    /// companion scales raw touch deltas by its own sensitivity setting.
    MoveBy {
        /// Horizontal delta in pixels (positive = right).
        dx: f64,
        /// Vertical delta in pixels (positive = down).
        dy: f64,
    },

    /// Press, release, or fully click a mouse button at the current position.
    #[serde(rename_all = "camelCase")]
    Click {
        /// Which button the event applies to.
        button: MouseButton,
        /// Press, release, or a complete press-then-release pair.
        click_type: ClickType,
    },

    /// Scroll by the given wheel deltas at the current position.
    Scroll {
        /// Horizontal scroll delta in pixels (positive = right).
        dx: f64,
        /// Vertical scroll delta in pixels (positive = down).
        dy: f64,
    },
}

// ── Button and click kinds ────────────────────────────────────────────────────

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Center,
}

/// What kind of button event a [`RelayCommand::Click`] describes.
///
/// `Down`/`Up` let the companion implement drag gestures (finger down, move,
/// finger up); `Click` is the common tap, a press immediately followed by a
/// release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickType {
    Down,
    Up,
    Click,
}

// ── Host → Companion responses ────────────────────────────────────────────────

/// The host's answer to an auth attempt or a malformed frame.
///
/// The `message` field is omitted from the JSON entirely when absent, so a
/// bare success serializes as `{"success":true}`.
///
/// # Serde representation
///
/// ```json
/// {"success":true,"message":"Authenticated"}
/// {"success":false,"message":"Invalid token"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Whether the companion's frame was accepted.
    pub success: bool,
    /// Human-readable detail, for companion UI and debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayResponse {
    /// A success response with a detail message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    /// A failure response with a detail message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
