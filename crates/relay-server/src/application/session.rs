//! The per-connection session state machine.
//!
//! Every accepted connection gets exactly one [`Session`].  The session is
//! the component that understands ordering: a companion must authenticate
//! before anything else, pointer commands are budgeted by the shared rate
//! limiter, and a misstep during the handshake ends the connection.
//!
//! The session performs no I/O of its own.  The WebSocket loop in the
//! infrastructure layer feeds it one text frame at a time through
//! [`Session::handle_frame`] and acts on the returned [`FrameAction`]:
//!
//! ```text
//! frame in ─→ handle_frame ─→ Reply(r)           send r, keep reading
//!                          ─→ ReplyAndClose(r)   send r, close the socket
//!                          ─→ Silent             keep reading
//! ```
//!
//! Keeping the machine free of sockets makes every transition unit-testable
//! without binding a port.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use relay_core::{decode_command, AuthManager, RateLimiter, RelayCommand, RelayResponse};

// ── Pointer device seam ───────────────────────────────────────────────────────

/// Error type for pointer injection operations.
#[derive(Debug, Error)]
pub enum PointerError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("pointer device unavailable: {0}")]
    Unavailable(String),
}

/// Platform-agnostic pointer control trait.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// Implementations must be fast and non-blocking: a session dispatches
/// commands sequentially, so a stalled call stalls that companion's stream.
pub trait PointerDevice: Send + Sync {
    /// Moves the cursor to an absolute position in the host's coordinate space.
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError>;

    /// Moves the cursor relative to its current position.
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), PointerError>;

    /// Presses, releases, or fully clicks a mouse button at the current
    /// cursor position.
    fn click(
        &self,
        button: relay_core::MouseButton,
        click_type: relay_core::ClickType,
    ) -> Result<(), PointerError>;

    /// Scrolls by the given wheel deltas at the current cursor position.
    fn scroll(&self, dx: f64, dy: f64) -> Result<(), PointerError>;
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

/// Where a session is in its lifecycle.
///
/// The only forward paths are `Authenticating → Active` (valid token) and
/// `{Authenticating, Active} → Closed`.  `Closed` is terminal; a companion
/// that wants back in opens a new connection and gets a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the first `auth` frame.
    Authenticating,
    /// Authenticated; pointer commands are accepted.
    Active,
    /// Terminal.  Frames are ignored from here on.
    Closed,
}

/// What the transport loop should do after handing a frame to the session.
#[derive(Debug, PartialEq)]
pub enum FrameAction {
    /// Send this response and keep reading.
    Reply(RelayResponse),
    /// Send this response, then close the connection.
    ReplyAndClose(RelayResponse),
    /// Send nothing and keep reading.
    Silent,
}

/// One connection's state machine: auth gate, rate limiting, dispatch.
///
/// The auth manager and rate limiter are shared across all sessions; the
/// pointer device is shared too since the host has only one cursor.
pub struct Session {
    /// Peer address, for log lines only.
    peer: String,
    state: SessionState,
    auth: Arc<AuthManager>,
    limiter: Arc<RateLimiter>,
    pointer: Arc<dyn PointerDevice>,
}

impl Session {
    /// Creates a session in the `Authenticating` state.
    pub fn new(
        peer: String,
        auth: Arc<AuthManager>,
        limiter: Arc<RateLimiter>,
        pointer: Arc<dyn PointerDevice>,
    ) -> Self {
        Self {
            peer,
            state: SessionState::Authenticating,
            auth,
            limiter,
            pointer,
        }
    }

    /// The lifecycle state this session is currently in.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once the session has reached its terminal state.
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Marks the session closed after a transport-level disconnect or error.
    ///
    /// Idempotent; any frame handed in afterwards is ignored.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            debug!("session {}: closed", self.peer);
            self.state = SessionState::Closed;
        }
    }

    /// Processes one raw text frame and tells the caller how to respond.
    ///
    /// This is the whole protocol.  Decode errors are answered but never
    /// fatal; ordering violations (a pointer command before `auth`, a wrong
    /// token) are answered and then fatal.  Successfully dispatched pointer
    /// commands produce no response at all.
    pub fn handle_frame(&mut self, raw: &str) -> FrameAction {
        if self.is_closed() {
            return FrameAction::Silent;
        }

        let command = match decode_command(raw) {
            Ok(command) => command,
            Err(e) => {
                debug!("session {}: rejected undecodable frame: {e}", self.peer);
                return FrameAction::Reply(RelayResponse::error("Invalid message format"));
            }
        };

        match self.state {
            SessionState::Authenticating => self.handle_handshake(command),
            SessionState::Active => self.handle_command(command),
            // Checked above; a closed session never reaches the handlers.
            SessionState::Closed => FrameAction::Silent,
        }
    }

    /// First-frame handling: only `auth` moves the session forward.
    fn handle_handshake(&mut self, command: RelayCommand) -> FrameAction {
        match command {
            RelayCommand::Auth { token } => {
                if self.auth.validate(&token) {
                    info!("session {}: authenticated", self.peer);
                    self.state = SessionState::Active;
                    FrameAction::Reply(RelayResponse::ok("Authenticated"))
                } else {
                    warn!("session {}: rejected invalid token", self.peer);
                    self.state = SessionState::Closed;
                    FrameAction::ReplyAndClose(RelayResponse::error("Invalid token"))
                }
            }
            other => {
                warn!(
                    "session {}: received '{}' before authentication",
                    self.peer,
                    command_type_name(&other)
                );
                self.state = SessionState::Closed;
                FrameAction::ReplyAndClose(RelayResponse::error("Authentication required"))
            }
        }
    }

    /// Post-handshake handling: rate-limit, then dispatch to the pointer.
    fn handle_command(&mut self, command: RelayCommand) -> FrameAction {
        // A repeated auth is answered before the limiter is consulted, so
        // re-authenticating never eats into the pointer-event budget.
        if matches!(command, RelayCommand::Auth { .. }) {
            debug!("session {}: redundant auth acknowledged", self.peer);
            return FrameAction::Reply(RelayResponse::ok("Already authenticated"));
        }

        if !self.limiter.allow() {
            warn!(
                "session {}: over budget, dropping '{}'",
                self.peer,
                command_type_name(&command)
            );
            return FrameAction::Silent;
        }

        if let Err(e) = self.dispatch(&command) {
            // A pointer failure loses one event, not the connection.
            warn!(
                "session {}: pointer dispatch of '{}' failed: {e}",
                self.peer,
                command_type_name(&command)
            );
        }
        FrameAction::Silent
    }

    fn dispatch(&self, command: &RelayCommand) -> Result<(), PointerError> {
        match command {
            RelayCommand::MoveTo { x, y } => self.pointer.move_to(*x, *y),
            RelayCommand::MoveBy { dx, dy } => self.pointer.move_by(*dx, *dy),
            RelayCommand::Click { button, click_type } => {
                self.pointer.click(*button, *click_type)
            }
            RelayCommand::Scroll { dx, dy } => self.pointer.scroll(*dx, *dy),
            // Auth is answered in the state handlers and never reaches here.
            RelayCommand::Auth { .. } => Ok(()),
        }
    }
}

// ── Helper: command names for log lines ───────────────────────────────────────

/// Returns the wire-protocol discriminator of a command, for log messages.
fn command_type_name(command: &RelayCommand) -> &'static str {
    match command {
        RelayCommand::Auth { .. } => "auth",
        RelayCommand::MoveTo { .. } => "moveTo",
        RelayCommand::MoveBy { .. } => "moveBy",
        RelayCommand::Click { .. } => "click",
        RelayCommand::Scroll { .. } => "scroll",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
