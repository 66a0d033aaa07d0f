//! Application layer for relay-server.
//!
//! The application layer owns the per-connection state machine and the seam
//! to the host's pointer.  It decides *what* happens to each decoded frame,
//! but delegates *how* to the layers around it.
//!
//! # Responsibilities
//!
//! - Driving a connection through authenticate → dispatch → close
//! - Consulting the shared rate limiter before every pointer dispatch
//! - Defining the [`PointerDevice`] trait that the infrastructure layer
//!   implements per platform
//!
//! # What does NOT belong here?
//!
//! - Sockets, accept loops, WebSocket framing (that is infrastructure)
//! - Actual cursor movement (infrastructure `pointer` implementations)
//! - Wire-format encoding and decoding (relay-core)

pub mod session;

// Re-export so callers can write `application::session::Session`
// or more concisely `application::Session`.
pub use session::{FrameAction, PointerDevice, PointerError, Session, SessionState};
