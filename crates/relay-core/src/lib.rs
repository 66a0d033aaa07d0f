//! # relay-core
//!
//! Shared library for Pointer Relay containing the wire protocol types, the
//! text-frame codec, and the access-control policies applied to every
//! connection.
//!
//! This crate is used by the relay server and by companion tooling.
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! Pointer Relay turns a phone or tablet into a wireless trackpad: a
//! companion app connects to the host over the local network, proves it knows
//! the shared secret token, and then streams pointer commands (absolute move,
//! relative move, click, scroll) that the host injects into its own cursor.
//!
//! This crate (`relay-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – What travels over the wire.  Every frame is a small
//!   JSON object with a `"type"` discriminator; the codec turns frames into
//!   typed Rust values and back.
//!
//! - **`security`** – The three policies that gate a connection: the network
//!   guard (only local-network peers may connect), the auth manager (one
//!   shared secret per host), and the rate limiter (a server-wide budget on
//!   pointer events).
//!
//! Everything here is pure logic, so the server crate can exercise it in
//! plain unit tests without opening a socket.

pub mod protocol;
pub mod security;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::RelayCommand` instead of `relay_core::protocol::messages::RelayCommand`.
pub use protocol::codec::{
    decode_command, decode_response, encode_command, encode_response, ProtocolError,
};
pub use protocol::messages::{
    ClickType, MouseButton, RelayCommand, RelayResponse, PROTOCOL_VERSION,
};
pub use security::auth::{AuthManager, TokenStore};
pub use security::guard::NetworkGuard;
pub use security::rate::{RateLimiter, DEFAULT_MAX_EVENTS_PER_SECOND};
