//! Infrastructure layer for relay-server.
//!
//! Contains everything that touches the outside world: sockets, the
//! filesystem, and the OS pointer APIs.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `relay_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`ws_server`** – TCP accept loop, local-network gate, and the
//!   per-connection WebSocket read/write loop that drives a `Session`.
//!
//! - **`pointer`** – OS-specific implementations of `PointerDevice`.  The
//!   correct implementation is selected at compile time using
//!   `#[cfg(target_os)]`.  A `MockPointerDevice` is also provided for tests.
//!
//! - **`token_file`** – file-backed `TokenStore` that persists the auth
//!   token under the user's config directory.
//!
//! - **`storage`** – TOML config file load/save.
//!
//! - **`discovery`** – UDP probe responder so companion apps can find the
//!   host on the LAN without typing its IP address.

pub mod discovery;
pub mod pointer;
pub mod storage;
pub mod token_file;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use discovery::start_discovery_responder;
pub use ws_server::{run_server, RelayState};
