//! Domain layer for relay-server.
//!
//! Pure types with no dependencies on I/O, networking, or external
//! frameworks.  The wire protocol and security policies live in
//! `relay-core`; what remains here is the runtime configuration the rest of
//! the server is wired from.

pub mod config;

pub use config::RelayConfig;
