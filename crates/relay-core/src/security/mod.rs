//! Access-control policies applied to every relay connection.
//!
//! Three independent gates, checked in this order as a connection moves
//! through its lifecycle:
//!
//! 1. [`NetworkGuard`] – at accept time: is the peer on the local network?
//! 2. [`AuthManager`] – on the first frame: does it know the shared secret?
//! 3. [`RateLimiter`] – on every pointer command: is the host being flooded?

pub mod auth;
pub mod guard;
pub mod rate;

pub use auth::{AuthManager, TokenStore};
pub use guard::NetworkGuard;
pub use rate::{RateLimiter, DEFAULT_MAX_EVENTS_PER_SECOND};
