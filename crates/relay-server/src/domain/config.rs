//! Runtime configuration for the relay server.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! `main.rs` builds it once by merging the config file with CLI overrides,
//! then hands it to the server; nothing below `main` reads the environment.

use std::net::SocketAddr;

use relay_core::DEFAULT_MAX_EVENTS_PER_SECOND;

/// All runtime configuration for the relay server.
///
/// # Example
///
/// ```rust
/// use relay_server::domain::RelayConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The address and port the WebSocket listener binds to.
    ///
    /// `0.0.0.0` accepts connections from any interface; the network guard
    /// still rejects peers that are not on the local network.
    pub bind_addr: SocketAddr,

    /// Server-wide pointer-event budget per second, shared by all sessions.
    pub max_events_per_second: u32,

    /// Whether to answer discovery probes on UDP so companion apps can find
    /// this host without typing its IP address.
    pub discovery_enabled: bool,
}

impl Default for RelayConfig {
    /// Returns a `RelayConfig` suitable for local development without any
    /// external configuration.
    ///
    /// | Field                 | Default        |
    /// |-----------------------|----------------|
    /// | bind_addr             | `0.0.0.0:8080` |
    /// | max_events_per_second | 1000           |
    /// | discovery_enabled     | `true`         |
    fn default() -> Self {
        Self {
            // The `.parse().unwrap()` is safe because this is a
            // compile-time-known valid socket address string.
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            max_events_per_second: DEFAULT_MAX_EVENTS_PER_SECOND,
            discovery_enabled: true,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
