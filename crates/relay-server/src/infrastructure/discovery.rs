//! UDP probe-based host discovery.
//!
//! The relay binds a UDP socket on the same port number as the WebSocket
//! listener and answers discovery probes from companion apps.  On receiving
//! the probe datagram it sends back a one-line JSON advertisement:
//!
//! ```json
//! {"service":"pointer-relay","port":8080,"protocol_version":1}
//! ```
//!
//! The companion can then connect its WebSocket to the probe's source host
//! and the advertised port, with no IP address typed by hand.
//!
//! The responder runs as a blocking loop on a dedicated thread to avoid
//! blocking the Tokio runtime with synchronous socket I/O.
//!
//! # How UDP discovery works (for beginners)
//!
//! UDP (User Datagram Protocol) is a lightweight, connectionless networking
//! protocol.  Unlike TCP it does not guarantee delivery, ordering, or
//! duplicate prevention.  These trade-offs make it ideal for discovery:
//!
//! 1. The companion sends a small UDP packet to the LAN broadcast address
//!    (e.g., `255.255.255.255`) on the relay port.  Every device on the LAN
//!    receives this packet.
//!
//! 2. The relay is listening on that port.  It recognises the probe payload
//!    and sends a unicast advertisement back to the sender's address.
//!
//! 3. The companion receives the advertisement and knows the host's IP and
//!    WebSocket port.  It can now connect and authenticate.
//!
//! # Read timeout
//!
//! The socket is configured with a 500 ms read timeout, so `recv_from`
//! returns periodically even when no probes arrive.  On each timeout the
//! loop checks the `running` flag; when the application is shutting down it
//! exits cleanly.

use std::net::{SocketAddr, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use relay_core::PROTOCOL_VERSION;

/// Datagram payload a companion sends to find relay hosts.
pub const PROBE: &str = "POINTER_RELAY_PROBE";

/// Service identifier carried in every advertisement.
pub const SERVICE_NAME: &str = "pointer-relay";

/// Error type for discovery service operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The JSON payload sent in reply to a probe.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Advertisement {
    /// Always [`SERVICE_NAME`]; lets companions ignore unrelated replies.
    pub service: String,
    /// The TCP port the WebSocket listener is bound to.
    pub port: u16,
    /// The wire protocol version this host speaks.
    pub protocol_version: u32,
}

/// Binds a UDP socket on `port` and spawns a background thread that answers
/// incoming probes until `running` is cleared.
///
/// # Errors
///
/// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound.
/// The caller treats that as non-fatal: a relay without discovery still
/// works, companions just have to type the address.
pub fn start_discovery_responder(
    port: u16,
    running: Arc<AtomicBool>,
) -> Result<(), DiscoveryError> {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse().unwrap();
    let socket =
        UdpSocket::bind(addr).map_err(|source| DiscoveryError::BindFailed { addr, source })?;
    socket
        .set_read_timeout(Some(Duration::from_millis(500)))
        .ok();

    std::thread::Builder::new()
        .name("relay-discovery".to_string())
        .spawn(move || {
            discovery_loop(socket, port, running);
        })
        .expect("failed to spawn discovery thread");

    info!("discovery responder listening on UDP {addr}");
    Ok(())
}

/// The main receive loop executed on the discovery thread.
fn discovery_loop(socket: UdpSocket, port: u16, running: Arc<AtomicBool>) {
    let mut buf = [0u8; 256];

    while running.load(Ordering::Relaxed) {
        let (len, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if is_timeout_error(&e) => continue,
            Err(e) => {
                error!("discovery recv error: {e}");
                continue;
            }
        };

        if is_probe(&buf[..len]) {
            debug!("discovery probe from {src}");
            send_advertisement(&socket, src, port);
        } else {
            debug!("ignoring unrecognized datagram from {src} ({len} bytes)");
        }
    }

    info!("discovery responder stopped");
}

/// Returns `true` if the datagram is the discovery probe.
///
/// Surrounding whitespace is tolerated so a probe sent with a trailing
/// newline (easy to produce from shell tooling) still matches.
fn is_probe(datagram: &[u8]) -> bool {
    std::str::from_utf8(datagram)
        .map(|s| s.trim() == PROBE)
        .unwrap_or(false)
}

/// Sends the JSON advertisement back to `dest`.
fn send_advertisement(socket: &UdpSocket, dest: SocketAddr, port: u16) {
    let advert = Advertisement {
        service: SERVICE_NAME.to_string(),
        port,
        protocol_version: PROTOCOL_VERSION,
    };
    match serde_json::to_string(&advert) {
        Ok(json) => {
            if let Err(e) = socket.send_to(json.as_bytes(), dest) {
                warn!("failed to send discovery reply to {dest}: {e}");
            }
        }
        Err(e) => error!("failed to encode discovery reply: {e}"),
    }
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout_error_recognises_timed_out() {
        // Arrange
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");

        // Act / Assert
        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_recognises_would_block() {
        let e = std::io::Error::new(std::io::ErrorKind::WouldBlock, "would block");

        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_returns_false_for_other_errors() {
        let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

        assert!(!is_timeout_error(&e));
    }

    #[test]
    fn test_is_probe_accepts_the_exact_payload() {
        assert!(is_probe(PROBE.as_bytes()));
    }

    #[test]
    fn test_is_probe_tolerates_surrounding_whitespace() {
        assert!(is_probe(b"POINTER_RELAY_PROBE\n"));
        assert!(is_probe(b"  POINTER_RELAY_PROBE  "));
    }

    #[test]
    fn test_is_probe_rejects_other_payloads() {
        assert!(!is_probe(b"HELLO"));
        assert!(!is_probe(b""));
        assert!(!is_probe(&[0xFF, 0xFE, 0x00]));
    }

    #[test]
    fn test_advertisement_uses_the_documented_field_names() {
        // Arrange
        let advert = Advertisement {
            service: SERVICE_NAME.to_string(),
            port: 8080,
            protocol_version: PROTOCOL_VERSION,
        };

        // Act
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&advert).unwrap()).unwrap();

        // Assert – companions match on these exact keys
        assert_eq!(json["service"], "pointer-relay");
        assert_eq!(json["port"], 8080);
        assert_eq!(json["protocol_version"], 1);
    }

    #[test]
    fn test_start_discovery_responder_binds_on_a_free_port() {
        // Arrange: find a free port by binding port 0 and reading it back
        let probe = UdpSocket::bind("0.0.0.0:0").expect("probe bind");
        let port = probe.local_addr().unwrap().port();
        drop(probe); // release the port before re-binding

        let running = Arc::new(AtomicBool::new(false)); // stopped immediately

        // Act
        let result = start_discovery_responder(port, running);

        // Assert
        assert!(result.is_ok(), "responder must bind successfully");
    }

    #[test]
    fn test_responder_answers_a_probe_with_an_advertisement() {
        // Arrange: start a responder on a free port
        let probe_socket = UdpSocket::bind("127.0.0.1:0").expect("port probe bind");
        let port = probe_socket.local_addr().unwrap().port();
        drop(probe_socket);

        let running = Arc::new(AtomicBool::new(true));
        start_discovery_responder(port, Arc::clone(&running)).expect("responder bind");

        // Act: probe it from a companion-side socket
        let companion = UdpSocket::bind("127.0.0.1:0").expect("companion bind");
        companion
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        companion
            .send_to(PROBE.as_bytes(), ("127.0.0.1", port))
            .expect("send probe");

        let mut buf = [0u8; 512];
        let (len, _) = companion
            .recv_from(&mut buf)
            .expect("must receive an advertisement");
        let advert: Advertisement = serde_json::from_slice(&buf[..len]).expect("valid JSON");

        // Assert
        assert_eq!(advert.service, SERVICE_NAME);
        assert_eq!(advert.port, port);
        assert_eq!(advert.protocol_version, PROTOCOL_VERSION);

        running.store(false, Ordering::Relaxed);
    }
}
