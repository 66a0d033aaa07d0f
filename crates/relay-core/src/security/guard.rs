//! Connection-origin policy: only peers on the local network may connect.
//!
//! The relay speaks plaintext WebSocket, so the one thing standing between
//! the host's cursor and the wider internet is this classifier plus the
//! shared secret.  The server consults it with the peer's address the moment
//! a TCP connection is accepted, before a single protocol byte is written.

/// Classifies textual IP addresses as local-network or not.
pub struct NetworkGuard;

impl NetworkGuard {
    /// Returns `true` if `ip` belongs to a local or private network.
    ///
    /// Accepted ranges:
    ///
    /// - IPv4 private: `192.168.0.0/16`, `10.0.0.0/8`, `172.16.0.0/12`
    /// - IPv4 loopback: `127.0.0.1`
    /// - IPv6 loopback `::1`, link-local `fe80::/10`, unique-local `fc00::/7`
    ///
    /// Classification is a prefix match on the textual form; anything that
    /// matches no accepted range, including malformed input, is non-local.
    /// Never panics.
    pub fn is_local(ip: &str) -> bool {
        // IPv4 loopback and the always-private /16 and /8 blocks.
        if ip == "127.0.0.1" || ip.starts_with("192.168.") || ip.starts_with("10.") {
            return true;
        }

        // 172.16.0.0/12 spans second octets 16 through 31 only; 172.15.x.x
        // and 172.32.x.x are public address space.
        if let Some(rest) = ip.strip_prefix("172.") {
            if let Some(second_octet) = rest.split('.').next() {
                if let Ok(octet) = second_octet.parse::<u8>() {
                    if (16..=31).contains(&octet) {
                        return true;
                    }
                }
            }
        }

        // IPv6: loopback, link-local, and the fc00::/7 unique-local block
        // (whose textual form always starts with "fc" or "fd").
        ip == "::1" || ip.starts_with("fe80:") || ip.starts_with("fd") || ip.starts_with("fc")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_192_168_range_is_local() {
        assert!(NetworkGuard::is_local("192.168.1.1"));
        assert!(NetworkGuard::is_local("192.168.0.100"));
        assert!(NetworkGuard::is_local("192.168.255.254"));
    }

    #[test]
    fn test_private_10_range_is_local() {
        assert!(NetworkGuard::is_local("10.0.0.1"));
        assert!(NetworkGuard::is_local("10.255.255.255"));
    }

    #[test]
    fn test_private_172_range_respects_second_octet_bounds() {
        // 172.16.0.0/12 covers second octets 16..=31 inclusive.
        assert!(NetworkGuard::is_local("172.16.0.1"));
        assert!(NetworkGuard::is_local("172.20.10.5"));
        assert!(NetworkGuard::is_local("172.31.255.255"));

        // One below and one above the block are public space.
        assert!(!NetworkGuard::is_local("172.15.0.1"));
        assert!(!NetworkGuard::is_local("172.32.0.1"));
    }

    #[test]
    fn test_loopback_addresses_are_local() {
        assert!(NetworkGuard::is_local("127.0.0.1"));
        assert!(NetworkGuard::is_local("::1"));
    }

    #[test]
    fn test_ipv6_link_local_and_unique_local_are_local() {
        assert!(NetworkGuard::is_local("fe80::1"));
        assert!(NetworkGuard::is_local("fe80::abcd:1234"));
        assert!(NetworkGuard::is_local("fd12:3456:789a::1"));
        assert!(NetworkGuard::is_local("fc00::1"));
    }

    #[test]
    fn test_public_addresses_are_not_local() {
        assert!(!NetworkGuard::is_local("8.8.8.8"));
        assert!(!NetworkGuard::is_local("1.1.1.1"));
        assert!(!NetworkGuard::is_local("203.0.113.1"));
        assert!(!NetworkGuard::is_local("2001:4860:4860::8888"));
    }

    #[test]
    fn test_malformed_input_is_not_local() {
        assert!(!NetworkGuard::is_local(""));
        assert!(!NetworkGuard::is_local("not-an-ip"));
        assert!(!NetworkGuard::is_local("999.999.999.999"));
        assert!(!NetworkGuard::is_local("172.banana.0.1"));
    }
}
