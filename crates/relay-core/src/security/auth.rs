//! Shared-secret authentication for relay sessions.
//!
//! The host owns exactly one token.  Where it comes from, in order of
//! precedence:
//!
//! 1. An explicit token handed to the constructor (CLI flag or env var).
//! 2. A previously persisted token from the [`TokenStore`].
//! 3. A freshly generated UUID v4, persisted back through the store so the
//!    companion does not have to re-pair after every host restart.
//!
//! The token never changes while the server runs, so sessions share the
//! manager read-only behind an `Arc` with no locking.

use tracing::{info, warn};
use uuid::Uuid;

/// Where the token lives between runs.
///
/// The server ships a file-backed implementation; a keychain-backed one can
/// slot in without touching this crate.
pub trait TokenStore: Send + Sync {
    /// Returns the previously persisted token, if one exists and is non-empty.
    fn load(&self) -> Option<String>;

    /// Persists the token for future runs.
    fn save(&self, token: &str) -> std::io::Result<()>;
}

/// Holds and validates the single shared secret.
pub struct AuthManager {
    token: String,
}

impl AuthManager {
    /// Resolves the token (explicit, stored, or freshly generated) and
    /// returns a manager holding it.
    ///
    /// A store that cannot persist a generated token is logged and otherwise
    /// ignored; the in-memory token still works for this run, it just will
    /// not survive a restart.
    pub fn new(explicit: Option<String>, store: &dyn TokenStore) -> Self {
        if let Some(token) = explicit {
            return Self { token };
        }

        if let Some(token) = store.load() {
            return Self { token };
        }

        let token = Uuid::new_v4().to_string();
        info!("generated a new auth token");
        if let Err(e) = store.save(&token) {
            warn!("could not persist the auth token, it will change on restart: {e}");
        }
        Self { token }
    }

    /// The token companions must present, e.g. for startup logging.
    pub fn current_token(&self) -> &str {
        &self.token
    }

    /// Returns `true` if `candidate` is the shared secret.
    ///
    /// Plain string equality.  The comparison is not constant-time; on a
    /// transport already restricted to the local network, the 122-bit token
    /// itself is the gate and the timing side channel is an accepted
    /// trade-off.
    pub fn validate(&self, candidate: &str) -> bool {
        candidate == self.token
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
