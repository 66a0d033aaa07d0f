//! Pointer relay host — entry point.
//!
//! This binary turns the machine it runs on into a pointer relay host: a
//! companion app on a phone or tablet connects over the local network and
//! drives this machine's mouse cursor.  Commands arrive as JSON text frames
//! over WebSocket and are injected into the OS after the companion has
//! authenticated with the shared token.
//!
//! # Usage
//!
//! ```text
//! relay-server [OPTIONS]
//!
//! Options:
//!   -p, --port <PORT>     WebSocket listener port (overrides the config file)
//!   -t, --token <TOKEN>   Auth token (overrides the stored token)
//!   -v, --verbose         Log at debug level instead of info
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable      | Description                                  |
//! |---------------|----------------------------------------------|
//! | `RELAY_PORT`  | WebSocket listener port                      |
//! | `RELAY_TOKEN` | Auth token                                   |
//! | `RUST_LOG`    | Full tracing filter (overrides `--verbose`)  |
//!
//! # Architecture overview
//!
//! ```text
//! Companion app  (JSON over WebSocket)
//!       ↕
//! relay-server  ← this process
//!   domain/         RelayConfig
//!   application/    Session state machine (auth → rate limit → dispatch)
//!   infrastructure/
//!     ws_server/    Accept loop + local-network gate
//!     pointer/      OS cursor injection (Core Graphics on macOS)
//!     discovery/    UDP probe responder
//!     storage/      TOML config file
//!     token_file/   Persisted auth token
//!       ↕
//! Host OS cursor
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relay_core::{AuthManager, RateLimiter, TokenStore};

use relay_server::application::session::PointerDevice;
use relay_server::domain::RelayConfig;
use relay_server::infrastructure::storage::{self, StoredConfig};
use relay_server::infrastructure::token_file::FileTokenStore;
use relay_server::infrastructure::{run_server, start_discovery_responder, RelayState};

#[cfg(target_os = "macos")]
use relay_server::infrastructure::pointer::CgPointerDevice;
#[cfg(not(target_os = "macos"))]
use relay_server::infrastructure::pointer::LoggingPointerDevice;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pointer relay host.
///
/// Lets a companion app on the local network control this machine's mouse
/// cursor after authenticating with the shared token.
///
/// The `#[derive(Parser)]` macro from `clap` generates the argument parser
/// automatically from the struct fields and their `#[arg(...)]` attributes.
#[derive(Debug, Parser)]
#[command(
    name = "relay-server",
    about = "LAN WebSocket server that relays companion pointer commands to the host cursor",
    version
)]
struct Cli {
    /// TCP port for the WebSocket listener.
    ///
    /// Overrides the port in the config file.  When neither is set, the
    /// built-in default of 8080 applies.
    #[arg(short, long, env = "RELAY_PORT")]
    port: Option<u16>,

    /// Auth token companions must present.
    ///
    /// Overrides the persisted token for this run only; the token file is
    /// left untouched.  When absent, the stored token is used, and when no
    /// token has ever been stored, a fresh one is generated and persisted.
    #[arg(short, long, env = "RELAY_TOKEN")]
    token: Option<String>,

    /// Log at debug level instead of info.
    ///
    /// Ignored when `RUST_LOG` is set; the environment filter wins.
    #[arg(short, long)]
    verbose: bool,
}

// ── Fallback token store ──────────────────────────────────────────────────────

/// Store used when no config directory exists on this system.
///
/// Never loads or saves anything, so a generated token lasts exactly one
/// run.  The relay still works; companions just have to re-pair after a
/// restart.
struct EphemeralStore;

impl TokenStore for EphemeralStore {
    fn load(&self) -> Option<String> {
        None
    }

    fn save(&self, _token: &str) -> std::io::Result<()> {
        Ok(())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The `#[tokio::main]` attribute sets up the Tokio multi-threaded async
/// runtime.  All async tasks (WebSocket sessions, the shutdown watcher)
/// run on this runtime's thread pool.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap` into a [`Cli`] struct.  This
///    happens before logging setup so `--verbose` can pick the default
///    filter level.
/// 2. `tracing_subscriber` is initialised to format log output.  The
///    `RUST_LOG` environment variable, when set, overrides `--verbose`.
/// 3. The TOML config file is loaded.  A missing file yields defaults; a
///    malformed one is logged and replaced with defaults, so a typo in the
///    config never bricks the relay.
/// 4. The auth token is resolved (CLI/env, then token file, then freshly
///    generated) and printed together with a ready-to-paste auth frame.
/// 5. The UDP discovery responder starts, unless disabled in the config.
/// 6. A Ctrl+C handler is spawned; it clears a shared `AtomicBool` so the
///    accept loop can exit cleanly.
/// 7. [`run_server`] binds the WebSocket port and accepts companion
///    connections until the shutdown flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Parse CLI arguments ───────────────────────────────────────────────────
    //
    // `Cli::parse()` reads from `std::env::args()` and exits with a usage
    // message if values are invalid.
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable.  If it is absent or invalid, we fall back to the level
    // selected by `--verbose`.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // ── Load the config file ──────────────────────────────────────────────────
    //
    // Only a bind failure is fatal later on.  An unreadable or malformed
    // config file falls back to defaults so the relay always starts.
    let stored = match storage::load_config() {
        Ok(stored) => stored,
        Err(e) => {
            warn!("could not load the config file, using defaults: {e}");
            StoredConfig::default()
        }
    };

    // First run: write the defaults so there is a file to edit, the same way
    // a freshly generated token is persisted.  Failing to write it is not
    // fatal; the relay just runs on defaults again next time.
    if let Ok(path) = storage::config_file_path() {
        if !path.exists() {
            match storage::save_config(&stored) {
                Ok(()) => info!("wrote default config to {}", path.display()),
                Err(e) => warn!("could not write the default config file: {e}"),
            }
        }
    }

    // ── Resolve the auth token ────────────────────────────────────────────────
    let store: Box<dyn TokenStore> = match FileTokenStore::at_default_location() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("no usable config directory, the auth token will not persist: {e}");
            Box::new(EphemeralStore)
        }
    };
    let auth = Arc::new(AuthManager::new(cli.token, store.as_ref()));

    // Print the token where the person setting up the companion can see it.
    // The second line is the exact frame the companion must send first.
    info!("auth token: {}", auth.current_token());
    info!(
        "companion auth frame: {{\"type\":\"auth\",\"token\":\"{}\"}}",
        auth.current_token()
    );

    // ── Build the runtime config ──────────────────────────────────────────────
    //
    // CLI port wins over the config file.  A bad host string in the config
    // file falls back to all interfaces rather than refusing to start.
    let port = cli.port.unwrap_or(stored.server.port);
    let bind_addr: SocketAddr = match format!("{}:{}", stored.server.host, port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "invalid host '{}' in the config file, binding 0.0.0.0 instead: {e}",
                stored.server.host
            );
            SocketAddr::from(([0, 0, 0, 0], port))
        }
    };
    let config = RelayConfig {
        bind_addr,
        max_events_per_second: stored.limits.max_events_per_second,
        discovery_enabled: stored.discovery.enabled,
    };

    info!("pointer relay starting on {}", config.bind_addr);

    // ── Select the pointer backend ────────────────────────────────────────────
    //
    // Core Graphics injection on macOS; elsewhere a logging device that
    // records what would have happened, which keeps the whole network stack
    // exercisable on any development machine.
    //
    // On macOS, posting synthesized events needs the Accessibility
    // permission.  The server starts either way; without the permission the
    // OS silently discards every posted event, so say how to grant it.
    #[cfg(target_os = "macos")]
    if !relay_server::infrastructure::pointer::macos::is_process_trusted() {
        warn!("Accessibility permission missing: cursor control will not work until it is granted");
        warn!("open System Settings > Privacy & Security > Accessibility, enable relay-server, then restart it");
    }

    #[cfg(target_os = "macos")]
    let pointer: Arc<dyn PointerDevice> = Arc::new(CgPointerDevice::new());
    #[cfg(not(target_os = "macos"))]
    let pointer: Arc<dyn PointerDevice> = Arc::new(LoggingPointerDevice::new());

    let state = Arc::new(RelayState {
        auth,
        limiter: Arc::new(RateLimiter::new(config.max_events_per_second)),
        pointer,
    });

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    //
    // `AtomicBool` is a thread-safe boolean that can be read and written from
    // multiple threads without a Mutex.  We use `Relaxed` ordering because we
    // only need the value to eventually propagate — precise ordering is not
    // required here.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // Spawn a task that listens for Ctrl+C (SIGINT on Unix).
    // When received, it sets `running` to false.  The accept loop in
    // `run_server` checks this flag every 200 ms and exits cleanly, and the
    // discovery thread checks it on every read timeout.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Discovery responder ───────────────────────────────────────────────────
    //
    // Non-fatal: a relay without discovery still works, companions just
    // have to type the host address by hand.
    if config.discovery_enabled {
        if let Err(e) = start_discovery_responder(port, Arc::clone(&running)) {
            warn!("discovery responder could not start: {e}");
        }
    } else {
        info!("discovery responder disabled in the config file");
    }

    // ── Main server loop ──────────────────────────────────────────────────────
    run_server(config, state, running).await?;

    info!("pointer relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
