//! WebSocket server: accept loop and per-session protocol handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Rejecting peers that are not on the local network, before the
//!    WebSocket handshake and before any protocol bytes are exchanged.
//! 3. Upgrading each accepted connection to a WebSocket session.
//! 4. Pumping text frames through that connection's [`Session`] state
//!    machine and acting on the returned [`FrameAction`]s.
//! 5. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Scalability
//!
//! Each companion session runs in its own Tokio task.  Tokio's
//! multi-threaded runtime distributes tasks across OS threads automatically.
//! The accept loop never blocks: it accepts a connection and immediately
//! spawns a task for it before accepting the next one.  Within one session,
//! frames are handled strictly one at a time, so a slow pointer dispatch
//! stalls only that companion's stream, never the other sessions.
//!
//! # Portability
//!
//! Uses only `tokio::net` APIs which are portable across Windows, Linux, and
//! macOS.  Shutdown is triggered by a shared `AtomicBool` that is set by a
//! Ctrl+C signal handler (see `main.rs`), which is also cross-platform.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, error, info, warn};

use relay_core::{encode_response, AuthManager, NetworkGuard, RateLimiter, RelayResponse};

use crate::application::session::{FrameAction, PointerDevice, Session};
use crate::domain::RelayConfig;

// ── Shared state ──────────────────────────────────────────────────────────────

/// Collaborators shared by every session.
///
/// The auth manager is read-only after startup; the rate limiter serializes
/// its own counter updates; the pointer device is the host's single cursor.
pub struct RelayState {
    pub auth: Arc<AuthManager>,
    pub limiter: Arc<RateLimiter>,
    pub pointer: Arc<dyn PointerDevice>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the relay listener and serves until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).  This is the
/// only fatal failure: everything after the bind is isolated per session.
pub async fn run_server(
    config: RelayConfig,
    state: Arc<RelayState>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    // `TcpListener::bind` is the async equivalent of `bind()` + `listen()`.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {}", config.bind_addr))?;

    info!("relay listening on {}", config.bind_addr);

    serve(listener, state, running).await;
    Ok(())
}

/// Runs the accept loop on an already-bound listener.
///
/// Separated from [`run_server`] so tests can bind port 0 themselves, read
/// the real port back, and then drive the loop.
pub async fn serve(listener: TcpListener, state: Arc<RelayState>, running: Arc<AtomicBool>) {
    loop {
        // Check the shutdown flag before each accept attempt.
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Use a short timeout on `accept()` so the loop can periodically
        // check the `running` flag even when no companions are connecting.
        // Without this timeout, the loop would block forever on `accept()`.
        let accept_result = timeout(Duration::from_millis(200), listener.accept()).await;

        match accept_result {
            Ok(Ok((stream, peer_addr))) => {
                // The origin gate runs before the WebSocket handshake: a
                // non-local peer gets the connection dropped with no bytes
                // written, so there is nothing to probe from outside.
                if !NetworkGuard::is_local(&peer_addr.ip().to_string()) {
                    warn!("rejected non-local connection from {}", peer_addr.ip());
                    drop(stream);
                    continue;
                }

                info!("new companion connection from {peer_addr}");
                let state = Arc::clone(&state);

                // Spawn a dedicated Tokio task for this session.
                // `tokio::spawn` is non-blocking: it queues the task and
                // returns immediately, so the accept loop is never delayed.
                tokio::spawn(async move {
                    handle_companion_session(stream, peer_addr, state).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g., too many open file
                // descriptors).  Log it and continue rather than crashing
                // the whole relay.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout — no new connection in the last 200 ms.
                // Loop back to check the `running` flag.
            }
        }
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Top-level handler for a single companion WebSocket session.
///
/// Wraps [`run_session`] and logs the outcome.  Using a separate outer/inner
/// function pair lets us use `?` for clean error propagation inside
/// `run_session` while logging errors in this outer function.
async fn handle_companion_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<RelayState>,
) {
    match run_session(raw_stream, peer_addr, state).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of a single companion WebSocket session.
///
/// Completes the WebSocket upgrade handshake, then reads frames one at a
/// time, feeding each text frame to the [`Session`] state machine and
/// sending whatever reply it asks for.  Returns when the companion
/// disconnects, the transport errors, or the session reaches its terminal
/// state.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<RelayState>,
) -> anyhow::Result<()> {
    // `accept_async` reads the companion's HTTP Upgrade request and sends
    // the "101 Switching Protocols" response.  After this, `ws_stream`
    // speaks WebSocket frames instead of raw HTTP.
    let mut ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("WebSocket session established: {peer_addr}");

    let mut session = Session::new(
        peer_addr.to_string(),
        Arc::clone(&state.auth),
        Arc::clone(&state.limiter),
        Arc::clone(&state.pointer),
    );

    loop {
        // Read the next WebSocket frame from the companion.
        // `next()` returns `None` when the stream is closed.
        let ws_msg = match ws_stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: WebSocket closed normally");
                break;
            }
            Some(Err(e)) => {
                warn!("session {peer_addr}: WebSocket error: {e}");
                break;
            }
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        match ws_msg {
            WsMessage::Text(raw) => match session.handle_frame(&raw) {
                FrameAction::Reply(response) => {
                    if let Err(e) = send_response(&mut ws_stream, &response).await {
                        debug!("session {peer_addr}: {e:#}");
                        break;
                    }
                }
                FrameAction::ReplyAndClose(response) => {
                    // The session decided to end; the reply is best-effort.
                    if let Err(e) = send_response(&mut ws_stream, &response).await {
                        debug!("session {peer_addr}: {e:#}");
                    }
                    let _ = ws_stream.close(None).await;
                    break;
                }
                FrameAction::Silent => {}
            },

            WsMessage::Binary(_) => {
                // The companion-facing protocol is JSON text only.
                // Binary frames are unexpected; log and skip.
                warn!("session {peer_addr}: unexpected binary WebSocket frame (ignored)");
            }

            WsMessage::Ping(data) => {
                // WebSocket protocol-level ping.  tokio-tungstenite queues
                // the Pong reply automatically; we just log it here.
                debug!("session {peer_addr}: WebSocket ping ({} bytes)", data.len());
            }

            WsMessage::Pong(_) => {
                debug!("session {peer_addr}: WebSocket pong received");
            }

            WsMessage::Close(_) => {
                debug!("session {peer_addr}: WebSocket Close frame received");
                break;
            }

            WsMessage::Frame(_) => {
                debug!("session {peer_addr}: raw frame (ignored)");
            }
        }
    }

    session.close();
    Ok(())
}

/// Encodes one response and sends it as a text frame.
async fn send_response(
    ws_stream: &mut WebSocketStream<TcpStream>,
    response: &RelayResponse,
) -> anyhow::Result<()> {
    let frame = encode_response(response).context("response encode error")?;
    ws_stream
        .send(WsMessage::Text(frame))
        .await
        .context("WebSocket send failed (companion disconnected)")?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
