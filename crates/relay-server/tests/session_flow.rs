//! Integration tests for the companion session state machine.
//!
//! # Purpose
//!
//! These tests exercise [`Session`] through its *public* API in the same way
//! that the WebSocket server uses it: raw JSON frames in, [`FrameAction`]s
//! out.  No sockets are involved; the transport loop has its own end-to-end
//! tests in `ws_session.rs`.  They verify:
//!
//! - The happy path: authenticate, then drive every pointer command and see
//!   it arrive at the device in order.
//! - The error paths: a wrong token or a pointer command before auth ends
//!   the session without any device dispatch.
//! - Cross-session behaviour: two companions sharing one rate limiter share
//!   one event budget.
//!
//! # Session lifecycle
//!
//! ```text
//! Authenticating ──valid token──▶ Active ──close()──▶ Closed
//!       │                           │
//!       │ wrong token /             │ pointer commands dispatch;
//!       │ non-auth first frame      │ malformed frames get an error
//!       ▼                           │ reply but do NOT close
//!     Closed                        ▼
//!                                 Closed
//! ```

use std::sync::Arc;

use relay_core::{AuthManager, ClickType, MouseButton, RateLimiter, RelayResponse, TokenStore};
use relay_server::application::session::{FrameAction, PointerDevice, Session, SessionState};
use relay_server::infrastructure::pointer::MockPointerDevice;

const TOKEN: &str = "integration-test-token";

/// Token store that never loads or saves; tests always pass the token
/// explicitly.
struct NullStore;

impl TokenStore for NullStore {
    fn load(&self) -> Option<String> {
        None
    }

    fn save(&self, _token: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Builds a session wired to the given device and limiter, the same way
/// `ws_server` builds one per connection.
fn make_session(pointer: Arc<MockPointerDevice>, limiter: Arc<RateLimiter>) -> Session {
    let auth = Arc::new(AuthManager::new(Some(TOKEN.to_string()), &NullStore));
    Session::new(
        "127.0.0.1:50000".to_string(),
        auth,
        limiter,
        pointer as Arc<dyn PointerDevice>,
    )
}

fn auth_frame() -> String {
    format!(r#"{{"type":"auth","token":"{TOKEN}"}}"#)
}

// ── Lifecycle tests ───────────────────────────────────────────────────────────

/// Tests the complete happy-path flow: authenticate, then send one of each
/// pointer command and check that all four reach the device with the right
/// values.
#[test]
fn test_full_session_lifecycle_happy_path() {
    // Arrange
    let pointer = Arc::new(MockPointerDevice::new());
    let limiter = Arc::new(RateLimiter::new(1000));
    let mut session = make_session(Arc::clone(&pointer), limiter);

    // Act: authenticate.
    let action = session.handle_frame(&auth_frame());

    // Assert: the exact acknowledgement the companion protocol documents.
    assert_eq!(action, FrameAction::Reply(RelayResponse::ok("Authenticated")));
    assert_eq!(session.state(), SessionState::Active);

    // Act: one of each pointer command.  All are fire-and-forget.
    let frames = [
        r#"{"type":"moveTo","x":100.0,"y":200.0}"#,
        r#"{"type":"moveBy","dx":-5.5,"dy":3.25}"#,
        r#"{"type":"click","button":"left","clickType":"click"}"#,
        r#"{"type":"scroll","dx":0.0,"dy":-40.0}"#,
    ];
    for frame in frames {
        assert_eq!(session.handle_frame(frame), FrameAction::Silent);
    }

    // Assert: everything arrived, with the values from the wire.
    assert_eq!(*pointer.moves_to.lock().unwrap(), vec![(100.0, 200.0)]);
    assert_eq!(*pointer.moves_by.lock().unwrap(), vec![(-5.5, 3.25)]);
    assert_eq!(
        *pointer.clicks.lock().unwrap(),
        vec![(MouseButton::Left, ClickType::Click)]
    );
    assert_eq!(*pointer.scrolls.lock().unwrap(), vec![(0.0, -40.0)]);

    // Act: explicit close, as the transport does when the socket drops.
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
}

/// Tests that a wrong token is refused with the documented reply and that
/// the session is unusable afterwards.
#[test]
fn test_invalid_token_closes_before_any_dispatch() {
    let pointer = Arc::new(MockPointerDevice::new());
    let limiter = Arc::new(RateLimiter::new(1000));
    let mut session = make_session(Arc::clone(&pointer), limiter);

    // Act
    let action = session.handle_frame(r#"{"type":"auth","token":"wrong"}"#);

    // Assert
    assert_eq!(
        action,
        FrameAction::ReplyAndClose(RelayResponse::error("Invalid token"))
    );
    assert_eq!(session.state(), SessionState::Closed);

    // A closed session ignores everything, even a now-correct token.
    assert_eq!(session.handle_frame(&auth_frame()), FrameAction::Silent);
    assert_eq!(pointer.dispatched_count(), 0);
}

/// Tests that a pointer command sent before authentication ends the session
/// and never reaches the device.
#[test]
fn test_command_before_auth_never_reaches_the_device() {
    let pointer = Arc::new(MockPointerDevice::new());
    let limiter = Arc::new(RateLimiter::new(1000));
    let mut session = make_session(Arc::clone(&pointer), limiter);

    // Act: first frame is a move, not an auth.
    let action = session.handle_frame(r#"{"type":"moveTo","x":1.0,"y":2.0}"#);

    // Assert
    assert_eq!(
        action,
        FrameAction::ReplyAndClose(RelayResponse::error("Authentication required"))
    );
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(
        pointer.dispatched_count(),
        0,
        "an unauthenticated command must never be dispatched"
    );
}

/// Tests that a malformed frame while active gets an error reply but keeps
/// the session alive and dispatching.
#[test]
fn test_recovery_after_malformed_frame() {
    let pointer = Arc::new(MockPointerDevice::new());
    let limiter = Arc::new(RateLimiter::new(1000));
    let mut session = make_session(Arc::clone(&pointer), limiter);
    session.handle_frame(&auth_frame());

    // Act: garbage, then a valid command.
    let action = session.handle_frame("this is not json");

    // Assert: error reply, session still active, next command dispatches.
    assert_eq!(
        action,
        FrameAction::Reply(RelayResponse::error("Invalid message format"))
    );
    assert_eq!(session.state(), SessionState::Active);

    session.handle_frame(r#"{"type":"moveBy","dx":4.0,"dy":4.0}"#);
    assert_eq!(*pointer.moves_by.lock().unwrap(), vec![(4.0, 4.0)]);
}

// ── Cross-session tests ───────────────────────────────────────────────────────

/// Tests that two sessions sharing one rate limiter share one event budget.
///
/// The limiter guards the host's single cursor, so the cap applies to the
/// sum of all companions, not to each one separately.  With a budget of 3,
/// two companions sending 2 commands each get exactly 3 through.
#[test]
fn test_two_companions_share_the_event_budget() {
    // Arrange: one limiter, one device, two sessions.
    let pointer = Arc::new(MockPointerDevice::new());
    let limiter = Arc::new(RateLimiter::new(3));
    let mut session_a = make_session(Arc::clone(&pointer), Arc::clone(&limiter));
    let mut session_b = make_session(Arc::clone(&pointer), Arc::clone(&limiter));
    session_a.handle_frame(&auth_frame());
    session_b.handle_frame(&auth_frame());

    // Act: four commands arrive within the same one-second window.
    session_a.handle_frame(r#"{"type":"moveBy","dx":1.0,"dy":0.0}"#);
    session_a.handle_frame(r#"{"type":"moveBy","dx":2.0,"dy":0.0}"#);
    session_b.handle_frame(r#"{"type":"moveBy","dx":3.0,"dy":0.0}"#);
    session_b.handle_frame(r#"{"type":"moveBy","dx":4.0,"dy":0.0}"#);

    // Assert: the budget is global, so exactly one command was dropped.
    assert_eq!(
        pointer.dispatched_count(),
        3,
        "the event budget must be shared across sessions"
    );

    // Both sessions stay active; dropping events is not an error.
    assert_eq!(session_a.state(), SessionState::Active);
    assert_eq!(session_b.state(), SessionState::Active);
}
