//! macOS CoreGraphics pointer injection.
//!
//! Uses `CGEventCreateMouseEvent`, `CGEventCreateScrollWheelEvent`, and
//! `CGEventPost` (via the `core-graphics` crate) to synthesize pointer input.
//!
//! # What is CoreGraphics event injection? (for beginners)
//!
//! macOS exposes the CoreGraphics framework for low-level graphics and input
//! operations.  Posting a synthesized event into the session event tap
//! delivers it through the same pipeline as physical mouse input, so
//! applications cannot distinguish relayed cursor commands from a real mouse.
//!
//! The sequence for each command is:
//!
//! 1. Create an event source for the combined session state.
//! 2. Create the mouse/scroll event with the target position or deltas.
//! 3. Post it to the session event tap.
//!
//! The `core-graphics` crate wraps the manual CoreFoundation reference
//! counting, so events and sources are released when the Rust values drop.
//!
//! # Coordinates
//!
//! CGEvent mouse positions use the global display space: origin at the
//! top-left of the main display, Y increasing downward.  That matches the
//! wire protocol's convention, so positions pass through unconverted.
//!
//! Relative moves have no native CGEvent form; the device reads the current
//! cursor location from a freshly created empty event, applies the deltas,
//! and posts an absolute move.
//!
//! # Accessibility permission
//!
//! Posting synthesized input requires the **Accessibility** permission in
//! System Settings → Privacy & Security → Accessibility.  Without it the
//! posts silently do nothing; the server still runs and serves the protocol.
//! `main` calls [`is_process_trusted`] at startup and prints remediation
//! instructions when the permission is missing.

#![cfg(target_os = "macos")]

use core_graphics::event::{
    CGEvent, CGEventTapLocation, CGEventType, CGMouseButton, ScrollEventUnit,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use relay_core::{ClickType, MouseButton};

use crate::application::session::{PointerDevice, PointerError};

/// Returns `true` when the process holds the Accessibility permission that
/// CGEvent posting requires.
///
/// Without the permission the relay still runs and serves the protocol, but
/// every posted event is silently discarded by the OS, so the caller should
/// tell the user how to grant it.
pub fn is_process_trusted() -> bool {
    // SAFETY: AXIsProcessTrusted takes no arguments and only reads the
    // calling process's trust state.
    unsafe { accessibility_sys::AXIsProcessTrusted() != 0 }
}

/// macOS pointer device backed by CoreGraphics event injection.
pub struct CgPointerDevice;

impl CgPointerDevice {
    /// Creates a new `CgPointerDevice`.
    pub fn new() -> Self {
        Self
    }
}

impl Default for CgPointerDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerDevice for CgPointerDevice {
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        let source = event_source()?;
        post_mouse_event(
            &source,
            CGEventType::MouseMoved,
            CGPoint::new(x, y),
            CGMouseButton::Left,
        )
    }

    fn move_by(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        let source = event_source()?;
        let current = current_position(&source);
        post_mouse_event(
            &source,
            CGEventType::MouseMoved,
            CGPoint::new(current.x + dx, current.y + dy),
            CGMouseButton::Left,
        )
    }

    fn click(&self, button: MouseButton, click_type: ClickType) -> Result<(), PointerError> {
        let source = event_source()?;
        // Button events carry a position; use wherever the cursor is now.
        let position = current_position(&source);
        let (down, up, cg_button) = cg_event_kinds(button);

        match click_type {
            ClickType::Down => post_mouse_event(&source, down, position, cg_button),
            ClickType::Up => post_mouse_event(&source, up, position, cg_button),
            ClickType::Click => {
                post_mouse_event(&source, down, position, cg_button)?;
                post_mouse_event(&source, up, position, cg_button)
            }
        }
    }

    fn scroll(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        let source = event_source()?;
        // Wheel axis 1 is vertical, axis 2 horizontal; pixel units give
        // smooth trackpad-style scrolling.
        let event = CGEvent::new_scroll_event(
            source,
            ScrollEventUnit::PIXEL,
            2,
            dy as i32,
            dx as i32,
            0,
        )
        .map_err(|_| PointerError::Platform("could not create scroll event".to_string()))?;
        event.post(CGEventTapLocation::Session);
        Ok(())
    }
}

// ── CoreGraphics helpers ──────────────────────────────────────────────────────

/// Creates an event source for the combined session state.
fn event_source() -> Result<CGEventSource, PointerError> {
    CGEventSource::new(CGEventSourceStateID::CombinedSessionState).map_err(|_| {
        PointerError::Unavailable("could not create a CoreGraphics event source".to_string())
    })
}

/// Reads the cursor's current location in global display coordinates.
///
/// A freshly created empty event carries the live cursor position.  If even
/// that fails, fall back to the origin rather than dropping the command.
fn current_position(source: &CGEventSource) -> CGPoint {
    CGEvent::new(source.clone())
        .map(|event| event.location())
        .unwrap_or(CGPoint::new(0.0, 0.0))
}

/// Creates and posts one mouse event to the session event tap.
fn post_mouse_event(
    source: &CGEventSource,
    event_type: CGEventType,
    position: CGPoint,
    button: CGMouseButton,
) -> Result<(), PointerError> {
    let event = CGEvent::new_mouse_event(source.clone(), event_type, position, button)
        .map_err(|_| PointerError::Platform("could not create mouse event".to_string()))?;
    event.post(CGEventTapLocation::Session);
    Ok(())
}

/// Maps a protocol button to its CoreGraphics down/up event types and button.
fn cg_event_kinds(button: MouseButton) -> (CGEventType, CGEventType, CGMouseButton) {
    match button {
        MouseButton::Left => (
            CGEventType::LeftMouseDown,
            CGEventType::LeftMouseUp,
            CGMouseButton::Left,
        ),
        MouseButton::Right => (
            CGEventType::RightMouseDown,
            CGEventType::RightMouseUp,
            CGMouseButton::Right,
        ),
        MouseButton::Center => (
            CGEventType::OtherMouseDown,
            CGEventType::OtherMouseUp,
            CGMouseButton::Center,
        ),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
