//! Mock pointer device for unit and integration testing.
//!
//! # Why a mock device?
//!
//! The real pointer device makes OS API calls that:
//!
//! - Require a desktop environment to run.
//! - Actually move the cursor and click buttons on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! The `MockPointerDevice` replaces all OS calls with in-memory recording.
//! Each dispatched command is pushed into a `Mutex<Vec<...>>` so that test
//! assertions can inspect exactly what was dispatched and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let pointer = Arc::new(MockPointerDevice::new());
//! let mut session = Session::new(peer, auth, limiter, Arc::clone(&pointer) as _);
//!
//! session.handle_frame(r#"{"type":"moveTo","x":10.0,"y":20.0}"#);
//!
//! assert_eq!(*pointer.moves_to.lock().unwrap(), vec![(10.0, 20.0)]);
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` at construction to make every method return a
//! `PointerError::Platform`.  This lets you test error-handling paths in the
//! session without needing a broken OS.

use std::sync::Mutex;

use relay_core::{ClickType, MouseButton};

use crate::application::session::{PointerDevice, PointerError};

/// A pointer device that records all calls without performing OS API calls.
///
/// All records are stored in `Mutex<Vec<...>>` fields so tests can safely
/// share the device across threads (e.g., when wrapping it in an `Arc`).
#[derive(Default)]
pub struct MockPointerDevice {
    /// Records each (x, y) absolute position passed to `move_to`.
    pub moves_to: Mutex<Vec<(f64, f64)>>,
    /// Records each (dx, dy) delta passed to `move_by`.
    pub moves_by: Mutex<Vec<(f64, f64)>>,
    /// Records each (button, click_type) pair passed to `click`.
    pub clicks: Mutex<Vec<(MouseButton, ClickType)>>,
    /// Records each (dx, dy) delta passed to `scroll`.
    pub scrolls: Mutex<Vec<(f64, f64)>>,
    /// When `true`, every method immediately returns a `PointerError::Platform`.
    /// Use this to test error-handling paths in callers.
    pub should_fail: bool,
}

impl MockPointerDevice {
    /// Creates a new `MockPointerDevice` with empty records and `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commands recorded across all four kinds.
    pub fn dispatched_count(&self) -> usize {
        self.moves_to.lock().unwrap().len()
            + self.moves_by.lock().unwrap().len()
            + self.clicks.lock().unwrap().len()
            + self.scrolls.lock().unwrap().len()
    }
}

impl PointerDevice for MockPointerDevice {
    /// Records the absolute move, or returns an error if `should_fail` is set.
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        if self.should_fail {
            return Err(PointerError::Platform("mock failure".into()));
        }
        self.moves_to.lock().unwrap().push((x, y));
        Ok(())
    }

    /// Records the relative move, or returns an error if `should_fail` is set.
    fn move_by(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        if self.should_fail {
            return Err(PointerError::Platform("mock failure".into()));
        }
        self.moves_by.lock().unwrap().push((dx, dy));
        Ok(())
    }

    /// Records the click, or returns an error if `should_fail` is set.
    fn click(&self, button: MouseButton, click_type: ClickType) -> Result<(), PointerError> {
        if self.should_fail {
            return Err(PointerError::Platform("mock failure".into()));
        }
        self.clicks.lock().unwrap().push((button, click_type));
        Ok(())
    }

    /// Records the scroll delta, or returns an error if `should_fail` is set.
    fn scroll(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        if self.should_fail {
            return Err(PointerError::Platform("mock failure".into()));
        }
        self.scrolls.lock().unwrap().push((dx, dy));
        Ok(())
    }
}
