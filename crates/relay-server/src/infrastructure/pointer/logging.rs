//! Log-only pointer device for platforms without a native backend.
//!
//! On hosts where no injection API is wired up (Linux and Windows builds of
//! this server), every dispatched command is logged at debug level and
//! otherwise discarded.  This keeps the full protocol stack runnable on a
//! development machine: companions can connect, authenticate, and stream
//! commands, and the log shows exactly what the cursor would have done.

use tracing::debug;

use relay_core::{ClickType, MouseButton};

use crate::application::session::{PointerDevice, PointerError};

/// A pointer device that logs each command instead of injecting it.
#[derive(Default)]
pub struct LoggingPointerDevice;

impl LoggingPointerDevice {
    /// Creates a new `LoggingPointerDevice`.
    pub fn new() -> Self {
        Self
    }
}

impl PointerDevice for LoggingPointerDevice {
    fn move_to(&self, x: f64, y: f64) -> Result<(), PointerError> {
        debug!("pointer: move_to({x}, {y})");
        Ok(())
    }

    fn move_by(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        debug!("pointer: move_by({dx}, {dy})");
        Ok(())
    }

    fn click(&self, button: MouseButton, click_type: ClickType) -> Result<(), PointerError> {
        debug!("pointer: click({button:?}, {click_type:?})");
        Ok(())
    }

    fn scroll(&self, dx: f64, dy: f64) -> Result<(), PointerError> {
        debug!("pointer: scroll({dx}, {dy})");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
