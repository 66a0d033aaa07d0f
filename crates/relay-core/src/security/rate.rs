//! Fixed-window budget on pointer events.
//!
//! One limiter instance is shared by every session, so the budget is a cap
//! on what the whole host will inject per second, not a per-companion quota.
//! Commands over budget are dropped silently (no response frame); the
//! companion's next window starts clean.
//!
//! # Window semantics
//!
//! The window restarts lazily, on the first `allow` call that arrives a full
//! second or more after the window began.  A fixed window admits up to twice
//! the budget across a window edge (budget at the end of one window, budget
//! again at the start of the next); that burst shape is accepted here in
//! exchange for a two-field counter.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default event budget per one-second window.
pub const DEFAULT_MAX_EVENTS_PER_SECOND: u32 = 1000;

/// Mutable window state, kept behind one lock so concurrent sessions
/// serialize their counter updates.
struct Window {
    count: u32,
    started_at: Instant,
}

/// Fixed-window rate limiter shared across all relay sessions.
pub struct RateLimiter {
    max_per_second: u32,
    window: Mutex<Window>,
}

impl RateLimiter {
    /// Creates a limiter admitting at most `max_per_second` events per window.
    pub fn new(max_per_second: u32) -> Self {
        Self {
            max_per_second,
            window: Mutex::new(Window {
                count: 0,
                started_at: Instant::now(),
            }),
        }
    }

    /// Records one event and returns whether it is within budget.
    ///
    /// Denied events still count toward the current window; admission resumes
    /// only once the window restarts.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut window = self.lock_window();

        if now.duration_since(window.started_at) >= Duration::from_secs(1) {
            window.count = 0;
            window.started_at = now;
        }

        window.count += 1;
        window.count <= self.max_per_second
    }

    /// Zeroes the counter and restarts the window immediately.
    pub fn reset(&self) {
        let mut window = self.lock_window();
        window.count = 0;
        window.started_at = Instant::now();
    }

    fn lock_window(&self) -> MutexGuard<'_, Window> {
        // A poisoned window is still a valid counter; keep serving.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS_PER_SECOND)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
