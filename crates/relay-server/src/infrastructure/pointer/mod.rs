//! Platform pointer implementations.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`: macOS hosts get the CoreGraphics device, every
//! other platform falls back to [`logging::LoggingPointerDevice`] so the
//! protocol stack stays fully exercisable on a development machine.

pub mod logging;
pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

pub use logging::LoggingPointerDevice;
pub use mock::MockPointerDevice;

#[cfg(target_os = "macos")]
pub use macos::CgPointerDevice;
