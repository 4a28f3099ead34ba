//! Structured logging with duration-gated levels.
//!
//! [`Logger`] wraps a `tracing` dispatcher built from an explicit
//! [`LogConfig`]. On top of the usual level methods it offers timed logs:
//! start a timer, finish it with a message, and the record is written at WARN
//! when the work took longer than a threshold (DEBUG otherwise), or always at
//! INFO for plain timing.

pub mod backend;
pub mod logger;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
pub mod timed;

pub use gatelog_core::{Format, Level, LevelFilter, LogConfig, LogError, Output, Result};
pub use logger::{Entry, Hook, Logger};
pub use timed::{Gate, TimedGuard, TimedLog};
