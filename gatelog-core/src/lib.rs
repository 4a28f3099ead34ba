//! Foundation types for gatelog: severity levels, logger configuration and
//! the shared error type.

pub mod config;
pub mod error;
pub mod level;

pub use config::{Format, LogConfig, Output};
pub use error::{LogError, Result};
pub use level::{Level, LevelFilter};
