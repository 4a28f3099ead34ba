//! Severity levels and the minimum-severity filter.
//!
//! These mirror `tracing`'s own types but carry serde support and the
//! parsing rules used by `LOG_LEVEL`, so configuration can live in plain
//! data structures.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::LogError;

/// Record severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    pub fn to_tracing(self) -> tracing::Level {
        match self {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }

    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

/// Minimum severity a logger writes. `None` inside means everything is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelFilter(Option<Level>);

impl LevelFilter {
    pub const OFF: LevelFilter = LevelFilter(None);
    pub const ERROR: LevelFilter = LevelFilter(Some(Level::Error));
    pub const WARN: LevelFilter = LevelFilter(Some(Level::Warn));
    pub const INFO: LevelFilter = LevelFilter(Some(Level::Info));
    pub const DEBUG: LevelFilter = LevelFilter(Some(Level::Debug));
    pub const TRACE: LevelFilter = LevelFilter(Some(Level::Trace));

    /// Whether a record at `level` passes this filter.
    pub fn allows(&self, level: Level) -> bool {
        self.0.is_some_and(|min| level >= min)
    }

    pub fn min_level(&self) -> Option<Level> {
        self.0
    }

    pub fn to_tracing(self) -> tracing::level_filters::LevelFilter {
        match self.0 {
            None => tracing::level_filters::LevelFilter::OFF,
            Some(level) => tracing::level_filters::LevelFilter::from_level(level.to_tracing()),
        }
    }

    pub fn from_tracing(filter: tracing::level_filters::LevelFilter) -> Self {
        LevelFilter(filter.into_level().map(|level| Level::from_tracing(&level)))
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        LevelFilter::INFO
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter(Some(level))
    }
}

impl Display for LevelFilter {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.0 {
            None => f.write_str("off"),
            Some(level) => Display::fmt(&level, f),
        }
    }
}

impl FromStr for LevelFilter {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("off") {
            return Ok(LevelFilter::OFF);
        }
        s.parse::<Level>().map(LevelFilter::from)
    }
}

impl TryFrom<String> for LevelFilter {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        value.parse()
    }
}

impl From<LevelFilter> for String {
    fn from(filter: LevelFilter) -> Self {
        filter.to_string()
    }
}
