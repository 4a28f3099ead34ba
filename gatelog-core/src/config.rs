//! Logger configuration.
//!
//! The minimum level and sink selection are carried in an explicit
//! [`LogConfig`] handed to logger construction. [`LogConfig::from_env`] reads
//! the process environment once:
//!
//! - `LOG_LEVEL` - `off`, `error`, `warn`, `info` (default), `debug`, `trace`
//! - `LOG_FORMAT` - `human` (default), `compact`, `json`
//! - `LOG_OUTPUT` - `console` (default), `file`, `both`, `none`
//! - `LOG_FILE_PATH` - file sink location, default `/tmp/gatelog.log`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LogError, Result};
use crate::level::LevelFilter;

pub const DEFAULT_FILE_PATH: &str = "/tmp/gatelog.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Human,
    Compact,
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "pretty" => Ok(Format::Human),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    #[default]
    Console,
    File,
    Both,
    None,
}

impl Output {
    pub fn uses_console(&self) -> bool {
        matches!(self, Output::Console | Output::Both)
    }

    pub fn uses_file(&self) -> bool {
        matches!(self, Output::File | Output::Both)
    }
}

impl FromStr for Output {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(Output::Console),
            "file" => Ok(Output::File),
            "both" => Ok(Output::Both),
            "none" => Ok(Output::None),
            _ => Err(LogError::InvalidOutput(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: Format,
    pub output: Output,
    pub file_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::default(),
            format: Format::default(),
            output: Output::default(),
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}

impl LogConfig {
    /// Reads `LOG_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset or empty keys keep
    /// their defaults; set keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(level) = get("LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(output) = get("LOG_OUTPUT") {
            config.output = output.parse()?;
        }
        if let Some(path) = get("LOG_FILE_PATH") {
            config.file_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_level(mut self, level: impl Into<LevelFilter>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }
}
