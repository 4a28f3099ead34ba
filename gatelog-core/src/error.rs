use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    InvalidLevel(String),
    InvalidFormat(String),
    InvalidOutput(String),
    Io(#[from] std::io::Error),
    Init(String),
    Hook(String),
}

impl Display for LogError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LogError::InvalidLevel(s) => write!(
                f,
                "Invalid log level '{}' (expected off, error, warn, info, debug or trace)",
                s
            ),
            LogError::InvalidFormat(s) => write!(
                f,
                "Invalid log format '{}' (expected human, compact or json)",
                s
            ),
            LogError::InvalidOutput(s) => write!(
                f,
                "Invalid log output '{}' (expected console, file, both or none)",
                s
            ),
            LogError::Io(e) => write!(f, "I/O error: {}", e),
            LogError::Init(s) => write!(f, "Failed to initialize logging: {}", s),
            LogError::Hook(s) => write!(f, "Log hook failed: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
