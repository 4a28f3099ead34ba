//! The [`Logger`] wrapper.
//!
//! A `Logger` owns a `tracing::Dispatch` instead of relying on the global
//! subscriber, so several loggers with different minimum levels can live in
//! one process. Records go through `tracing::event!` under that dispatch;
//! everything about encoding and sinks is left to `tracing-subscriber`.

use std::fmt::{self, Display};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::Dispatch;

use gatelog_core::{Level, LevelFilter, LogConfig, LogError, Result};

use crate::backend::{self, Backend, Sinks};

/// What a hook sees for each enabled record.
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: Level,
    pub logger_name: String,
    pub message: String,
    pub time: DateTime<Utc>,
    /// Context added with [`Logger::with`], in insertion order.
    pub fields: Vec<(String, String)>,
    /// Set for records produced by a timed log.
    pub elapsed: Option<Duration>,
}

pub type Hook = Arc<dyn Fn(&Entry) -> Result<()> + Send + Sync>;

/// Duration fields attached to a timed record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timing {
    pub elapsed: Duration,
    pub threshold: Option<Duration>,
}

struct Shared {
    dispatch: Dispatch,
    sinks: Sinks,
    level: LevelFilter,
}

#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    name: String,
    fields: Vec<(String, String)>,
    context: Option<Arc<str>>,
    hooks: Vec<Hook>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.shared.level)
            .field("fields", &self.fields)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::Trace => tracing::event!(tracing::Level::TRACE, $($rest)+),
            Level::Debug => tracing::event!(tracing::Level::DEBUG, $($rest)+),
            Level::Info => tracing::event!(tracing::Level::INFO, $($rest)+),
            Level::Warn => tracing::event!(tracing::Level::WARN, $($rest)+),
            Level::Error => tracing::event!(tracing::Level::ERROR, $($rest)+),
        }
    };
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

impl Logger {
    /// Builds an unnamed logger from an explicit configuration.
    pub fn new(config: &LogConfig) -> Result<Self> {
        Self::named("", config)
    }

    pub fn named(name: &str, config: &LogConfig) -> Result<Self> {
        let backend = backend::build(config)?;
        Ok(Self::from_backend(name, backend, config.level))
    }

    /// Builds an unnamed logger configured from `LOG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(&LogConfig::from_env()?)
    }

    pub fn named_from_env(name: &str) -> Result<Self> {
        Self::named(name, &LogConfig::from_env()?)
    }

    /// Builds a logger writing only to `writer`. `config.output` is ignored.
    pub fn with_writer<W: Write + Send + 'static>(name: &str, config: &LogConfig, writer: W) -> Self {
        let backend = backend::build_with_writer(config, writer);
        Self::from_backend(name, backend, config.level)
    }

    /// Wraps an existing dispatcher. `level` gates `enabled` and hooks; the
    /// dispatcher still applies its own filtering on top.
    pub fn wrap(dispatch: Dispatch, level: impl Into<LevelFilter>) -> Self {
        let level = level.into();
        let backend = Backend {
            dispatch,
            sinks: Sinks::default(),
        };
        Self::from_backend("", backend, level)
    }

    fn from_backend(name: &str, backend: Backend, level: LevelFilter) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatch: backend.dispatch,
                sinks: backend.sinks,
                level,
            }),
            name: name.to_string(),
            fields: Vec::new(),
            context: None,
            hooks: Vec::new(),
        }
    }

    /// The raw backend.
    pub fn dispatch(&self) -> &Dispatch {
        &self.shared.dispatch
    }

    /// Runs `f` with this logger's backend as the thread's default
    /// dispatcher, so plain `tracing` macros inside it reach the same sinks.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.shared.dispatch, f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LevelFilter {
        self.shared.level
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// A logger sharing this backend, named `parent.child`.
    pub fn child(&self, name: &str) -> Self {
        let mut child = self.clone();
        child.name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        };
        child
    }

    /// A logger that attaches `key=value` to every record it writes.
    pub fn with(&self, key: &str, value: impl Display) -> Self {
        let mut logger = self.clone();
        logger.fields.push((key.to_string(), value.to_string()));
        let rendered = logger
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        logger.context = Some(Arc::from(rendered));
        logger
    }

    /// Adds a hook run for every enabled record. A hook error is reported on
    /// stderr and otherwise ignored.
    pub fn add_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entry) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.shared.level.allows(level)
    }

    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn log(&self, level: Level, message: impl Display) {
        self.emit(level, &message, None);
    }

    pub(crate) fn emit(&self, level: Level, message: &dyn Display, timing: Option<Timing>) {
        if !self.enabled(level) {
            return;
        }

        let message = message.to_string();
        let logger = (!self.name.is_empty()).then_some(self.name.as_str());
        let context = self.context.as_deref();
        let elapsed_ms = timing.map(|t| millis(t.elapsed));
        let elapsed_us = timing.map(|t| micros(t.elapsed));
        let threshold_ms = timing.and_then(|t| t.threshold).map(millis);

        self.in_scope(|| {
            event_at!(
                level,
                logger,
                context,
                elapsed_ms,
                elapsed_us,
                threshold_ms,
                "{}",
                message
            )
        });

        if !self.hooks.is_empty() {
            self.run_hooks(Entry {
                level,
                logger_name: self.name.clone(),
                message,
                time: Utc::now(),
                fields: self.fields.clone(),
                elapsed: timing.map(|t| t.elapsed),
            });
        }
    }

    fn run_hooks(&self, entry: Entry) {
        for hook in &self.hooks {
            if let Err(e) = hook(&entry) {
                eprintln!("gatelog: {}", e);
            }
        }
    }

    /// Flushes every sink owned by this logger's backend.
    pub fn sync(&self) -> Result<()> {
        self.shared.sinks.flush()
    }

    /// Makes this logger's backend the process-wide default dispatcher.
    /// Fails if one has already been installed.
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.shared.dispatch.clone())
            .map_err(|e| LogError::Init(e.to_string()))
    }
}
