//! Construction of the `tracing` backend a [`Logger`](crate::Logger) writes to.
//!
//! The backend is a `tracing_subscriber` registry with a level filter and a
//! single fmt layer. Every configured sink (stdout, the rolling log file, or a
//! caller-supplied writer) sits behind a shared mutex so the same handles can
//! be flushed later by `Logger::sync`.

use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, registry};

use gatelog_core::{Format, LogConfig, LogError, Output, Result};

type SharedSink = Arc<Mutex<Box<dyn Write + Send>>>;

fn lock(sink: &SharedSink) -> MutexGuard<'_, Box<dyn Write + Send>> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The set of writers a backend fans records out to.
#[derive(Clone, Default)]
pub struct Sinks {
    sinks: Vec<SharedSink>,
}

impl Sinks {
    pub fn push<W: Write + Send + 'static>(&mut self, writer: W) {
        self.sinks.push(Arc::new(Mutex::new(Box::new(writer))));
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Flushes every sink, reporting the first failure after trying them all.
    pub fn flush(&self) -> Result<()> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = lock(sink).flush() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(LogError::Io(e)),
            None => Ok(()),
        }
    }
}

// --- Fan-out ("tee") writer ---
pub struct TeeWriter<'a> {
    sinks: &'a [SharedSink],
}

impl Write for TeeWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut result = Ok(buf.len());
        let mut any_ok = self.sinks.is_empty();
        for sink in self.sinks {
            match lock(sink).write_all(buf) {
                Ok(()) => any_ok = true,
                Err(e) => result = Err(e),
            }
        }
        if any_ok {
            Ok(buf.len())
        } else {
            result
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in self.sinks {
            lock(sink).flush()?;
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Sinks {
    type Writer = TeeWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter { sinks: &self.sinks }
    }
}

/// A ready-to-use backend: the dispatcher to emit through and the sinks
/// behind it.
#[derive(Clone)]
pub struct Backend {
    pub dispatch: Dispatch,
    pub sinks: Sinks,
}

/// Builds a backend writing to the outputs named in `config`.
pub fn build(config: &LogConfig) -> Result<Backend> {
    let mut sinks = Sinks::default();
    if config.output.uses_console() {
        sinks.push(io::stdout());
    }
    if config.output.uses_file() {
        sinks.push(file_appender(&config.file_path)?);
    }
    let ansi = config.output == Output::Console;
    Ok(assemble(config, sinks, ansi))
}

/// Builds a backend writing only to `writer`, ignoring `config.output`.
pub fn build_with_writer<W: Write + Send + 'static>(config: &LogConfig, writer: W) -> Backend {
    let mut sinks = Sinks::default();
    sinks.push(writer);
    assemble(config, sinks, false)
}

fn assemble(config: &LogConfig, sinks: Sinks, ansi: bool) -> Backend {
    let subscriber = registry().with(config.level.to_tracing());

    if sinks.is_empty() {
        return Backend {
            dispatch: Dispatch::new(subscriber),
            sinks,
        };
    }

    let fmt_layer = fmt::layer().with_writer(sinks.clone()).with_ansi(ansi);
    let dispatch = match config.format {
        Format::Json => Dispatch::new(subscriber.with(fmt_layer.json())),
        Format::Compact => Dispatch::new(subscriber.with(fmt_layer.compact())),
        Format::Human => Dispatch::new(subscriber.with(fmt_layer.pretty())),
    };

    Backend { dispatch, sinks }
}

fn file_appender(file_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_filename = file_path
        .file_name()
        .ok_or_else(|| LogError::Init(format!("log file path has no file name: {}", file_path.display())))?;

    fs::create_dir_all(log_dir)?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_filename.to_string_lossy().into_owned())
        .build(log_dir)
        .map_err(|e| LogError::Io(io::Error::other(e)))
}
