//! In-memory capture of JSON log output, for asserting on emitted records.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use gatelog_core::{Format, Level, LevelFilter, LogConfig};
use serde_json::{Map, Value};

use crate::Logger;

/// A cloneable `io::Write` that appends into a shared buffer.
#[derive(Clone, Default)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CaptureWriter {
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Parses every captured line as a JSON record. Lines that are not JSON
    /// objects with a known level are skipped.
    pub fn records(&self) -> Vec<Record> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(Record::from_json)
            .collect()
    }
}

/// One parsed record from the JSON formatter.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Map<String, Value>,
}

impl Record {
    fn from_json(value: Value) -> Option<Self> {
        let level = value.get("level")?.as_str()?.parse().ok()?;
        let mut fields = value.get("fields")?.as_object()?.clone();
        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        Some(Self {
            level,
            message,
            fields,
        })
    }

    pub fn field_u64(&self, name: &str) -> Option<u64> {
        self.fields.get(name)?.as_u64()
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.as_str()
    }
}

/// A JSON logger at `level` whose output lands in the returned capture.
pub fn capture_logger(name: &str, level: impl Into<LevelFilter>) -> (Logger, CaptureWriter) {
    let capture = CaptureWriter::default();
    let config = LogConfig::default()
        .with_level(level)
        .with_format(Format::Json);
    let logger = Logger::with_writer(name, &config, capture.clone());
    (logger, capture)
}
