// ═══════════════════════════════════════════════════════════════════════
// Events — observable game notifications
//
// Mutations append lines to the world's EventLog. The engine drains the
// log once per command/phase into a LogSink, so the logging cadence is
// independent of how often state changes.
// ═══════════════════════════════════════════════════════════════════════

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Pending event lines, in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<String>,
}

impl EventLog {
    pub fn emit(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    pub fn lines(&self) -> &[String] {
        &self.entries
    }
}

/// Receiver of drained event lines.
pub trait LogSink: Send {
    fn write_line(&mut self, line: &str);

    fn flush(&mut self) {}
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write_line(&mut self, _line: &str) {}
}

/// Collects lines in shared memory. Clones share one buffer, so a test can
/// keep a handle while the engine owns the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut l| std::mem::take(&mut *l))
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_line(&mut self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Appends lines to a game log file.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink { file })
    }
}

impl LogSink for FileSink {
    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{}", line) {
            log::warn!("failed to write game log line: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.file.flush() {
            log::warn!("failed to flush game log: {}", e);
        }
    }
}
