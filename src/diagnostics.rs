//! Diagnostic log channel.
//!
//! Every caught remote failure is written here once, independently of the
//! user notification shown by the view.

use crate::logger::{LogEntry, LogLevel};
use std::sync::{Arc, Mutex};

pub trait DiagnosticLog: Send + Sync {
    fn error(&self, source: &str, message: &str);
}

/// Forwards to whatever `log` backend is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerDiagnostics;

impl DiagnosticLog for LoggerDiagnostics {
    fn error(&self, source: &str, message: &str) {
        log::error!(target: "mangagen::diagnostics", "[{}] {}", source, message);
    }
}

/// Keeps entries in memory; cheap to clone, clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryDiagnostics {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticLog for MemoryDiagnostics {
    fn error(&self, source: &str, message: &str) {
        let entry = LogEntry::new(
            LogLevel::Error,
            message.to_string(),
            source.to_string(),
            file!().to_string(),
            line!(),
        );
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}
