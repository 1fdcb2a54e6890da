//! Diagnostic messages produced while declaring operations
//!
//! The engine only produces message text and a severity. How they are
//! surfaced belongs to the host, which plugs in a [`DiagnosticSink`].

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// The matching `log` level
    pub fn level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

/// A message about a specific operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the operation the message is about
    pub operation: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn info(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, operation, message)
    }

    pub fn warning(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, operation, message)
    }

    pub fn error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, operation, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.operation, self.message)
    }
}

/// Receiver for diagnostics
///
/// Abstracts over how messages reach the user (log file, status bar,
/// message panel), so the engine can be embedded in different hosts.
pub trait DiagnosticSink: Send + Sync {
    /// Deliver a diagnostic
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(
            target: "operation_engine",
            diagnostic.severity.level(),
            "{}",
            diagnostic
        );
    }
}

/// Discards all diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Buffers diagnostics so a host can drain them later
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered diagnostic
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Copy of the buffered diagnostics with at least the given severity
    pub fn at_least(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity >= severity)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_drain() {
        let sink = CollectingSink::new();
        sink.emit(Diagnostic::info("add", "All arguments are valid"));
        sink.emit(Diagnostic::warning("add", "No outputs"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.at_least(Severity::Warning).len(), 1);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(Severity::Warning.level(), log::Level::Warn);
        assert_eq!(Severity::Info.level(), log::Level::Info);
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn test_log_sink_accepts_all_severities() {
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = LogSink;
        sink.emit(Diagnostic::new(Severity::Debug, "op", "debug"));
        sink.emit(Diagnostic::error("op", "error"));
    }

    #[test]
    fn test_diagnostic_serialization() {
        let json = serde_json::to_value(Diagnostic::warning("add", "No outputs")).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["operation"], "add");
        assert_eq!(format!("{}", Diagnostic::info("add", "ok")), "[add] ok");
    }
}
