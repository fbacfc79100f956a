//! Diagnostics sink handed to every operation that has something to say.
//!
//! Operations never log through a global; they receive a `&dyn Reporter`.
//! The binary passes [`TracingReporter`], tests pass [`RecordingReporter`].

use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

pub trait Reporter {
    fn report(&self, severity: Severity, message: &str);

    fn debug(&self, message: &str) {
        self.report(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Severity::Warn, message);
    }
}

/// Forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warn => tracing::warn!("{}", message),
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: RefCell<Vec<(Severity, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(severity, _)| *severity == Severity::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, severity: Severity, message: &str) {
        self.entries.borrow_mut().push((severity, message.to_string()));
    }
}
