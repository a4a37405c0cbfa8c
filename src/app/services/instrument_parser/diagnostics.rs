//! Diagnostics collection for one parse pass
//!
//! Entries are appended to three ordered lists (errors, warnings, logs) and
//! mirrored as `tracing` events. Recording a diagnostic never fails and never
//! interrupts the pass.

use tracing::{debug, error, warn};

use super::decoder::RawRow;
use crate::app::models::{Diagnostic, Severity};

/// Ordered error, warning and log lists
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSink {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    logs: Vec<Diagnostic>,
}

impl DiagnosticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an error entry; it is recorded when the returned entry is dropped
    pub fn error(&mut self, template: &str) -> Entry<'_> {
        Entry::new(&mut self.errors, Severity::Error, template)
    }

    /// Start a warning entry
    pub fn warn(&mut self, template: &str) -> Entry<'_> {
        Entry::new(&mut self.warnings, Severity::Warning, template)
    }

    /// Start an informational entry
    pub fn log(&mut self, template: &str) -> Entry<'_> {
        Entry::new(&mut self.logs, Severity::Log, template)
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn logs(&self) -> &[Diagnostic] {
        &self.logs
    }

    /// Split into (errors, warnings, logs)
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings, self.logs)
    }
}

/// A diagnostic under construction
///
/// Interpolation values and line context are chained on; the entry is
/// appended to its list when it goes out of scope.
pub struct Entry<'a> {
    list: &'a mut Vec<Diagnostic>,
    diagnostic: Option<Diagnostic>,
}

impl<'a> Entry<'a> {
    fn new(list: &'a mut Vec<Diagnostic>, severity: Severity, template: &str) -> Self {
        Self {
            list,
            diagnostic: Some(Diagnostic::new(severity, template)),
        }
    }

    /// Add an interpolation value
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        if let Some(diagnostic) = self.diagnostic.as_mut() {
            diagnostic.with(name, value);
        }
        self
    }

    /// Attach the line context of a decoded row
    pub fn at(self, row: &RawRow) -> Self {
        self.at_line(row.line_number(), row.line())
    }

    /// Attach explicit line context
    pub fn at_line(mut self, line_number: u64, line: &str) -> Self {
        if let Some(diagnostic) = self.diagnostic.as_mut() {
            diagnostic.at(line_number, line);
        }
        self
    }
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        if let Some(diagnostic) = self.diagnostic.take() {
            match diagnostic.severity {
                Severity::Error => error!("{}", diagnostic),
                Severity::Warning => warn!("{}", diagnostic),
                Severity::Log => debug!("{}", diagnostic),
            }
            self.list.push(diagnostic);
        }
    }
}
