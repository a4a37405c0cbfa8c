//! Structured diagnostics recorded during a parse pass
//!
//! Diagnostics carry a message template with `${name}` placeholders, the
//! interpolation values, and optional source-line context so the host can
//! show users exactly which line of the instrument file was affected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Diagnostic severity; each severity is surfaced as its own ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Log,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Log => write!(f, "log"),
        }
    }
}

/// One structured diagnostic entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Message template with `${name}` placeholders
    pub template: String,

    /// Interpolation values for the template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mapping: BTreeMap<String, String>,

    /// 1-based line number in the decoded text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u64>,

    /// Raw text of the offending line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, template: impl Into<String>) -> Self {
        Self {
            severity,
            template: template.into(),
            mapping: BTreeMap::new(),
            line_number: None,
            line: None,
        }
    }

    /// Add an interpolation value
    pub fn with(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.mapping.insert(name.into(), value.to_string());
        self
    }

    /// Attach source-line context
    pub fn at(&mut self, line_number: u64, line: impl Into<String>) -> &mut Self {
        self.line_number = Some(line_number);
        self.line = Some(line.into());
        self
    }

    /// Render the template with its interpolation values
    ///
    /// Placeholders without a mapping entry are left as written.
    pub fn message(&self) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("${") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match self.mapping.get(name) {
                        Some(value) => rendered.push_str(value),
                        None => rendered.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    rendered.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(number) => write!(f, "line {}: {}", number, self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_interpolation() {
        let mut diagnostic = Diagnostic::new(
            Severity::Error,
            "No valid number ${result} in column (${column_name})",
        );
        diagnostic.with("result", "x").with("column_name", "reading");

        assert_eq!(diagnostic.message(), "No valid number x in column (reading)");
    }

    #[test]
    fn test_missing_placeholder_left_untouched() {
        let mut diagnostic = Diagnostic::new(Severity::Warning, "Sample not found for ${sid}");
        diagnostic.with("other", "1");
        assert_eq!(diagnostic.message(), "Sample not found for ${sid}");

        let unterminated = Diagnostic::new(Severity::Log, "broken ${kw");
        assert_eq!(unterminated.message(), "broken ${kw");
    }

    #[test]
    fn test_display_includes_line_number() {
        let mut diagnostic = Diagnostic::new(Severity::Error, "Orphan value");
        diagnostic.at(4, "S1,1,2,3");
        assert_eq!(diagnostic.to_string(), "line 4: Orphan value");
        assert_eq!(diagnostic.line.as_deref(), Some("S1,1,2,3"));
    }
}
