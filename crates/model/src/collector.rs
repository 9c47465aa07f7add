/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Accumulator for diagnostics produced while parsing and validating.
 */

use serde::{Deserialize, Serialize};

use crate::ast::Position;

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Script source rejected by the front end.
    Syntax,
    /// Input parsed but does not have the expected shape.
    Structure,
    /// JSON field missing, mistyped or outside its enumeration.
    Schema,
    /// Well-formed tree violating a semantic rule.
    Validation,
    /// A multi-item conversion produced nothing.
    EmptyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    /// `"<message> at line L, column C"`, or the bare message without a
    /// source position.
    pub fn render(&self) -> String {
        match self.position {
            Position::Synthetic => self.message.clone(),
            position => format!("{} at {position}", self.message),
        }
    }
}

/// Collects diagnostics in the order they are recorded.
///
/// Recording never fails; callers keep going after each `record` so one
/// pass reports as many problems as possible.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<String>,
        position: Position,
    ) {
        let message = message.into();
        tracing::trace!(?kind, ?severity, %message, "recorded diagnostic");
        self.diagnostics.push(Diagnostic {
            kind,
            severity,
            message,
            position,
        });
    }

    pub fn error(&mut self, kind: ErrorKind, message: impl Into<String>, position: Position) {
        self.record(kind, Severity::Error, message, position);
    }

    pub fn warning(&mut self, kind: ErrorKind, message: impl Into<String>, position: Position) {
        self.record(kind, Severity::Warning, message, position);
    }

    /// Number of error-severity diagnostics. Warnings are not counted.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors_as_strings(&self) -> Vec<String> {
        self.errors().map(Diagnostic::render).collect()
    }

    pub fn warnings_as_strings(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(Diagnostic::render)
            .collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_keep_record_order() {
        let mut errors = ErrorCollector::new();
        errors.error(ErrorKind::Schema, "first", Position::Synthetic);
        errors.error(ErrorKind::Validation, "second", Position::new(3, 7));
        errors.error(ErrorKind::Structure, "third", Position::Synthetic);

        assert_eq!(errors.error_count(), 3);
        assert_eq!(
            errors.errors_as_strings(),
            vec!["first", "second at line 3, column 7", "third"]
        );
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut errors = ErrorCollector::new();
        errors.warning(ErrorKind::Schema, "unknown field", Position::Synthetic);

        assert_eq!(errors.error_count(), 0);
        assert!(!errors.has_errors());
        assert!(errors.errors_as_strings().is_empty());
        assert_eq!(errors.warnings_as_strings(), vec!["unknown field"]);
        assert_eq!(errors.diagnostics().len(), 1);
    }

    #[test]
    fn test_diagnostic_serializes_kind_lowercase() {
        let diagnostic = Diagnostic {
            kind: ErrorKind::EmptyResult,
            severity: Severity::Error,
            message: "No result.".to_string(),
            position: Position::Synthetic,
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "emptyresult");
        assert_eq!(json["severity"], "error");
    }
}
