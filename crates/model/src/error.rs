/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */
use thiserror::Error;

use crate::syntax::SyntaxDiagnostic;

/// Errors that abort a conversion before any tree exists.
///
/// Everything else is recorded in an `ErrorCollector` and parsing carries on.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("{}", join_diagnostics(.0))]
    Syntax(Vec<SyntaxDiagnostic>),

    #[error("{0}")]
    InvalidJson(String),

    #[error("Not a valid pipeline definition: {0}")]
    Structure(String),
}

impl ConversionError {
    /// One message per underlying diagnostic, as shown in failure responses.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Syntax(diagnostics) => diagnostics.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

fn join_diagnostics(diagnostics: &[SyntaxDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
