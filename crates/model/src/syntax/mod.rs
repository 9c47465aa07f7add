/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Script front end: tokenizes and parses pipeline scripts into a generic
 * syntax tree the pipeline parser then walks.
 */

pub mod lexer;
pub mod parser;
pub mod tree;

use std::fmt;

pub use tree::{Argument, Constant, Node, NodeKind};

/// A syntax error with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxDiagnostic {
    pub fn new(message: &str, line: u32, column: u32) -> Self {
        Self {
            message: message.to_string(),
            line,
            column,
        }
    }
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ line {}, column {}.",
            self.message, self.line, self.column
        )
    }
}

/// Parse script source into its top-level statements.
pub fn parse(source: &str) -> Result<Vec<Node>, Vec<SyntaxDiagnostic>> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = parser::Parser::new(source, tokens);
    let nodes = parser.program().map_err(|error| vec![error])?;
    tracing::trace!(statements = nodes.len(), "parsed script");
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = SyntaxDiagnostic::new("unexpected token: }", 4, 9);
        assert_eq!(
            diagnostic.to_string(),
            "unexpected token: } @ line 4, column 9."
        );
    }

    #[test]
    fn test_lexer_errors_pass_through() {
        let errors = parse("echo 'unterminated").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated string"));
    }
}
