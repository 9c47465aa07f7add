/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Model AST for declarative pipeline definitions.
 *
 * The tree is built by either parser (script or JSON), inspected by the
 * validator, and rendered by either renderer. Nodes are plain data: once a
 * parser hands a tree out, nothing mutates it.
 */

pub mod pipeline;
pub mod stage;
pub mod step;
pub mod value;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use pipeline::{
    Agent, AgentArguments, AgentKind, CallList, KeyValueList, Libraries, Pipeline, Post,
    PostCondition,
};
pub use stage::{Stage, Stages, Steps, When, WhenCondition, WhenKind};
pub use step::{Step, StepBody};
pub use value::{Arguments, Literal, MethodCall, NamedArgument, Value};

/// Where a node came from.
///
/// Positions are diagnostic metadata only. Two positions always compare
/// equal, so deriving `PartialEq` on a node yields structural equality
/// that ignores source locations.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Position {
    /// Built from JSON or programmatically; no textual origin.
    #[default]
    Synthetic,
    /// 1-based line and column in script source.
    Source { line: u32, column: u32 },
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self::Source { line, column }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

impl PartialEq for Position {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synthetic => write!(f, "<synthetic>"),
            Self::Source { line, column } => write!(f, "line {line}, column {column}"),
        }
    }
}

/// Whether `name` is usable as a bare identifier in script source
/// (step names, environment keys, named argument keys).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Normalise a block of raw script code so it survives re-indentation.
///
/// Trailing whitespace is trimmed on every line, blank lines at either end
/// are dropped and the indentation common to all non-blank lines is removed.
pub fn normalize_code(code: &str) -> String {
    let lines: Vec<&str> = code.lines().map(str::trim_end).collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.chars().skip(indent).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
