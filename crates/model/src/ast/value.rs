/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use super::Position;

/// A constant written directly in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Null,
}

impl Literal {
    /// Name of the literal's type as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Null => "null",
        }
    }
}

/// An argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(Literal),
    /// Script code kept verbatim, e.g. `scm`, `env.BRANCH_NAME` or `"v${n}"`.
    Expression(String),
    List(Vec<Value>),
    MethodCall(MethodCall),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Literal::String(s.into()))
    }

    pub fn expression(code: impl Into<String>) -> Self {
        Self::Expression(code.into())
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// A nested call such as `logRotator(numToKeepStr: '5')`. Also the shape
/// of every entry in `options`, `triggers` and `parameters`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub position: Position,
    pub name: String,
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            position: Position::Synthetic,
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    pub position: Position,
    pub key: String,
    pub value: Value,
}

impl NamedArgument {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            position: Position::Synthetic,
            key: key.into(),
            value,
        }
    }
}

/// Arguments of a step, method call or `when` condition.
///
/// Parsers never produce an empty `Positional`; "no arguments" is an empty
/// `Named` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Named(Vec<NamedArgument>),
    Positional(Vec<Value>),
}

impl Arguments {
    pub fn none() -> Self {
        Self::Named(Vec::new())
    }

    pub fn single(value: Value) -> Self {
        Self::Positional(vec![value])
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Named(args) => args.is_empty(),
            Self::Positional(values) => values.is_empty(),
        }
    }

    /// Look up a named argument.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Named(args) => args.iter().find(|a| a.key == key).map(|a| &a.value),
            Self::Positional(_) => None,
        }
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::none()
    }
}
