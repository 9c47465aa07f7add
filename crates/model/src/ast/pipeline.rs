/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use super::{MethodCall, NamedArgument, Position, Stages, Step, Value};

/// Top-level `pipeline { ... }` block.
///
/// Every directive is optional here; a pipeline without `agent` or
/// `stages` still parses and is reported by the validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub position: Position,
    pub agent: Option<Agent>,
    pub stages: Option<Stages>,
    pub environment: Option<KeyValueList>,
    pub options: Option<CallList>,
    pub parameters: Option<CallList>,
    pub triggers: Option<CallList>,
    pub tools: Option<KeyValueList>,
    pub libraries: Option<Libraries>,
    pub post: Option<Post>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Position,
    pub kind: AgentKind,
}

impl Agent {
    pub fn any() -> Self {
        Self {
            position: Position::Synthetic,
            kind: AgentKind::Any,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentKind {
    Any,
    None,
    /// `agent { label 'linux' }` or `agent { docker { image 'maven' } }`.
    Typed {
        agent_type: String,
        arguments: AgentArguments,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentArguments {
    Single(Value),
    Named(Vec<NamedArgument>),
}

/// `environment { ... }` (`KEY = value`) and `tools { ... }` (`type 'name'`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueList {
    pub position: Position,
    pub entries: Vec<NamedArgument>,
}

impl KeyValueList {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }
}

/// `options`, `triggers` and `parameters`: a list of method calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallList {
    pub position: Position,
    pub entries: Vec<MethodCall>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Libraries {
    pub position: Position,
    pub libraries: Vec<Value>,
}

/// `post { always { ... } failure { ... } }`, at pipeline or stage level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub position: Position,
    pub conditions: Vec<PostCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostCondition {
    pub position: Position,
    pub condition: String,
    pub steps: Vec<Step>,
}
