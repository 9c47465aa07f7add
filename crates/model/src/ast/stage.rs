/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use super::{Agent, Arguments, KeyValueList, Position, Post, Step};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stages {
    pub position: Position,
    pub stages: Vec<Stage>,
}

/// `stage('name') { ... }`.
///
/// A well-formed stage has exactly one of `steps` and `parallel`; the
/// parser accepts either, both or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    pub position: Position,
    pub name: String,
    pub agent: Option<Agent>,
    pub environment: Option<KeyValueList>,
    pub tools: Option<KeyValueList>,
    pub when: Option<When>,
    pub steps: Option<Steps>,
    pub parallel: Option<Vec<Stage>>,
    pub post: Option<Post>,
}

impl Stage {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps: Some(Steps {
                position: Position::Synthetic,
                steps,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Steps {
    pub position: Position,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct When {
    pub position: Position,
    pub conditions: Vec<WhenCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenCondition {
    pub position: Position,
    pub name: String,
    pub kind: WhenKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhenKind {
    /// `branch 'master'`, `environment name: 'X', value: 'y'`.
    Simple(Arguments),
    /// `not`, `allOf` and `anyOf`.
    Nested(Vec<WhenCondition>),
    /// `expression { ... }` with its normalised code.
    Expression(String),
}
