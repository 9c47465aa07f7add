/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use super::{Arguments, Position};

/// Name of the step wrapping raw script code.
pub const SCRIPT_STEP: &str = "script";

/// Argument key carrying script code in the JSON form.
pub const SCRIPT_BLOCK_KEY: &str = "scriptBlock";

/// A single step invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub position: Position,
    pub name: String,
    pub arguments: Arguments,
    pub body: StepBody,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StepBody {
    #[default]
    None,
    /// Block steps such as `dir('sub') { ... }`.
    Children(Vec<Step>),
    /// `script { ... }`, holding normalised code.
    Script(String),
}

impl Step {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            position: Position::Synthetic,
            name: name.into(),
            arguments,
            body: StepBody::None,
        }
    }

    pub fn script(code: &str) -> Self {
        Self {
            position: Position::Synthetic,
            name: SCRIPT_STEP.to_string(),
            arguments: Arguments::none(),
            body: StepBody::Script(super::normalize_code(code)),
        }
    }

    pub fn with_children(mut self, children: Vec<Step>) -> Self {
        self.body = StepBody::Children(children);
        self
    }
}
