/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Semantic checks over a built Model AST.
 *
 * The validator only reads the tree and records findings; running it twice
 * over the same tree records the same findings twice.
 */

pub mod arguments;
pub mod registry;


use std::collections::HashSet;

use crate::ast::step::SCRIPT_STEP;
use crate::ast::{
    is_identifier, Agent, AgentArguments, AgentKind, CallList, KeyValueList, Libraries, Literal,
    Pipeline, Position, Post, Stage, Step, StepBody, Value, When, WhenCondition, WhenKind,
};
use crate::collector::{ErrorCollector, ErrorKind};
use crate::config::{ConverterConfig, UnknownStepPolicy};
use crate::validator::arguments::check_arguments;
use crate::validator::registry::{
    lookup, suggest, Signature, AGENT_TYPES, NESTED_WHEN_CONDITIONS, OPTIONS, PARAMETERS,
    POST_CONDITIONS, STEPS, TRIGGERS, WHEN_CONDITIONS,
};

fn invalid(errors: &mut ErrorCollector, message: impl Into<String>, position: Position) {
    errors.error(ErrorKind::Validation, message, position);
}

/// Validator for pipeline definitions and individual steps.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ConverterConfig,
}

impl Validator {
    pub fn new(config: &ConverterConfig) -> Self {
        Self { config: *config }
    }

    /// Check a whole pipeline, recording every problem found.
    pub fn validate_pipeline(&self, pipeline: &Pipeline, errors: &mut ErrorCollector) {
        let before = errors.error_count();

        match &pipeline.agent {
            Some(agent) => self.validate_agent(agent, errors),
            None => invalid(errors, "Missing required section \"agent\"", pipeline.position),
        }
        if let Some(environment) = &pipeline.environment {
            self.validate_environment(environment, errors);
        }
        if let Some(tools) = &pipeline.tools {
            self.validate_tools(tools, errors);
        }
        if let Some(options) = &pipeline.options {
            self.validate_calls(options, OPTIONS, "option", errors);
        }
        if let Some(parameters) = &pipeline.parameters {
            self.validate_calls(parameters, PARAMETERS, "parameter", errors);
            self.validate_parameter_names(parameters, errors);
        }
        if let Some(triggers) = &pipeline.triggers {
            self.validate_calls(triggers, TRIGGERS, "trigger", errors);
        }
        if let Some(libraries) = &pipeline.libraries {
            self.validate_libraries(libraries, errors);
        }

        match &pipeline.stages {
            None => invalid(errors, "Missing required section \"stages\"", pipeline.position),
            Some(stages) if stages.stages.is_empty() => {
                invalid(errors, "No stages specified", stages.position)
            }
            Some(stages) => {
                let mut names = HashSet::new();
                for stage in &stages.stages {
                    self.validate_stage(stage, false, &mut names, errors);
                }
            }
        }

        if let Some(post) = &pipeline.post {
            self.validate_post(post, errors);
        }

        tracing::debug!(
            errors = errors.error_count() - before,
            "validated pipeline"
        );
    }

    /// Check one step and its nested steps.
    pub fn validate_step(&self, step: &Step, errors: &mut ErrorCollector) {
        match &step.body {
            StepBody::Script(code) => {
                if code.trim().is_empty() {
                    invalid(errors, "Empty \"script\" block", step.position);
                }
                if !step.arguments.is_empty() {
                    invalid(errors, "\"script\" does not take arguments", step.position);
                }
                return;
            }
            StepBody::Children(_) | StepBody::None if step.name == SCRIPT_STEP => {
                invalid(errors, "\"script\" requires a block", step.position);
                return;
            }
            _ => {}
        }

        match lookup(STEPS, &step.name) {
            Some(signature) => {
                check_arguments(signature, "step", &step.arguments, step.position, errors);
                if matches!(step.body, StepBody::Children(_)) && !signature.takes_body {
                    invalid(
                        errors,
                        format!("Step \"{}\" does not take a block", step.name),
                        step.position,
                    );
                }
            }
            None => match self.config.unknown_steps {
                UnknownStepPolicy::Allow => {
                    tracing::trace!(step = %step.name, "passing unknown step through");
                }
                UnknownStepPolicy::Reject => {
                    let mut message = format!("Unknown step \"{}\"", step.name);
                    if let Some(similar) = suggest(&step.name, STEPS.iter().map(|s| s.name)) {
                        message.push_str(&format!(", did you mean \"{similar}\"?"));
                    }
                    invalid(errors, message, step.position);
                }
            },
        }

        if let StepBody::Children(children) = &step.body {
            for child in children {
                self.validate_step(child, errors);
            }
        }
    }

    fn validate_stage(
        &self,
        stage: &Stage,
        in_parallel: bool,
        names: &mut HashSet<String>,
        errors: &mut ErrorCollector,
    ) {
        if stage.name.trim().is_empty() {
            invalid(errors, "Stage name must not be empty", stage.position);
        } else if !names.insert(stage.name.clone()) {
            invalid(
                errors,
                format!("Duplicate stage name: \"{}\"", stage.name),
                stage.position,
            );
        }

        if let Some(agent) = &stage.agent {
            self.validate_agent(agent, errors);
        }
        if let Some(environment) = &stage.environment {
            self.validate_environment(environment, errors);
        }
        if let Some(tools) = &stage.tools {
            self.validate_tools(tools, errors);
        }
        if let Some(when) = &stage.when {
            self.validate_when(when, errors);
        }

        match (&stage.steps, &stage.parallel) {
            (Some(_), Some(_)) => invalid(
                errors,
                format!(
                    "Stage \"{}\" cannot have both \"steps\" and \"parallel\"",
                    stage.name
                ),
                stage.position,
            ),
            (None, None) => invalid(
                errors,
                format!("Nothing to execute within stage \"{}\"", stage.name),
                stage.position,
            ),
            (Some(steps), None) => {
                if steps.steps.is_empty() {
                    invalid(
                        errors,
                        format!("No steps specified for stage \"{}\"", stage.name),
                        steps.position,
                    );
                }
                for step in &steps.steps {
                    self.validate_step(step, errors);
                }
            }
            (None, Some(parallel)) => {
                if in_parallel {
                    invalid(
                        errors,
                        format!(
                            "Parallel stages can only be included in a top-level stage, found in \"{}\"",
                            stage.name
                        ),
                        stage.position,
                    );
                } else if parallel.is_empty() {
                    invalid(
                        errors,
                        format!("No parallel stages specified in stage \"{}\"", stage.name),
                        stage.position,
                    );
                }
                for branch in parallel {
                    self.validate_stage(branch, true, names, errors);
                }
            }
        }

        if let Some(post) = &stage.post {
            self.validate_post(post, errors);
        }
    }

    fn validate_agent(&self, agent: &Agent, errors: &mut ErrorCollector) {
        let AgentKind::Typed {
            agent_type,
            arguments,
        } = &agent.kind
        else {
            return;
        };

        if !AGENT_TYPES.contains(&agent_type.as_str()) {
            invalid(
                errors,
                format!(
                    "Invalid agent type \"{agent_type}\" specified. Must be one of [{}]",
                    AGENT_TYPES.join(", ")
                ),
                agent.position,
            );
            return;
        }

        // A lone value is the image for docker and the label for label/node.
        let required = match agent_type.as_str() {
            "docker" => Some("image"),
            "label" | "node" => Some("label"),
            _ => None,
        };
        if let (Some(required), AgentArguments::Named(args)) = (required, arguments) {
            if !args.iter().any(|a| a.key == required) {
                invalid(
                    errors,
                    format!(
                        "Missing required parameter \"{required}\" for agent type \"{agent_type}\""
                    ),
                    agent.position,
                );
            }
        }
    }

    fn validate_environment(&self, environment: &KeyValueList, errors: &mut ErrorCollector) {
        let mut seen = HashSet::new();
        for entry in &environment.entries {
            if !is_identifier(&entry.key) {
                invalid(
                    errors,
                    format!("\"{}\" is not a valid environment variable name", entry.key),
                    entry.position,
                );
            }
            if !seen.insert(entry.key.as_str()) {
                invalid(
                    errors,
                    format!("Duplicate environment variable name: \"{}\"", entry.key),
                    entry.position,
                );
            }
            match &entry.value {
                Value::MethodCall(call) if call.name != "credentials" => invalid(
                    errors,
                    format!(
                        "\"{}\" is not allowed in environment \"{}\"; only credentials() may be called",
                        call.name, entry.key
                    ),
                    entry.position,
                ),
                Value::List(_) => invalid(
                    errors,
                    format!("Environment variable \"{}\" cannot be a list", entry.key),
                    entry.position,
                ),
                _ => {}
            }
        }
    }

    fn validate_tools(&self, tools: &KeyValueList, errors: &mut ErrorCollector) {
        let mut seen = HashSet::new();
        for entry in &tools.entries {
            if !seen.insert(entry.key.as_str()) {
                invalid(
                    errors,
                    format!("Duplicate tool type: \"{}\"", entry.key),
                    entry.position,
                );
            }
        }
    }

    /// `options`, `parameters` and `triggers` against their registry table.
    fn validate_calls(
        &self,
        calls: &CallList,
        table: &[Signature],
        label: &str,
        errors: &mut ErrorCollector,
    ) {
        let mut seen = HashSet::new();
        for call in &calls.entries {
            let Some(signature) = lookup(table, &call.name) else {
                let mut message = format!(
                    "Invalid {label} type \"{}\". Valid {label} types: [{}]",
                    call.name,
                    table.iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
                );
                if let Some(similar) = suggest(&call.name, table.iter().map(|s| s.name)) {
                    message.push_str(&format!(", did you mean \"{similar}\"?"));
                }
                invalid(errors, message, call.position);
                continue;
            };
            // Several parameters of one type are normal; options and triggers
            // are singletons.
            if label != "parameter" && !seen.insert(call.name.as_str()) {
                invalid(
                    errors,
                    format!("Duplicate {label} \"{}\"", call.name),
                    call.position,
                );
            }
            check_arguments(signature, label, &call.arguments, call.position, errors);
        }
    }

    fn validate_parameter_names(&self, parameters: &CallList, errors: &mut ErrorCollector) {
        let mut seen = HashSet::new();
        for call in &parameters.entries {
            if let Some(name) = call.arguments.get("name").and_then(Value::as_str) {
                if !seen.insert(name) {
                    invalid(
                        errors,
                        format!("Duplicate parameter name: \"{name}\""),
                        call.position,
                    );
                }
            }
        }
    }

    fn validate_libraries(&self, libraries: &Libraries, errors: &mut ErrorCollector) {
        for library in &libraries.libraries {
            match library {
                Value::Literal(Literal::String(name)) if name.trim().is_empty() => invalid(
                    errors,
                    "Library identifier must not be empty",
                    libraries.position,
                ),
                Value::Literal(Literal::String(_)) | Value::Expression(_) => {}
                _ => invalid(
                    errors,
                    "Library identifier must be a string",
                    libraries.position,
                ),
            }
        }
    }

    fn validate_post(&self, post: &Post, errors: &mut ErrorCollector) {
        let mut seen = HashSet::new();
        for condition in &post.conditions {
            let name = condition.condition.as_str();
            if !POST_CONDITIONS.contains(&name) {
                invalid(
                    errors,
                    format!(
                        "Invalid condition \"{name}\" - valid conditions are [{}]",
                        POST_CONDITIONS.join(", ")
                    ),
                    condition.position,
                );
            } else if !seen.insert(name) {
                invalid(
                    errors,
                    format!("Duplicate post condition \"{name}\""),
                    condition.position,
                );
            }
            if condition.steps.is_empty() {
                invalid(
                    errors,
                    format!("No steps specified for post condition \"{name}\""),
                    condition.position,
                );
            }
            for step in &condition.steps {
                self.validate_step(step, errors);
            }
        }
    }

    fn validate_when(&self, when: &When, errors: &mut ErrorCollector) {
        if when.conditions.is_empty() {
            invalid(errors, "Empty \"when\" section", when.position);
        }
        for condition in &when.conditions {
            self.validate_when_condition(condition, errors);
        }
    }

    fn validate_when_condition(&self, condition: &WhenCondition, errors: &mut ErrorCollector) {
        let name = condition.name.as_str();
        let nested = NESTED_WHEN_CONDITIONS.contains(&name);

        match &condition.kind {
            WhenKind::Nested(children) if nested => {
                if name == "not" && children.len() != 1 {
                    invalid(
                        errors,
                        "\"not\" must contain exactly one condition",
                        condition.position,
                    );
                } else if children.is_empty() {
                    invalid(
                        errors,
                        format!("\"{name}\" must contain at least one condition"),
                        condition.position,
                    );
                }
                for child in children {
                    self.validate_when_condition(child, errors);
                }
            }
            WhenKind::Expression(code) if name == "expression" => {
                if code.trim().is_empty() {
                    invalid(errors, "Empty \"expression\" condition", condition.position);
                }
            }
            WhenKind::Simple(arguments) if !nested && name != "expression" => {
                match lookup(WHEN_CONDITIONS, name) {
                    Some(signature) => check_arguments(
                        signature,
                        "when condition",
                        arguments,
                        condition.position,
                        errors,
                    ),
                    None => {
                        let known = WHEN_CONDITIONS
                            .iter()
                            .map(|s| s.name)
                            .chain(NESTED_WHEN_CONDITIONS.iter().copied())
                            .chain(["expression"]);
                        let mut message = format!("Unknown when condition \"{name}\"");
                        if let Some(similar) = suggest(name, known) {
                            message.push_str(&format!(", did you mean \"{similar}\"?"));
                        }
                        invalid(errors, message, condition.position);
                    }
                }
            }
            _ if nested => invalid(
                errors,
                format!("\"{name}\" requires nested conditions"),
                condition.position,
            ),
            _ if name == "expression" => invalid(
                errors,
                "\"expression\" requires a block",
                condition.position,
            ),
            _ => invalid(
                errors,
                format!("\"{name}\" does not take nested conditions"),
                condition.position,
            ),
        }
    }
}
