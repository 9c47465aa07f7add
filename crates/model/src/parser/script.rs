/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Builds the Model AST from the generic syntax tree of a pipeline script.
 */

use std::collections::HashSet;

use crate::ast::{
    normalize_code, Agent, AgentArguments, AgentKind, Arguments, CallList, KeyValueList,
    Libraries, Literal, MethodCall, NamedArgument, Pipeline, Position, Post, PostCondition, Stage,
    Stages, Step, StepBody, Steps, Value, When, WhenCondition, WhenKind,
};
use crate::ast::step::SCRIPT_STEP;
use crate::collector::{ErrorCollector, ErrorKind};
use crate::error::ConversionError;
use crate::syntax::{self, Argument, Constant, Node, NodeKind};

/// Parse a complete pipeline script.
///
/// The script must contain exactly one top-level `pipeline { ... }` block.
/// Libraries imported with `@Library(...)` are merged ahead of the
/// `libraries` section; any other top-level statement is ignored with a
/// warning.
///
/// # Errors
///
/// Returns `ConversionError::Syntax` when the source does not parse and
/// `ConversionError::Structure` when no single pipeline block exists.
/// Problems inside the block are recorded in `errors` instead.
pub fn script_to_pipeline_def(
    text: &str,
    errors: &mut ErrorCollector,
) -> Result<Pipeline, ConversionError> {
    let nodes = syntax::parse(text).map_err(ConversionError::Syntax)?;

    let mut annotations = Vec::new();
    let mut statements = Vec::with_capacity(nodes.len());
    for node in &nodes {
        unwrap_annotations(node, &mut annotations, &mut statements);
    }

    let blocks: Vec<&Node> = statements
        .iter()
        .copied()
        .filter(|node| is_pipeline_block(node))
        .collect();
    let block = match blocks.as_slice() {
        [block] => *block,
        [] => {
            return Err(ConversionError::Structure(
                "no pipeline block found".to_string(),
            ))
        }
        _ => {
            return Err(ConversionError::Structure(
                "more than one pipeline block found".to_string(),
            ))
        }
    };

    let body = match block.as_call() {
        Some((_, [Argument::Positional(closure)])) => closure.as_closure().map(|(body, _)| body),
        _ => None,
    };
    let Some(body) = body else {
        return Err(ConversionError::Structure(
            "pipeline expects a single block argument".to_string(),
        ));
    };

    let mut walker = Walker {
        source: text,
        errors,
    };
    let imported = walker.imports(&annotations);
    for statement in statements {
        let placeholder = matches!(&statement.kind, NodeKind::Variable(name) if name == "_");
        if !placeholder && !is_pipeline_block(statement) {
            walker.ignored(
                format!(
                    "Ignored top-level statement: {}",
                    first_line(statement.text(text))
                ),
                statement,
            );
        }
    }

    let mut pipeline = walker.pipeline(block, body);
    if let Some(imported) = imported {
        match pipeline.libraries.as_mut() {
            Some(section) => {
                let declared = std::mem::take(&mut section.libraries);
                section.libraries = imported.libraries;
                section.libraries.extend(declared);
            }
            None => pipeline.libraries = Some(imported),
        }
    }
    Ok(pipeline)
}

fn is_pipeline_block(node: &Node) -> bool {
    matches!(node.as_call(), Some((name, _)) if name == "pipeline")
}

/// Collect the annotations wrapping `node` and the statement they apply to.
fn unwrap_annotations<'n>(
    node: &'n Node,
    annotations: &mut Vec<&'n Node>,
    statements: &mut Vec<&'n Node>,
) {
    match &node.kind {
        NodeKind::Annotation { target, .. } => {
            annotations.push(node);
            unwrap_annotations(target, annotations, statements);
        }
        _ => statements.push(node),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim_end()
}

/// Parse a snippet made only of step invocations.
///
/// # Errors
///
/// Returns `ConversionError::Syntax` when the source does not parse.
pub fn script_to_plain_steps(
    text: &str,
    errors: &mut ErrorCollector,
) -> Result<Vec<Step>, ConversionError> {
    let nodes = syntax::parse(text).map_err(ConversionError::Syntax)?;
    let mut walker = Walker {
        source: text,
        errors,
    };
    Ok(walker.steps(&nodes))
}

fn position(node: &Node) -> Position {
    Position::new(node.span.line, node.span.column)
}

/// Split a trailing closure off a call's arguments.
fn trailing_block(arguments: &[Argument]) -> (&[Argument], Option<&Node>) {
    match arguments.split_last() {
        Some((Argument::Positional(node), rest)) if node.as_closure().is_some() => {
            (rest, Some(node))
        }
        _ => (arguments, None),
    }
}

struct Walker<'a> {
    source: &'a str,
    errors: &'a mut ErrorCollector,
}

impl Walker<'_> {
    fn structure(&mut self, message: impl Into<String>, node: &Node) {
        self.errors
            .error(ErrorKind::Structure, message, position(node));
    }

    /// Body of a `name { ... }` section, or `None` after recording why not.
    fn block_body<'n>(&mut self, name: &str, node: &Node, arguments: &'n [Argument]) -> Option<&'n [Node]> {
        match trailing_block(arguments) {
            ([], Some(block)) => block.as_closure().map(|(body, _)| body),
            _ => {
                self.structure(format!("Expected a block for \"{name}\""), node);
                None
            }
        }
    }

    /// Report a repeated section; returns `true` the first time a name is seen.
    fn first_occurrence(&mut self, seen: &mut HashSet<String>, name: &str, node: &Node) -> bool {
        if seen.insert(name.to_string()) {
            true
        } else {
            self.structure(format!("Multiple occurrences of the {name} section"), node);
            false
        }
    }

    fn pipeline(&mut self, block: &Node, body: &[Node]) -> Pipeline {
        let mut pipeline = Pipeline {
            position: position(block),
            ..Pipeline::default()
        };
        let mut seen = HashSet::new();

        for node in body {
            let Some((name, arguments)) = node.as_call() else {
                self.structure(
                    format!("Expected a pipeline section, found: {}", node.text(self.source)),
                    node,
                );
                continue;
            };
            if !self.first_occurrence(&mut seen, name, node) {
                continue;
            }
            tracing::trace!(section = name, "parsing pipeline section");

            match name {
                "agent" => pipeline.agent = self.agent(node, arguments),
                "stages" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        pipeline.stages = Some(Stages {
                            position: position(node),
                            stages: self.stage_list(body),
                        });
                    }
                }
                "environment" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        pipeline.environment = Some(self.environment(node, body));
                    }
                }
                "tools" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        pipeline.tools = Some(self.tools(node, body));
                    }
                }
                "options" | "triggers" | "parameters" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        let list = Some(self.call_list(name, node, body));
                        match name {
                            "options" => pipeline.options = list,
                            "triggers" => pipeline.triggers = list,
                            _ => pipeline.parameters = list,
                        }
                    }
                }
                "libraries" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        pipeline.libraries = Some(self.libraries(node, body));
                    }
                }
                "post" => {
                    if let Some(body) = self.block_body(name, node, arguments) {
                        pipeline.post = Some(self.post(node, body));
                    }
                }
                _ => self.structure(format!("Undefined section \"{name}\""), node),
            }
        }
        pipeline
    }

    fn agent(&mut self, node: &Node, arguments: &[Argument]) -> Option<Agent> {
        let kind = match arguments {
            [Argument::Positional(Node {
                kind: NodeKind::Variable(word),
                ..
            })] if word == "any" => Some(AgentKind::Any),
            [Argument::Positional(Node {
                kind: NodeKind::Variable(word),
                ..
            })] if word == "none" => Some(AgentKind::None),
            // Legacy `agent label: 'linux'`
            [Argument::Named { name, value }] => Some(AgentKind::Typed {
                agent_type: name.clone(),
                arguments: AgentArguments::Single(self.value(value)),
            }),
            [Argument::Positional(block)] => match block.as_closure() {
                Some((body, _)) => self.agent_block(body),
                None => None,
            },
            _ => None,
        };

        match kind {
            Some(kind) => Some(Agent {
                position: position(node),
                kind,
            }),
            None => {
                self.structure(
                    format!("Invalid agent definition: {}", node.text(self.source)),
                    node,
                );
                None
            }
        }
    }

    /// `{ label 'x' }`, `{ docker 'img' }` or `{ docker { image 'img' } }`.
    fn agent_block(&mut self, body: &[Node]) -> Option<AgentKind> {
        let [statement] = body else {
            return None;
        };
        let (agent_type, arguments) = statement.as_call()?;

        let arguments = match trailing_block(arguments) {
            ([], Some(block)) => {
                let (entries, _) = block.as_closure()?;
                let mut named = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry.as_call() {
                        Some((key, [Argument::Positional(value)])) => named.push(NamedArgument {
                            position: position(entry),
                            key: key.to_string(),
                            value: self.value(value),
                        }),
                        _ => self.structure(
                            format!("Expected an agent option, found: {}", entry.text(self.source)),
                            entry,
                        ),
                    }
                }
                AgentArguments::Named(named)
            }
            ([Argument::Positional(value)], None) => AgentArguments::Single(self.value(value)),
            (named, None) if !named.is_empty() => AgentArguments::Named(self.named_arguments(named)?),
            _ => return None,
        };

        Some(AgentKind::Typed {
            agent_type: agent_type.to_string(),
            arguments,
        })
    }

    /// Children of `stages { }` and `parallel { }`.
    fn stage_list(&mut self, body: &[Node]) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(body.len());
        for node in body {
            match node.as_call() {
                Some(("stage", arguments)) => {
                    if let Some(stage) = self.stage(node, arguments) {
                        stages.push(stage);
                    }
                }
                _ => self.structure(
                    format!("Expected a stage, found: {}", node.text(self.source)),
                    node,
                ),
            }
        }
        stages
    }

    fn stage(&mut self, node: &Node, arguments: &[Argument]) -> Option<Stage> {
        let (name, body) = match trailing_block(arguments) {
            ([Argument::Positional(name)], Some(block)) => (name, block.as_closure()?.0),
            _ => {
                self.structure("Expected stage('name') { ... }", node);
                return None;
            }
        };
        let NodeKind::Constant(Constant::String(name)) = &name.kind else {
            self.structure("Stage name must be a string literal", name);
            return None;
        };

        let mut stage = Stage {
            position: position(node),
            name: name.clone(),
            ..Stage::default()
        };
        let mut seen = HashSet::new();

        for section in body {
            let Some((section_name, arguments)) = section.as_call() else {
                self.structure(
                    format!("Expected a stage section, found: {}", section.text(self.source)),
                    section,
                );
                continue;
            };
            if !self.first_occurrence(&mut seen, section_name, section) {
                continue;
            }

            if section_name == "agent" {
                stage.agent = self.agent(section, arguments);
                continue;
            }
            let known = matches!(
                section_name,
                "environment" | "tools" | "when" | "steps" | "parallel" | "post"
            );
            if !known {
                self.structure(format!("Undefined section \"{section_name}\""), section);
                continue;
            }
            let Some(block) = self.block_body(section_name, section, arguments) else {
                continue;
            };

            match section_name {
                "environment" => stage.environment = Some(self.environment(section, block)),
                "tools" => stage.tools = Some(self.tools(section, block)),
                "when" => stage.when = Some(self.when(section, block)),
                "steps" => {
                    stage.steps = Some(Steps {
                        position: position(section),
                        steps: self.steps(block),
                    })
                }
                "parallel" => stage.parallel = Some(self.stage_list(block)),
                _ => stage.post = Some(self.post(section, block)),
            }
        }
        Some(stage)
    }

    fn steps(&mut self, body: &[Node]) -> Vec<Step> {
        body.iter().filter_map(|node| self.step(node)).collect()
    }

    fn step(&mut self, node: &Node) -> Option<Step> {
        let Some((name, arguments)) = node.as_call() else {
            self.structure(
                format!("Expected a step, found: {}", node.text(self.source)),
                node,
            );
            return None;
        };
        let (arguments, block) = trailing_block(arguments);

        if name == SCRIPT_STEP {
            return match (arguments, block.and_then(Node::as_closure)) {
                ([], Some((_, inner))) => Some(Step {
                    position: position(node),
                    name: name.to_string(),
                    arguments: Arguments::none(),
                    body: StepBody::Script(normalize_code(&self.source[inner.0..inner.1])),
                }),
                _ => {
                    self.structure("Expected a block for \"script\"", node);
                    None
                }
            };
        }

        let arguments = self.arguments(name, node, arguments)?;
        let body = match block.and_then(Node::as_closure) {
            Some((children, _)) => StepBody::Children(self.steps(children)),
            None => StepBody::None,
        };
        Some(Step {
            position: position(node),
            name: name.to_string(),
            arguments,
            body,
        })
    }

    fn arguments(&mut self, name: &str, node: &Node, arguments: &[Argument]) -> Option<Arguments> {
        let named = arguments
            .iter()
            .filter(|a| matches!(a, Argument::Named { .. }))
            .count();
        if named == 0 {
            let values = arguments
                .iter()
                .filter_map(|a| match a {
                    Argument::Positional(value) => Some(self.value(value)),
                    Argument::Named { .. } => None,
                })
                .collect::<Vec<_>>();
            return Some(if values.is_empty() {
                Arguments::none()
            } else {
                Arguments::Positional(values)
            });
        }
        if named != arguments.len() {
            self.structure(
                format!("Cannot mix named and positional arguments in \"{name}\""),
                node,
            );
            return None;
        }
        self.named_arguments(arguments).map(Arguments::Named)
    }

    fn named_arguments(&mut self, arguments: &[Argument]) -> Option<Vec<NamedArgument>> {
        arguments
            .iter()
            .map(|a| match a {
                Argument::Named { name, value } => Some(NamedArgument {
                    position: position(value),
                    key: name.clone(),
                    value: self.value(value),
                }),
                Argument::Positional(_) => None,
            })
            .collect()
    }

    fn value(&mut self, node: &Node) -> Value {
        match &node.kind {
            NodeKind::Constant(constant) => Value::Literal(match constant {
                Constant::String(s) => Literal::String(s.clone()),
                Constant::Integer(n) => Literal::Int(*n),
                Constant::Float(f) => Literal::Float(*f),
                Constant::Boolean(b) => Literal::Bool(*b),
                Constant::Null => Literal::Null,
            }),
            NodeKind::Unary {
                operator: "-",
                operand,
                postfix: false,
            } => match operand.kind {
                NodeKind::Constant(Constant::Integer(n)) => Value::Literal(Literal::Int(-n)),
                NodeKind::Constant(Constant::Float(f)) => {
                    // `-9223372036854775808` lexes as a float since only the
                    // negated literal fits in an i64.
                    let digits = operand.text(self.source);
                    match format!("-{digits}").parse::<i64>() {
                        Ok(n) if digits.bytes().all(|b| b.is_ascii_digit()) => {
                            Value::Literal(Literal::Int(n))
                        }
                        _ => Value::Literal(Literal::Float(-f)),
                    }
                }
                _ => Value::Expression(node.text(self.source).to_string()),
            },
            NodeKind::List(items) => Value::List(items.iter().map(|i| self.value(i)).collect()),
            NodeKind::Call {
                object: None,
                method,
                arguments,
            } if trailing_block(arguments).1.is_none() => {
                let named = arguments
                    .iter()
                    .filter(|a| matches!(a, Argument::Named { .. }))
                    .count();
                if named != 0 && named != arguments.len() {
                    return Value::Expression(node.text(self.source).to_string());
                }
                let arguments = self.arguments(method, node, arguments).unwrap_or_default();
                Value::MethodCall(MethodCall {
                    position: position(node),
                    name: method.clone(),
                    arguments,
                })
            }
            _ => Value::Expression(node.text(self.source).to_string()),
        }
    }

    fn environment(&mut self, node: &Node, body: &[Node]) -> KeyValueList {
        let mut entries = Vec::with_capacity(body.len());
        for statement in body {
            match &statement.kind {
                NodeKind::Assignment {
                    target,
                    operator: "=",
                    value,
                } => match &target.kind {
                    NodeKind::Variable(key) => entries.push(NamedArgument {
                        position: position(statement),
                        key: key.clone(),
                        value: self.value(value),
                    }),
                    _ => self.structure(
                        format!(
                            "Environment variable name must be an identifier, found: {}",
                            target.text(self.source)
                        ),
                        target,
                    ),
                },
                _ => self.structure(
                    format!(
                        "Expected an environment variable assignment, found: {}",
                        statement.text(self.source)
                    ),
                    statement,
                ),
            }
        }
        KeyValueList {
            position: position(node),
            entries,
        }
    }

    fn tools(&mut self, node: &Node, body: &[Node]) -> KeyValueList {
        let mut entries = Vec::with_capacity(body.len());
        for statement in body {
            match statement.as_call() {
                Some((tool, [Argument::Positional(value)])) => entries.push(NamedArgument {
                    position: position(statement),
                    key: tool.to_string(),
                    value: self.value(value),
                }),
                _ => self.structure(
                    format!(
                        "Expected a tool as type 'name', found: {}",
                        statement.text(self.source)
                    ),
                    statement,
                ),
            }
        }
        KeyValueList {
            position: position(node),
            entries,
        }
    }

    /// `options`, `triggers` and `parameters`.
    fn call_list(&mut self, section: &str, node: &Node, body: &[Node]) -> CallList {
        let mut entries = Vec::with_capacity(body.len());
        for statement in body {
            match &statement.kind {
                NodeKind::Variable(name) => entries.push(MethodCall {
                    position: position(statement),
                    name: name.clone(),
                    arguments: Arguments::none(),
                }),
                _ => match statement.as_call() {
                    Some((name, arguments)) if trailing_block(arguments).1.is_none() => {
                        if let Some(arguments) = self.arguments(name, statement, arguments) {
                            entries.push(MethodCall {
                                position: position(statement),
                                name: name.to_string(),
                                arguments,
                            });
                        }
                    }
                    _ => self.structure(
                        format!(
                            "Expected a method call in \"{section}\", found: {}",
                            statement.text(self.source)
                        ),
                        statement,
                    ),
                },
            }
        }
        CallList {
            position: position(node),
            entries,
        }
    }

    fn ignored(&mut self, message: impl Into<String>, node: &Node) {
        self.errors
            .warning(ErrorKind::Structure, message, position(node));
    }

    /// Libraries named by `@Library` annotations, in source order.
    fn imports(&mut self, annotations: &[&Node]) -> Option<Libraries> {
        let mut section: Option<Libraries> = None;
        for annotation in annotations {
            let NodeKind::Annotation {
                name, arguments, ..
            } = &annotation.kind
            else {
                continue;
            };
            if name != "Library" {
                self.ignored(format!("Ignored annotation @{name}"), annotation);
                continue;
            }
            let imports = section.get_or_insert_with(|| Libraries {
                position: position(annotation),
                libraries: Vec::new(),
            });
            for argument in arguments {
                let value = match argument {
                    Argument::Positional(value) => value,
                    Argument::Named { name, value } if name == "value" => value,
                    Argument::Named { .. } => continue,
                };
                match self.value(value) {
                    Value::List(items) => imports.libraries.extend(items),
                    value => imports.libraries.push(value),
                }
            }
        }
        section
    }

    fn libraries(&mut self, node: &Node, body: &[Node]) -> Libraries {
        let mut libraries = Vec::with_capacity(body.len());
        for statement in body {
            match statement.as_call() {
                Some(("lib", [Argument::Positional(value)])) => libraries.push(self.value(value)),
                _ => self.structure(
                    format!(
                        "Expected a library as lib('name'), found: {}",
                        statement.text(self.source)
                    ),
                    statement,
                ),
            }
        }
        Libraries {
            position: position(node),
            libraries,
        }
    }

    fn post(&mut self, node: &Node, body: &[Node]) -> Post {
        let mut conditions = Vec::with_capacity(body.len());
        for statement in body {
            let steps = statement
                .as_call()
                .and_then(|(condition, arguments)| match trailing_block(arguments) {
                    ([], Some(block)) => Some((condition, block.as_closure()?.0)),
                    _ => None,
                });
            match steps {
                Some((condition, steps)) => conditions.push(PostCondition {
                    position: position(statement),
                    condition: condition.to_string(),
                    steps: self.steps(steps),
                }),
                None => self.structure(
                    format!(
                        "Expected a post condition block, found: {}",
                        statement.text(self.source)
                    ),
                    statement,
                ),
            }
        }
        Post {
            position: position(node),
            conditions,
        }
    }

    fn when(&mut self, node: &Node, body: &[Node]) -> When {
        When {
            position: position(node),
            conditions: self.when_conditions(body),
        }
    }

    fn when_conditions(&mut self, body: &[Node]) -> Vec<WhenCondition> {
        body.iter()
            .filter_map(|node| self.when_condition(node))
            .collect()
    }

    fn when_condition(&mut self, node: &Node) -> Option<WhenCondition> {
        if let NodeKind::Variable(name) = &node.kind {
            return Some(WhenCondition {
                position: position(node),
                name: name.clone(),
                kind: WhenKind::Simple(Arguments::none()),
            });
        }

        let Some((name, arguments)) = node.as_call() else {
            self.structure(
                format!("Expected a when condition, found: {}", node.text(self.source)),
                node,
            );
            return None;
        };

        let kind = match (name, trailing_block(arguments)) {
            ("not" | "allOf" | "anyOf", ([], Some(block))) => {
                let (children, _) = block.as_closure()?;
                WhenKind::Nested(self.when_conditions(children))
            }
            ("expression", ([], Some(block))) => {
                let (_, inner) = block.as_closure()?;
                WhenKind::Expression(normalize_code(&self.source[inner.0..inner.1]))
            }
            (_, (arguments, None)) => WhenKind::Simple(self.arguments(name, node, arguments)?),
            _ => {
                self.structure(format!("Unexpected block for when condition \"{name}\""), node);
                return None;
            }
        };

        Some(WhenCondition {
            position: position(node),
            name: name.to_string(),
            kind,
        })
    }
}
