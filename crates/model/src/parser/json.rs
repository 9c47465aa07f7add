/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Builds the Model AST from the JSON representation.
 *
 * Accepts the canonical form produced by the JSON renderer as well as the
 * compact shorthand (`"agent": "any"`, `{"sh": "make"}`). Every shape problem
 * is recorded against a dotted field path and parsing moves on to the next
 * sibling.
 */

use serde_json::Number;

use crate::ast::step::{SCRIPT_BLOCK_KEY, SCRIPT_STEP};
use crate::ast::{
    is_identifier, normalize_code, Agent, AgentArguments, AgentKind, Arguments, CallList,
    KeyValueList, Libraries, Literal, MethodCall, NamedArgument, Pipeline, Position, Post,
    PostCondition, Stage, Stages, Step, StepBody, Steps, Value, When, WhenCondition, WhenKind,
};
use crate::collector::{ErrorCollector, ErrorKind};
use crate::config::{ConverterConfig, UnknownFieldPolicy};

const PIPELINE_FIELDS: &[&str] = &[
    "agent",
    "stages",
    "environment",
    "options",
    "parameters",
    "triggers",
    "tools",
    "libraries",
    "post",
];
const STAGE_FIELDS: &[&str] = &[
    "name",
    "branches",
    "steps",
    "parallel",
    "agent",
    "environment",
    "tools",
    "when",
    "post",
];
const NESTED_WHEN: &[&str] = &["not", "allOf", "anyOf"];

/// JSON value normalised for structural matching.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    /// Fields in document order.
    Object(Vec<(String, JsonNode)>),
    Array(Vec<JsonNode>),
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl JsonNode {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        match self {
            Self::Object(fields) => field(fields, key),
            _ => None,
        }
    }

    fn literal(&self) -> Option<Literal> {
        match self {
            Self::String(s) => Some(Literal::String(s.clone())),
            Self::Number(n) => n
                .as_i64()
                .map(Literal::Int)
                .or_else(|| n.as_f64().map(Literal::Float)),
            Self::Bool(b) => Some(Literal::Bool(*b)),
            Self::Null => Some(Literal::Null),
            Self::Object(_) | Self::Array(_) => None,
        }
    }
}

impl From<&serde_json::Value> for JsonNode {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
            serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Number(n) => Self::Number(n.clone()),
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Null => Self::Null,
        }
    }
}

fn field<'n>(fields: &'n [(String, JsonNode)], key: &str) -> Option<&'n JsonNode> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

/// Parser from JSON to the Model AST.
///
/// Diagnostics accumulate across calls; read them with [`collector`] or take
/// them with [`into_collector`].
///
/// [`collector`]: JsonParser::collector
/// [`into_collector`]: JsonParser::into_collector
pub struct JsonParser {
    config: ConverterConfig,
    errors: ErrorCollector,
}

impl JsonParser {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            config: *config,
            errors: ErrorCollector::new(),
        }
    }

    pub fn collector(&self) -> &ErrorCollector {
        &self.errors
    }

    pub fn into_collector(self) -> ErrorCollector {
        self.errors
    }

    /// Parse a whole `{"pipeline": {...}}` document.
    ///
    /// Returns `None` only when the document has no usable pipeline object;
    /// a pipeline with problems in its sections is still returned.
    pub fn parse(&mut self, value: &serde_json::Value) -> Option<Pipeline> {
        let root = JsonNode::from(value);
        let fields = self.object("", &root)?;
        self.check_fields("", fields, &["pipeline"]);
        let pipeline = self.required("", fields, "pipeline")?;
        let pipeline = self.pipeline("pipeline", pipeline);
        tracing::debug!(
            errors = self.errors.error_count(),
            "parsed JSON pipeline"
        );
        pipeline
    }

    /// Parse a single step object.
    pub fn parse_step(&mut self, value: &serde_json::Value) -> Option<Step> {
        self.step("", &JsonNode::from(value))
    }

    /// Parse an array of step objects, or one step object on its own.
    ///
    /// Array elements that are not objects are skipped.
    pub fn parse_steps(&mut self, value: &serde_json::Value) -> Vec<Step> {
        match JsonNode::from(value) {
            JsonNode::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| matches!(item, JsonNode::Object(_)))
                .filter_map(|(i, item)| self.step(&index("", i), item))
                .collect(),
            node @ JsonNode::Object(_) => self.step("", &node).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    // ---- diagnostics ----

    fn schema(&mut self, path: &str, message: &str) {
        let message = if path.is_empty() {
            message.to_string()
        } else {
            format!("{path}: {message}")
        };
        self.errors
            .error(ErrorKind::Schema, message, Position::Synthetic);
    }

    fn mistyped(&mut self, path: &str, expected: &str, found: &JsonNode) {
        self.schema(
            path,
            &format!("expected {expected}, found {}", found.type_name()),
        );
    }

    fn check_fields(&mut self, path: &str, fields: &[(String, JsonNode)], known: &[&str]) {
        for (key, _) in fields {
            if known.contains(&key.as_str()) {
                continue;
            }
            let message = format!("unknown field \"{key}\"");
            match self.config.unknown_fields {
                UnknownFieldPolicy::Warn => {
                    let message = if path.is_empty() {
                        message
                    } else {
                        format!("{path}: {message}")
                    };
                    self.errors
                        .warning(ErrorKind::Schema, message, Position::Synthetic);
                }
                UnknownFieldPolicy::Reject => self.schema(path, &message),
                UnknownFieldPolicy::Ignore => {}
            }
        }
    }

    // ---- typed accessors ----

    fn object<'n>(&mut self, path: &str, node: &'n JsonNode) -> Option<&'n [(String, JsonNode)]> {
        match node {
            JsonNode::Object(fields) => Some(fields),
            other => {
                self.mistyped(path, "object", other);
                None
            }
        }
    }

    fn array<'n>(&mut self, path: &str, node: &'n JsonNode) -> Option<&'n [JsonNode]> {
        match node {
            JsonNode::Array(items) => Some(items),
            other => {
                self.mistyped(path, "array", other);
                None
            }
        }
    }

    fn string<'n>(&mut self, path: &str, node: &'n JsonNode) -> Option<&'n str> {
        match node {
            JsonNode::String(s) => Some(s),
            other => {
                self.mistyped(path, "string", other);
                None
            }
        }
    }

    fn required<'n>(
        &mut self,
        path: &str,
        fields: &'n [(String, JsonNode)],
        key: &str,
    ) -> Option<&'n JsonNode> {
        let found = field(fields, key);
        if found.is_none() {
            self.schema(path, &format!("missing required field \"{key}\""));
        }
        found
    }

    // ---- pipeline ----

    fn pipeline(&mut self, path: &str, node: &JsonNode) -> Option<Pipeline> {
        let fields = self.object(path, node)?;
        self.check_fields(path, fields, PIPELINE_FIELDS);

        let mut pipeline = Pipeline::default();
        for (key, value) in fields {
            let path = child(path, key);
            match key.as_str() {
                "agent" => pipeline.agent = self.agent(&path, value),
                "stages" => {
                    if let Some(items) = self.array(&path, value) {
                        pipeline.stages = Some(Stages {
                            position: Position::Synthetic,
                            stages: self.stage_list(&path, items),
                        });
                    }
                }
                "environment" => pipeline.environment = self.key_value_list(&path, value),
                "tools" => pipeline.tools = self.key_value_list(&path, value),
                "options" => pipeline.options = self.call_list(&path, "options", value),
                "triggers" => pipeline.triggers = self.call_list(&path, "triggers", value),
                "parameters" => pipeline.parameters = self.call_list(&path, "parameters", value),
                "libraries" => pipeline.libraries = self.libraries(&path, value),
                "post" => pipeline.post = self.post(&path, value),
                _ => {}
            }
        }
        Some(pipeline)
    }

    fn agent(&mut self, path: &str, node: &JsonNode) -> Option<Agent> {
        let kind = match node {
            JsonNode::String(s) if s == "any" => AgentKind::Any,
            JsonNode::String(s) if s == "none" => AgentKind::None,
            JsonNode::String(s) => {
                self.schema(
                    path,
                    &format!("agent \"{s}\" needs an argument; use {{\"type\": \"{s}\", ...}}"),
                );
                return None;
            }
            JsonNode::Object(fields) if field(fields, "type").is_some() => {
                self.check_fields(path, fields, &["type", "argument", "arguments"]);
                let agent_type = self.string(&child(path, "type"), node.get("type")?)?;
                match agent_type {
                    "any" => AgentKind::Any,
                    "none" => AgentKind::None,
                    _ => {
                        let arguments = match (field(fields, "argument"), field(fields, "arguments")) {
                            (Some(value), None) => {
                                AgentArguments::Single(self.value(&child(path, "argument"), value)?)
                            }
                            (None, Some(arguments)) => {
                                let path = child(path, "arguments");
                                let items = self.array(&path, arguments)?;
                                AgentArguments::Named(self.named_list(&path, items))
                            }
                            (Some(_), Some(_)) => {
                                self.schema(path, "\"argument\" and \"arguments\" are mutually exclusive");
                                return None;
                            }
                            (None, None) => {
                                self.schema(path, "missing required field \"argument\"");
                                return None;
                            }
                        };
                        AgentKind::Typed {
                            agent_type: agent_type.to_string(),
                            arguments,
                        }
                    }
                }
            }
            // Compact: {"docker": "maven"} or {"docker": {"image": "maven"}}
            JsonNode::Object(fields) if fields.len() == 1 => {
                let (agent_type, value) = &fields[0];
                let path = child(path, agent_type);
                let arguments = match value {
                    JsonNode::Object(entries) if !is_value_object(entries) => {
                        AgentArguments::Named(self.compact_named(&path, entries))
                    }
                    value => AgentArguments::Single(self.value(&path, value)?),
                };
                AgentKind::Typed {
                    agent_type: agent_type.clone(),
                    arguments,
                }
            }
            JsonNode::Object(_) => {
                self.schema(path, "missing required field \"type\"");
                return None;
            }
            other => {
                self.mistyped(path, "string or object", other);
                return None;
            }
        };
        Some(Agent {
            position: Position::Synthetic,
            kind,
        })
    }

    fn stage_list(&mut self, path: &str, items: &[JsonNode]) -> Vec<Stage> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.stage(&index(path, i), item))
            .collect()
    }

    fn stage(&mut self, path: &str, node: &JsonNode) -> Option<Stage> {
        let mut fields = self.object(path, node)?;
        // Compact: {"stage": {...}}
        if let [(key, inner)] = fields {
            if key == "stage" {
                fields = self.object(&child(path, "stage"), inner)?;
            }
        }
        self.check_fields(path, fields, STAGE_FIELDS);

        let name = self.required(path, fields, "name")?;
        let name = self.string(&child(path, "name"), name)?;
        let mut stage = Stage {
            name: name.to_string(),
            ..Stage::default()
        };

        if field(fields, "branches").is_some() && field(fields, "steps").is_some() {
            self.schema(path, "\"branches\" and \"steps\" are mutually exclusive");
        }

        for (key, value) in fields {
            let path = child(path, key);
            match key.as_str() {
                "branches" => {
                    if let Some(steps) = self.branches(&path, value) {
                        stage.steps = Some(Steps {
                            position: Position::Synthetic,
                            steps,
                        });
                    }
                }
                "steps" => {
                    if stage.steps.is_none() {
                        if let Some(items) = self.array(&path, value) {
                            stage.steps = Some(Steps {
                                position: Position::Synthetic,
                                steps: self.step_list(&path, items),
                            });
                        }
                    }
                }
                "parallel" => {
                    if let Some(items) = self.array(&path, value) {
                        stage.parallel = Some(self.stage_list(&path, items));
                    }
                }
                "agent" => stage.agent = self.agent(&path, value),
                "environment" => stage.environment = self.key_value_list(&path, value),
                "tools" => stage.tools = self.key_value_list(&path, value),
                "when" => stage.when = self.when(&path, value),
                "post" => stage.post = self.post(&path, value),
                _ => {}
            }
        }
        Some(stage)
    }

    /// Canonical stage steps: a single `default` branch.
    fn branches(&mut self, path: &str, node: &JsonNode) -> Option<Vec<Step>> {
        let items = self.array(path, node)?;
        match items {
            [branch] => self.branch(&index(path, 0), branch),
            [] => {
                self.schema(path, "expected one branch, found none");
                None
            }
            _ => {
                self.schema(
                    path,
                    &format!(
                        "expected one branch, found {}; use \"parallel\" for concurrent stages",
                        items.len()
                    ),
                );
                None
            }
        }
    }

    fn branch(&mut self, path: &str, node: &JsonNode) -> Option<Vec<Step>> {
        let fields = self.object(path, node)?;
        self.check_fields(path, fields, &["name", "steps"]);
        if let Some(name) = field(fields, "name") {
            self.string(&child(path, "name"), name);
        }
        let steps = self.required(path, fields, "steps")?;
        let path = child(path, "steps");
        let items = self.array(&path, steps)?;
        Some(self.step_list(&path, items))
    }

    // ---- steps ----

    fn step_list(&mut self, path: &str, items: &[JsonNode]) -> Vec<Step> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.step(&index(path, i), item))
            .collect()
    }

    fn step(&mut self, path: &str, node: &JsonNode) -> Option<Step> {
        let fields = self.object(path, node)?;

        if field(fields, "name").is_none() {
            // Compact: {"sh": "make"}
            let [(name, arguments)] = fields else {
                self.schema(path, "missing required field \"name\"");
                return None;
            };
            let path = child(path, name);
            self.step_name(&path, name)?;
            if name == SCRIPT_STEP {
                let code = self.string(&path, arguments)?;
                return Some(Step::script(code));
            }
            return Some(Step::new(name.clone(), self.compact_arguments(&path, arguments)?));
        }

        self.check_fields(path, fields, &["name", "arguments", "children"]);
        let name_path = child(path, "name");
        let name = self.string(&name_path, node.get("name")?)?;
        self.step_name(&name_path, name)?;

        let arguments = match field(fields, "arguments") {
            Some(arguments) => self.arguments(&child(path, "arguments"), arguments)?,
            None => Arguments::none(),
        };

        if name == SCRIPT_STEP {
            let code = match arguments.get(SCRIPT_BLOCK_KEY) {
                Some(Value::Literal(Literal::String(code))) | Some(Value::Expression(code)) => {
                    code.clone()
                }
                _ => {
                    self.schema(
                        &child(path, "arguments"),
                        &format!("missing required argument \"{SCRIPT_BLOCK_KEY}\""),
                    );
                    return None;
                }
            };
            return Some(Step::script(&code));
        }

        let body = match field(fields, "children") {
            Some(children) => {
                let path = child(path, "children");
                let items = self.array(&path, children)?;
                StepBody::Children(self.step_list(&path, items))
            }
            None => StepBody::None,
        };
        Some(Step {
            position: Position::Synthetic,
            name: name.to_string(),
            arguments,
            body,
        })
    }

    fn step_name(&mut self, path: &str, name: &str) -> Option<()> {
        if is_identifier(name) {
            Some(())
        } else {
            self.schema(path, &format!("\"{name}\" is not a valid step name"));
            None
        }
    }

    // ---- values and arguments ----

    fn value(&mut self, path: &str, node: &JsonNode) -> Option<Value> {
        match node {
            JsonNode::Object(fields) => {
                if let Some(flag) = field(fields, "isLiteral") {
                    self.check_fields(path, fields, &["isLiteral", "value"]);
                    let JsonNode::Bool(is_literal) = flag else {
                        self.mistyped(&child(path, "isLiteral"), "boolean", flag);
                        return None;
                    };
                    let raw = self.required(path, fields, "value")?;
                    let path = child(path, "value");
                    if *is_literal {
                        match raw.literal() {
                            Some(literal) => Some(Value::Literal(literal)),
                            None => {
                                self.mistyped(&path, "string, number, boolean or null", raw);
                                None
                            }
                        }
                    } else {
                        self.string(&path, raw).map(Value::expression)
                    }
                } else if let Some(list) = field(fields, "list") {
                    self.check_fields(path, fields, &["list"]);
                    let path = child(path, "list");
                    let items = self.array(&path, list)?;
                    Some(Value::List(self.value_list(&path, items)))
                } else if field(fields, "name").is_some() {
                    self.method_call(path, node).map(Value::MethodCall)
                } else {
                    self.schema(path, "expected a value object");
                    None
                }
            }
            JsonNode::Array(items) => Some(Value::List(self.value_list(path, items))),
            scalar => scalar.literal().map(Value::Literal),
        }
    }

    fn value_list(&mut self, path: &str, items: &[JsonNode]) -> Vec<Value> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.value(&index(path, i), item))
            .collect()
    }

    /// Canonical arguments: one value object, an array of values, or an
    /// array of `{"key", "value"}` pairs.
    fn arguments(&mut self, path: &str, node: &JsonNode) -> Option<Arguments> {
        match node {
            JsonNode::Null => Some(Arguments::none()),
            JsonNode::Array(items) => {
                let keyed = items.iter().filter(|i| i.get("key").is_some()).count();
                if items.is_empty() {
                    Some(Arguments::none())
                } else if keyed == items.len() {
                    Some(Arguments::Named(self.named_list(path, items)))
                } else if keyed == 0 {
                    Some(Arguments::Positional(self.value_list(path, items)))
                } else {
                    self.schema(path, "cannot mix named and positional arguments");
                    None
                }
            }
            JsonNode::Object(fields) if field(fields, "key").is_some() => self
                .named_argument(path, node)
                .map(|argument| Arguments::Named(vec![argument])),
            value => self.value(path, value).map(Arguments::single),
        }
    }

    /// Arguments of a compact step or method call.
    fn compact_arguments(&mut self, path: &str, node: &JsonNode) -> Option<Arguments> {
        match node {
            JsonNode::Null => Some(Arguments::none()),
            JsonNode::Object(fields) if !is_value_object(fields) => {
                Some(Arguments::Named(self.compact_named(path, fields)))
            }
            JsonNode::Array(items) if items.is_empty() => Some(Arguments::none()),
            JsonNode::Array(items) => Some(Arguments::Positional(self.value_list(path, items))),
            value => self.value(path, value).map(Arguments::single),
        }
    }

    fn compact_named(&mut self, path: &str, fields: &[(String, JsonNode)]) -> Vec<NamedArgument> {
        fields
            .iter()
            .filter_map(|(key, value)| {
                self.value(&child(path, key), value)
                    .map(|value| NamedArgument::new(key.clone(), value))
            })
            .collect()
    }

    fn named_list(&mut self, path: &str, items: &[JsonNode]) -> Vec<NamedArgument> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.named_argument(&index(path, i), item))
            .collect()
    }

    fn named_argument(&mut self, path: &str, node: &JsonNode) -> Option<NamedArgument> {
        let fields = self.object(path, node)?;
        self.check_fields(path, fields, &["key", "value"]);
        let key = self.required(path, fields, "key")?;
        let key = self.string(&child(path, "key"), key)?;
        let value = self.required(path, fields, "value")?;
        let value = self.value(&child(path, "value"), value)?;
        Some(NamedArgument::new(key, value))
    }

    fn method_call(&mut self, path: &str, node: &JsonNode) -> Option<MethodCall> {
        match node {
            // Compact: "timestamps"
            JsonNode::String(name) => Some(MethodCall::new(name.clone(), Arguments::none())),
            JsonNode::Object(fields) if field(fields, "name").is_some() => {
                self.check_fields(path, fields, &["name", "arguments"]);
                let name = self.string(&child(path, "name"), node.get("name")?)?;
                let arguments = match field(fields, "arguments") {
                    Some(arguments) => self.arguments(&child(path, "arguments"), arguments)?,
                    None => Arguments::none(),
                };
                Some(MethodCall::new(name, arguments))
            }
            // Compact: {"timeout": {"time": 5}}
            JsonNode::Object(fields) if fields.len() == 1 => {
                let (name, arguments) = &fields[0];
                let arguments = self.compact_arguments(&child(path, name), arguments)?;
                Some(MethodCall::new(name.clone(), arguments))
            }
            other => {
                self.mistyped(path, "method call", other);
                None
            }
        }
    }

    // ---- directives ----

    fn key_value_list(&mut self, path: &str, node: &JsonNode) -> Option<KeyValueList> {
        let entries = match node {
            JsonNode::Array(items) => self.named_list(path, items),
            // Compact: {"CC": "clang"}
            JsonNode::Object(fields) => self.compact_named(path, fields),
            other => {
                self.mistyped(path, "array", other);
                return None;
            }
        };
        Some(KeyValueList {
            position: Position::Synthetic,
            entries,
        })
    }

    /// `options`, `triggers` and `parameters`: `{"<section>": [calls]}` or a
    /// bare array of calls.
    fn call_list(&mut self, path: &str, section: &str, node: &JsonNode) -> Option<CallList> {
        let (path, items) = match node {
            JsonNode::Object(fields) => {
                self.check_fields(path, fields, &[section]);
                let items = self.required(path, fields, section)?;
                let path = child(path, section);
                let items = self.array(&path, items)?;
                (path, items)
            }
            JsonNode::Array(items) => (path.to_string(), items.as_slice()),
            other => {
                self.mistyped(path, "object", other);
                return None;
            }
        };
        let entries = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.method_call(&index(&path, i), item))
            .collect();
        Some(CallList {
            position: Position::Synthetic,
            entries,
        })
    }

    fn libraries(&mut self, path: &str, node: &JsonNode) -> Option<Libraries> {
        let (path, items) = match node {
            JsonNode::Object(fields) => {
                self.check_fields(path, fields, &["libraries"]);
                let items = self.required(path, fields, "libraries")?;
                let path = child(path, "libraries");
                let items = self.array(&path, items)?;
                (path, items)
            }
            JsonNode::Array(items) => (path.to_string(), items.as_slice()),
            other => {
                self.mistyped(path, "object", other);
                return None;
            }
        };
        Some(Libraries {
            position: Position::Synthetic,
            libraries: self.value_list(&path, items),
        })
    }

    fn post(&mut self, path: &str, node: &JsonNode) -> Option<Post> {
        let fields = self.object(path, node)?;
        let mut conditions = Vec::new();

        if let Some(list) = field(fields, "conditions") {
            self.check_fields(path, fields, &["conditions"]);
            let path = child(path, "conditions");
            let items = self.array(&path, list)?;
            for (i, item) in items.iter().enumerate() {
                if let Some(condition) = self.post_condition(&index(&path, i), item) {
                    conditions.push(condition);
                }
            }
        } else {
            // Compact: {"always": [steps]}
            for (condition, steps) in fields {
                let path = child(path, condition);
                if let Some(items) = self.array(&path, steps) {
                    conditions.push(PostCondition {
                        position: Position::Synthetic,
                        condition: condition.clone(),
                        steps: self.step_list(&path, items),
                    });
                }
            }
        }

        Some(Post {
            position: Position::Synthetic,
            conditions,
        })
    }

    fn post_condition(&mut self, path: &str, node: &JsonNode) -> Option<PostCondition> {
        let fields = self.object(path, node)?;
        self.check_fields(path, fields, &["condition", "branch"]);
        let condition = self.required(path, fields, "condition")?;
        let condition = self.string(&child(path, "condition"), condition)?;
        let branch = self.required(path, fields, "branch")?;
        let steps = self.branch(&child(path, "branch"), branch)?;
        Some(PostCondition {
            position: Position::Synthetic,
            condition: condition.to_string(),
            steps,
        })
    }

    fn when(&mut self, path: &str, node: &JsonNode) -> Option<When> {
        let conditions = match node {
            JsonNode::Object(fields) if field(fields, "conditions").is_some() => {
                self.check_fields(path, fields, &["conditions"]);
                let path = child(path, "conditions");
                let items = self.array(&path, node.get("conditions")?)?;
                self.when_conditions(&path, items)
            }
            JsonNode::Array(items) => self.when_conditions(path, items),
            // Compact: {"branch": "main", "not": {"branch": "dev"}}
            JsonNode::Object(fields) => self.compact_when(path, fields),
            other => {
                self.mistyped(path, "object", other);
                return None;
            }
        };
        Some(When {
            position: Position::Synthetic,
            conditions,
        })
    }

    fn when_conditions(&mut self, path: &str, items: &[JsonNode]) -> Vec<WhenCondition> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.when_condition(&index(path, i), item))
            .collect()
    }

    fn when_condition(&mut self, path: &str, node: &JsonNode) -> Option<WhenCondition> {
        let fields = self.object(path, node)?;
        self.check_fields(path, fields, &["name", "arguments", "children"]);
        let name = self.required(path, fields, "name")?;
        let name = self.string(&child(path, "name"), name)?;

        let kind = if let Some(children) = field(fields, "children") {
            let path = child(path, "children");
            let items = self.array(&path, children)?;
            WhenKind::Nested(self.when_conditions(&path, items))
        } else {
            let arguments = match field(fields, "arguments") {
                Some(arguments) => self.arguments(&child(path, "arguments"), arguments)?,
                None => Arguments::none(),
            };
            if name == "expression" {
                match arguments.get(SCRIPT_BLOCK_KEY) {
                    Some(Value::Literal(Literal::String(code))) | Some(Value::Expression(code)) => {
                        WhenKind::Expression(normalize_code(code))
                    }
                    _ => {
                        self.schema(
                            &child(path, "arguments"),
                            &format!("missing required argument \"{SCRIPT_BLOCK_KEY}\""),
                        );
                        return None;
                    }
                }
            } else {
                WhenKind::Simple(arguments)
            }
        };

        Some(WhenCondition {
            position: Position::Synthetic,
            name: name.to_string(),
            kind,
        })
    }

    fn compact_when(&mut self, path: &str, fields: &[(String, JsonNode)]) -> Vec<WhenCondition> {
        let mut conditions = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            let path = child(path, name);
            let kind = if NESTED_WHEN.contains(&name.as_str()) {
                match value {
                    JsonNode::Object(children) => WhenKind::Nested(self.compact_when(&path, children)),
                    JsonNode::Array(items) => WhenKind::Nested(self.when_conditions(&path, items)),
                    other => {
                        self.mistyped(&path, "object or array", other);
                        continue;
                    }
                }
            } else if name == "expression" {
                match self.string(&path, value) {
                    Some(code) => WhenKind::Expression(normalize_code(code)),
                    None => continue,
                }
            } else {
                match self.compact_arguments(&path, value) {
                    Some(arguments) => WhenKind::Simple(arguments),
                    None => continue,
                }
            };
            conditions.push(WhenCondition {
                position: Position::Synthetic,
                name: name.clone(),
                kind,
            });
        }
        conditions
    }
}

/// Whether an object is a canonical value rather than compact named
/// arguments.
fn is_value_object(fields: &[(String, JsonNode)]) -> bool {
    field(fields, "isLiteral").is_some() || (fields.len() == 1 && field(fields, "list").is_some())
}
