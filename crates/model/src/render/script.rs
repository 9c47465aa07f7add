/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Pretty-printer from the Model AST to pipeline script.
 *
 * Output uses four-space indentation and one directive per line. Everything
 * it writes is read back by the script parser into an equal tree.
 */

use std::fmt::Write as _;

use crate::ast::{
    is_identifier, Agent, AgentArguments, AgentKind, Arguments, CallList, KeyValueList,
    Libraries, Literal, Pipeline, Post, Stage, Stages, Step, StepBody, Steps, Value, When,
    WhenCondition, WhenKind,
};
use crate::render::ToScript;

const INDENT: &str = "    ";

/// Line-oriented output buffer tracking block depth.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    out: String,
    depth: usize,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth. Empty lines carry no indentation.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Write `header {` and indent what follows.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// `header { ... }` with `body` written between the braces.
    pub fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.open(header);
        body(self);
        self.close();
    }

    /// Raw script code, re-indented to the current depth.
    pub fn code(&mut self, code: &str) {
        for line in code.lines() {
            self.line(line);
        }
    }

    /// The rendered text without its trailing newline.
    pub fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

/// Single-quoted string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn literal(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => quote(s),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(n) => n.to_string(),
        // Debug keeps the fraction on whole numbers (`1.0`)
        Literal::Float(f) => format!("{f:?}"),
        Literal::Null => "null".to_string(),
    }
}

/// Inline script text of a value.
pub fn value(value: &Value) -> String {
    match value {
        Value::Literal(l) => literal(l),
        Value::Expression(code) => code.clone(),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(self::value).collect::<Vec<_>>().join(", ")
        ),
        Value::MethodCall(call) => format!("{}({})", call.name, arguments(&call.arguments)),
    }
}

/// Argument list without the surrounding parentheses.
fn arguments(arguments: &Arguments) -> String {
    match arguments {
        Arguments::Positional(values) => values.iter().map(value).collect::<Vec<_>>().join(", "),
        Arguments::Named(args) => args
            .iter()
            .map(|a| format!("{}: {}", key(&a.key), value(&a.value)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Whether `name <value>` reads back as a command call with that value.
fn commandable(value: &Value) -> bool {
    let code = match value {
        Value::Literal(Literal::Int(n)) => return *n >= 0,
        Value::Literal(Literal::Float(f)) => return f.is_sign_positive(),
        Value::Literal(_) => return true,
        Value::List(_) | Value::MethodCall(_) => return false,
        Value::Expression(code) => code,
    };
    code.starts_with(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '\'' | '"'))
}

fn call_with_value(name: &str, v: &Value) -> String {
    if commandable(v) {
        format!("{name} {}", value(v))
    } else {
        format!("{name}({})", value(v))
    }
}

/// `name value` for a lone positional value, `name(args)` otherwise.
fn call(name: &str, args: &Arguments) -> String {
    match args {
        Arguments::Positional(values) if values.len() == 1 => call_with_value(name, &values[0]),
        _ => format!("{name}({})", arguments(args)),
    }
}

impl ToScript for Step {
    fn write_script(&self, w: &mut ScriptWriter) {
        match &self.body {
            StepBody::None => w.line(&call(&self.name, &self.arguments)),
            StepBody::Children(children) => {
                let header = if self.arguments.is_empty() {
                    self.name.clone()
                } else {
                    format!("{}({})", self.name, arguments(&self.arguments))
                };
                w.block(&header, |w| {
                    for child in children {
                        child.write_script(w);
                    }
                });
            }
            StepBody::Script(code) => w.block(&self.name, |w| w.code(code)),
        }
    }
}

impl ToScript for Steps {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("steps", |w| {
            for step in &self.steps {
                step.write_script(w);
            }
        });
    }
}

impl ToScript for Agent {
    fn write_script(&self, w: &mut ScriptWriter) {
        match &self.kind {
            AgentKind::Any => w.line("agent any"),
            AgentKind::None => w.line("agent none"),
            AgentKind::Typed {
                agent_type,
                arguments: AgentArguments::Single(v),
            } => w.block("agent", |w| w.line(&call_with_value(agent_type, v))),
            AgentKind::Typed {
                agent_type,
                arguments: AgentArguments::Named(args),
            } => w.block("agent", |w| {
                w.block(agent_type, |w| {
                    for arg in args {
                        w.line(&call_with_value(&arg.key, &arg.value));
                    }
                });
            }),
        }
    }
}

fn environment(w: &mut ScriptWriter, environment: &KeyValueList) {
    w.block("environment", |w| {
        for entry in &environment.entries {
            w.line(&format!("{} = {}", entry.key, value(&entry.value)));
        }
    });
}

fn tools(w: &mut ScriptWriter, tools: &KeyValueList) {
    w.block("tools", |w| {
        for entry in &tools.entries {
            w.line(&call_with_value(&entry.key, &entry.value));
        }
    });
}

/// `options`, `triggers` and `parameters`. Entries always keep their
/// parentheses.
fn call_list(w: &mut ScriptWriter, section: &str, calls: &CallList) {
    w.block(section, |w| {
        for entry in &calls.entries {
            w.line(&format!("{}({})", entry.name, arguments(&entry.arguments)));
        }
    });
}

impl ToScript for Libraries {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("libraries", |w| {
            for library in &self.libraries {
                w.line(&format!("lib({})", value(library)));
            }
        });
    }
}

impl ToScript for Post {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("post", |w| {
            for condition in &self.conditions {
                w.block(&condition.condition, |w| {
                    for step in &condition.steps {
                        step.write_script(w);
                    }
                });
            }
        });
    }
}

impl ToScript for WhenCondition {
    fn write_script(&self, w: &mut ScriptWriter) {
        match &self.kind {
            WhenKind::Simple(args) => w.line(&call(&self.name, args)),
            WhenKind::Nested(children) => w.block(&self.name, |w| {
                for child in children {
                    child.write_script(w);
                }
            }),
            WhenKind::Expression(code) => w.block(&self.name, |w| w.code(code)),
        }
    }
}

impl ToScript for When {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("when", |w| {
            for condition in &self.conditions {
                condition.write_script(w);
            }
        });
    }
}

impl ToScript for Stage {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block(&format!("stage({})", quote(&self.name)), |w| {
            if let Some(agent) = &self.agent {
                agent.write_script(w);
            }
            if let Some(env) = &self.environment {
                environment(w, env);
            }
            if let Some(list) = &self.tools {
                tools(w, list);
            }
            if let Some(when) = &self.when {
                when.write_script(w);
            }
            if let Some(steps) = &self.steps {
                steps.write_script(w);
            }
            if let Some(parallel) = &self.parallel {
                w.block("parallel", |w| {
                    for stage in parallel {
                        stage.write_script(w);
                    }
                });
            }
            if let Some(post) = &self.post {
                post.write_script(w);
            }
        });
    }
}

impl ToScript for Stages {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("stages", |w| {
            for stage in &self.stages {
                stage.write_script(w);
            }
        });
    }
}

impl ToScript for Pipeline {
    fn write_script(&self, w: &mut ScriptWriter) {
        w.block("pipeline", |w| {
            if let Some(agent) = &self.agent {
                agent.write_script(w);
            }
            if let Some(env) = &self.environment {
                environment(w, env);
            }
            if let Some(list) = &self.tools {
                tools(w, list);
            }
            if let Some(options) = &self.options {
                call_list(w, "options", options);
            }
            if let Some(parameters) = &self.parameters {
                call_list(w, "parameters", parameters);
            }
            if let Some(triggers) = &self.triggers {
                call_list(w, "triggers", triggers);
            }
            if let Some(libraries) = &self.libraries {
                libraries.write_script(w);
            }
            if let Some(stages) = &self.stages {
                stages.write_script(w);
            }
            if let Some(post) = &self.post {
                post.write_script(w);
            }
        });
    }
}
