/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Canonical JSON rendering of the Model AST.
 */

use serde_json::{json, Map, Number, Value as Json};

use crate::ast::step::{SCRIPT_BLOCK_KEY, SCRIPT_STEP};
use crate::ast::{
    Agent, AgentArguments, AgentKind, Arguments, CallList, KeyValueList, Libraries, Literal,
    MethodCall, NamedArgument, Pipeline, Post, PostCondition, Stage, Stages, Step, StepBody,
    Value, When, WhenCondition, WhenKind,
};
use crate::render::ToJson;

/// Branch name wrapping stage and post steps.
const DEFAULT_BRANCH: &str = "default";

fn literal(literal: &Literal) -> Json {
    match literal {
        Literal::String(s) => Json::String(s.clone()),
        Literal::Bool(b) => Json::Bool(*b),
        Literal::Int(n) => Json::Number((*n).into()),
        // Non-finite floats have no JSON form
        Literal::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Literal::Null => Json::Null,
    }
}

impl ToJson for Value {
    fn to_json(&self) -> Json {
        match self {
            Value::Literal(l) => json!({"isLiteral": true, "value": literal(l)}),
            Value::Expression(code) => json!({"isLiteral": false, "value": code}),
            Value::List(items) => json!({"list": items.iter().map(ToJson::to_json).collect::<Vec<_>>()}),
            Value::MethodCall(call) => call.to_json(),
        }
    }
}

impl ToJson for NamedArgument {
    fn to_json(&self) -> Json {
        json!({"key": self.key, "value": self.value.to_json()})
    }
}

impl ToJson for Arguments {
    fn to_json(&self) -> Json {
        match self {
            Arguments::Positional(values) => match values.as_slice() {
                [single] => single.to_json(),
                values => Json::Array(values.iter().map(ToJson::to_json).collect()),
            },
            Arguments::Named(args) => Json::Array(args.iter().map(ToJson::to_json).collect()),
        }
    }
}

impl ToJson for MethodCall {
    fn to_json(&self) -> Json {
        json!({"name": self.name, "arguments": self.arguments.to_json()})
    }
}

fn script_block(code: &str) -> Json {
    json!([{"key": SCRIPT_BLOCK_KEY, "value": {"isLiteral": true, "value": code}}])
}

impl ToJson for Step {
    fn to_json(&self) -> Json {
        match &self.body {
            StepBody::Script(code) => json!({"name": SCRIPT_STEP, "arguments": script_block(code)}),
            StepBody::None => json!({"name": self.name, "arguments": self.arguments.to_json()}),
            StepBody::Children(children) => json!({
                "name": self.name,
                "arguments": self.arguments.to_json(),
                "children": steps(children),
            }),
        }
    }
}

fn steps(steps: &[Step]) -> Json {
    Json::Array(steps.iter().map(ToJson::to_json).collect())
}

fn branch(steps_list: &[Step]) -> Json {
    json!({"name": DEFAULT_BRANCH, "steps": steps(steps_list)})
}

impl ToJson for Agent {
    fn to_json(&self) -> Json {
        match &self.kind {
            AgentKind::Any => json!({"type": "any"}),
            AgentKind::None => json!({"type": "none"}),
            AgentKind::Typed {
                agent_type,
                arguments: AgentArguments::Single(value),
            } => json!({"type": agent_type, "argument": value.to_json()}),
            AgentKind::Typed {
                agent_type,
                arguments: AgentArguments::Named(args),
            } => json!({
                "type": agent_type,
                "arguments": args.iter().map(ToJson::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

impl ToJson for KeyValueList {
    fn to_json(&self) -> Json {
        Json::Array(self.entries.iter().map(ToJson::to_json).collect())
    }
}

/// `{"<section>": [calls]}` for options, triggers and parameters.
fn call_list(section: &str, calls: &CallList) -> Json {
    let entries = calls.entries.iter().map(ToJson::to_json).collect();
    let mut object = Map::new();
    object.insert(section.to_string(), Json::Array(entries));
    Json::Object(object)
}

impl ToJson for Libraries {
    fn to_json(&self) -> Json {
        json!({"libraries": self.libraries.iter().map(ToJson::to_json).collect::<Vec<_>>()})
    }
}

impl ToJson for PostCondition {
    fn to_json(&self) -> Json {
        json!({"condition": self.condition, "branch": branch(&self.steps)})
    }
}

impl ToJson for Post {
    fn to_json(&self) -> Json {
        json!({"conditions": self.conditions.iter().map(ToJson::to_json).collect::<Vec<_>>()})
    }
}

impl ToJson for WhenCondition {
    fn to_json(&self) -> Json {
        match &self.kind {
            WhenKind::Simple(arguments) => {
                json!({"name": self.name, "arguments": arguments.to_json()})
            }
            WhenKind::Nested(children) => json!({
                "name": self.name,
                "children": children.iter().map(ToJson::to_json).collect::<Vec<_>>(),
            }),
            WhenKind::Expression(code) => {
                json!({"name": self.name, "arguments": script_block(code)})
            }
        }
    }
}

impl ToJson for When {
    fn to_json(&self) -> Json {
        json!({"conditions": self.conditions.iter().map(ToJson::to_json).collect::<Vec<_>>()})
    }
}

impl ToJson for Stage {
    fn to_json(&self) -> Json {
        let mut object = Map::new();
        object.insert("name".to_string(), Json::String(self.name.clone()));
        if let Some(steps) = &self.steps {
            object.insert("branches".to_string(), json!([branch(&steps.steps)]));
        }
        if let Some(parallel) = &self.parallel {
            object.insert(
                "parallel".to_string(),
                Json::Array(parallel.iter().map(ToJson::to_json).collect()),
            );
        }
        if let Some(agent) = &self.agent {
            object.insert("agent".to_string(), agent.to_json());
        }
        if let Some(environment) = &self.environment {
            object.insert("environment".to_string(), environment.to_json());
        }
        if let Some(tools) = &self.tools {
            object.insert("tools".to_string(), tools.to_json());
        }
        if let Some(when) = &self.when {
            object.insert("when".to_string(), when.to_json());
        }
        if let Some(post) = &self.post {
            object.insert("post".to_string(), post.to_json());
        }
        Json::Object(object)
    }
}

impl ToJson for Stages {
    fn to_json(&self) -> Json {
        Json::Array(self.stages.iter().map(ToJson::to_json).collect())
    }
}

impl ToJson for Pipeline {
    /// The complete `{"pipeline": {...}}` document.
    fn to_json(&self) -> Json {
        let mut object = Map::new();
        if let Some(agent) = &self.agent {
            object.insert("agent".to_string(), agent.to_json());
        }
        if let Some(environment) = &self.environment {
            object.insert("environment".to_string(), environment.to_json());
        }
        if let Some(tools) = &self.tools {
            object.insert("tools".to_string(), tools.to_json());
        }
        if let Some(options) = &self.options {
            object.insert("options".to_string(), call_list("options", options));
        }
        if let Some(parameters) = &self.parameters {
            object.insert("parameters".to_string(), call_list("parameters", parameters));
        }
        if let Some(triggers) = &self.triggers {
            object.insert("triggers".to_string(), call_list("triggers", triggers));
        }
        if let Some(libraries) = &self.libraries {
            object.insert("libraries".to_string(), libraries.to_json());
        }
        if let Some(stages) = &self.stages {
            object.insert("stages".to_string(), stages.to_json());
        }
        if let Some(post) = &self.post {
            object.insert("post".to_string(), post.to_json());
        }
        json!({"pipeline": object})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Position;
    use crate::config::ConverterConfig;
    use crate::parser::json::JsonParser;

    #[test]
    fn test_value_forms() {
        assert_eq!(
            Value::string("make").to_json(),
            json!({"isLiteral": true, "value": "make"})
        );
        assert_eq!(
            Value::expression("env.HOME").to_json(),
            json!({"isLiteral": false, "value": "env.HOME"})
        );
        assert_eq!(
            Value::List(vec![Literal::Int(1).into()]).to_json(),
            json!({"list": [{"isLiteral": true, "value": 1}]})
        );
        assert_eq!(
            Value::Literal(Literal::Float(f64::NAN)).to_json(),
            json!({"isLiteral": true, "value": null})
        );
    }

    #[test]
    fn test_argument_forms() {
        assert_eq!(Arguments::none().to_json(), json!([]));
        assert_eq!(
            Arguments::single(Value::string("x")).to_json(),
            json!({"isLiteral": true, "value": "x"})
        );
        assert_eq!(
            Arguments::Positional(vec![Value::string("a"), Value::string("b")]).to_json(),
            json!([
                {"isLiteral": true, "value": "a"},
                {"isLiteral": true, "value": "b"}
            ])
        );
        assert_eq!(
            Arguments::Named(vec![NamedArgument::new("time", Literal::Int(5).into())]).to_json(),
            json!([{"key": "time", "value": {"isLiteral": true, "value": 5}}])
        );
    }

    #[test]
    fn test_script_step_uses_script_block() {
        assert_eq!(
            Step::script("echo 'hi'").to_json(),
            json!({
                "name": "script",
                "arguments": [{"key": "scriptBlock", "value": {"isLiteral": true, "value": "echo 'hi'"}}]
            })
        );
    }

    #[test]
    fn test_stage_shape_and_key_order() {
        let mut stage = Stage::new("Build", vec![Step::new("pwd", Arguments::none())]);
        stage.agent = Some(Agent::any());
        let rendered = serde_json::to_string(&stage.to_json()).unwrap();
        assert_eq!(
            rendered,
            r#"{"name":"Build","branches":[{"name":"default","steps":[{"name":"pwd","arguments":[]}]}],"agent":{"type":"any"}}"#
        );
    }

    #[test]
    fn test_pipeline_round_trip() {
        let mut stage = Stage::new(
            "Test",
            vec![Step::new("dir", Arguments::single(Value::string("sub")))
                .with_children(vec![Step::script("make test")])],
        );
        stage.when = Some(When {
            position: Position::Synthetic,
            conditions: vec![WhenCondition {
                position: Position::Synthetic,
                name: "anyOf".to_string(),
                kind: WhenKind::Nested(vec![
                    WhenCondition {
                        position: Position::Synthetic,
                        name: "branch".to_string(),
                        kind: WhenKind::Simple(Arguments::single(Value::string("main"))),
                    },
                    WhenCondition {
                        position: Position::Synthetic,
                        name: "expression".to_string(),
                        kind: WhenKind::Expression("return true".to_string()),
                    },
                ]),
            }],
        });
        let pipeline = Pipeline {
            agent: Some(Agent {
                position: Position::Synthetic,
                kind: AgentKind::Typed {
                    agent_type: "docker".to_string(),
                    arguments: AgentArguments::Single(Value::string("maven")),
                },
            }),
            parameters: Some(CallList {
                position: Position::Synthetic,
                entries: vec![MethodCall::new(
                    "booleanParam",
                    Arguments::Named(vec![
                        NamedArgument::new("name", Value::string("FLAG")),
                        NamedArgument::new("defaultValue", Literal::Bool(false).into()),
                    ]),
                )],
            }),
            stages: Some(Stages {
                position: Position::Synthetic,
                stages: vec![stage],
            }),
            post: Some(Post {
                position: Position::Synthetic,
                conditions: vec![PostCondition {
                    position: Position::Synthetic,
                    condition: "failure".to_string(),
                    steps: vec![Step::new("echo", Arguments::single(Value::string("boom")))],
                }],
            }),
            ..Pipeline::default()
        };

        let json = pipeline.to_json();
        assert_eq!(json["pipeline"]["agent"]["argument"]["value"], "maven");
        assert_eq!(
            json["pipeline"]["parameters"]["parameters"][0]["name"],
            "booleanParam"
        );

        let mut parser = JsonParser::new(&ConverterConfig::strict());
        let reparsed = parser.parse(&json).unwrap();
        assert!(
            parser.collector().diagnostics().is_empty(),
            "{:?}",
            parser.collector().errors_as_strings()
        );
        assert_eq!(reparsed, pipeline);
        assert_eq!(reparsed.to_json(), json);
    }
}
