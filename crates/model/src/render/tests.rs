/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use super::*;
use crate::ast::{
    Agent, AgentArguments, AgentKind, Arguments, Literal, MethodCall, NamedArgument, Pipeline,
    Position, Post, PostCondition, Stage, Stages, Step, When, WhenCondition, WhenKind, Value,
};
use crate::collector::ErrorCollector;
use crate::config::ConverterConfig;
use crate::parser::{script_to_pipeline_def, JsonParser};

fn int(n: i64) -> Value {
    Literal::Int(n).into()
}

fn float(f: f64) -> Value {
    Literal::Float(f).into()
}

fn step(name: &str, value: Value) -> Step {
    Step::new(name, Arguments::single(value))
}

fn named(entries: Vec<(&str, Value)>) -> Arguments {
    Arguments::Named(
        entries
            .into_iter()
            .map(|(key, value)| NamedArgument::new(key, value))
            .collect(),
    )
}

fn condition(name: &str, kind: WhenKind) -> WhenCondition {
    WhenCondition {
        position: Position::Synthetic,
        name: name.to_string(),
        kind,
    }
}

fn typed_agent(agent_type: &str, arguments: AgentArguments) -> Agent {
    Agent {
        position: Position::Synthetic,
        kind: AgentKind::Typed {
            agent_type: agent_type.to_string(),
            arguments,
        },
    }
}

fn with_stages(agent: Agent, stages: Vec<Stage>) -> Pipeline {
    Pipeline {
        agent: Some(agent),
        stages: Some(Stages {
            position: Position::Synthetic,
            stages,
        }),
        ..Pipeline::default()
    }
}

fn with_steps(steps: Vec<Step>) -> Pipeline {
    with_stages(Agent::any(), vec![Stage::new("Build", steps)])
}

fn cases() -> Vec<(&'static str, Pipeline)> {
    let mut when_stage = Stage::new("Deploy", vec![Step::new("pwd", Arguments::none())]);
    when_stage.agent = Some(Agent {
        position: Position::Synthetic,
        kind: AgentKind::None,
    });
    when_stage.when = Some(When {
        position: Position::Synthetic,
        conditions: vec![
            condition("buildingTag", WhenKind::Simple(Arguments::none())),
            condition("branch", WhenKind::Simple(Arguments::single(Value::string("main")))),
            condition(
                "environment",
                WhenKind::Simple(named(vec![
                    ("name", Value::string("DEPLOY")),
                    ("value", Value::string("true")),
                ])),
            ),
            condition(
                "allOf",
                WhenKind::Nested(vec![
                    condition(
                        "not",
                        WhenKind::Nested(vec![condition(
                            "branch",
                            WhenKind::Simple(Arguments::single(Value::string("dev"))),
                        )]),
                    ),
                    condition("anyOf", WhenKind::Nested(Vec::new())),
                ]),
            ),
            condition(
                "expression",
                WhenKind::Expression("return params.RUN".to_string()),
            ),
        ],
    });

    let mut post_stage = Stage::new("It's \"quoted\"", Vec::new());
    post_stage.post = Some(Post {
        position: Position::Synthetic,
        conditions: vec![PostCondition {
            position: Position::Synthetic,
            condition: "cleanup".to_string(),
            steps: Vec::new(),
        }],
    });
    let mut post_pipeline = with_stages(Agent::any(), vec![post_stage]);
    post_pipeline.post = Some(Post {
        position: Position::Synthetic,
        conditions: vec![
            PostCondition {
                position: Position::Synthetic,
                condition: "always".to_string(),
                steps: Vec::new(),
            },
            PostCondition {
                position: Position::Synthetic,
                condition: "failure".to_string(),
                steps: vec![step("echo", Value::string("boom"))],
            },
        ],
    });

    vec![
        (
            "scalar literals",
            with_steps(vec![
                step("echo", Value::string("it's $HOME\\n")),
                step("echo", Literal::Bool(true).into()),
                step("echo", Literal::Null.into()),
                step("sleep", int(0)),
                step("sleep", float(1.5)),
                step("sleep", float(3.0)),
            ]),
        ),
        (
            "negative and large numbers",
            with_steps(vec![
                step("sleep", int(-5)),
                step("sleep", int(i64::MAX)),
                step("sleep", int(i64::MIN)),
                step("sleep", float(-0.25)),
                Step::new("retry", named(vec![("count", int(i64::MIN))])),
            ]),
        ),
        (
            "expressions",
            with_steps(vec![
                step("echo", Value::expression("env.BRANCH_NAME")),
                step("echo", Value::expression("\"v${n}\"")),
                step("echo", Value::expression("(a + b)")),
            ]),
        ),
        (
            "lists and method calls",
            with_steps(vec![
                step(
                    "echo",
                    Value::List(vec![
                        Value::string("a"),
                        int(1),
                        Value::List(vec![Literal::Bool(false).into()]),
                    ]),
                ),
                step(
                    "withCredentials",
                    Value::MethodCall(MethodCall::new(
                        "usernamePassword",
                        named(vec![("credentialsId", Value::string("ci"))]),
                    )),
                ),
                Step::new(
                    "checkout",
                    named(vec![(
                        "scm",
                        Value::MethodCall(MethodCall::new("git", Arguments::none())),
                    )]),
                ),
            ]),
        ),
        (
            "named arguments",
            with_steps(vec![
                Step::new("pwd", Arguments::none()),
                Step::new(
                    "archive",
                    named(vec![
                        ("odd-key", int(1)),
                        ("has space", Value::string("x")),
                        ("plain", Value::List(Vec::new())),
                    ]),
                ),
                Step::new(
                    "echo",
                    Arguments::Positional(vec![Value::string("a"), Value::string("b")]),
                ),
            ]),
        ),
        (
            "step bodies",
            with_steps(vec![
                Step::new("timestamps", Arguments::none()).with_children(Vec::new()),
                step("dir", Value::string("sub")).with_children(vec![
                    Step::new("retry", named(vec![("count", int(2))]))
                        .with_children(vec![step("sh", Value::string("make"))]),
                ]),
                Step::script("def x = 1\nif (x) {\n    echo \"x=${x}\"\n}"),
            ]),
        ),
        ("when conditions", with_stages(Agent::any(), vec![when_stage])),
        ("empty post branches", post_pipeline),
        (
            "single agent argument",
            with_stages(
                typed_agent(
                    "label",
                    AgentArguments::Single(Value::string("linux && amd64")),
                ),
                vec![Stage::new("Build", vec![step("echo", int(1))])],
            ),
        ),
        (
            "named agent arguments",
            with_stages(
                typed_agent(
                    "docker",
                    AgentArguments::Named(vec![
                        NamedArgument::new("image", Value::string("maven:3")),
                        NamedArgument::new("args", Value::string("-v /tmp:/tmp")),
                        NamedArgument::new("reuseNode", Literal::Bool(true).into()),
                    ]),
                ),
                vec![Stage::new("Build", vec![step("echo", int(1))])],
            ),
        ),
    ]
}

#[test]
fn test_script_round_trip_preserves_tree() {
    for (name, pipeline) in cases() {
        let script = pipeline.to_script();
        let mut errors = ErrorCollector::new();
        let parsed = script_to_pipeline_def(&script, &mut errors)
            .unwrap_or_else(|e| panic!("{name}: {e}\n{script}"));
        assert!(
            errors.diagnostics().is_empty(),
            "{name}: {:?}\n{script}",
            errors.errors_as_strings()
        );
        assert_eq!(parsed, pipeline, "{name}\n{script}");
        assert_eq!(parsed.to_script(), script, "{name}");
    }
}

#[test]
fn test_json_round_trip_preserves_tree() {
    for (name, pipeline) in cases() {
        let json = pipeline.to_json();
        let mut parser = JsonParser::new(&ConverterConfig::strict());
        let parsed = parser.parse(&json);
        assert!(
            parser.collector().diagnostics().is_empty(),
            "{name}: {:?}\n{json}",
            parser.collector().errors_as_strings()
        );
        assert_eq!(parsed.as_ref(), Some(&pipeline), "{name}\n{json}");
        assert_eq!(parsed.map(|p| p.to_json()), Some(json), "{name}");
    }
}
