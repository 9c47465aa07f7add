/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use serde_json::json;

use super::*;
use crate::schemas::{check_schema, check_steps_schema};

const FULL: &str = r#"
@Library('shared') _

pipeline {
    agent {
        docker {
            image 'maven:3-alpine'
            args '-v /tmp:/tmp'
        }
    }
    environment {
        CC = 'clang'
        SECRET = credentials('my-secret')
        PATH_EXT = "${env.HOME}/bin"
    }
    tools {
        maven 'apache-maven-3.0.1'
    }
    options {
        buildDiscarder(logRotator(numToKeepStr: '5'))
        timeout(time: 1, unit: 'HOURS')
        timestamps()
    }
    triggers {
        cron('H */4 * * 1-5')
    }
    parameters {
        string(name: 'PERSON', defaultValue: 'Mr Jenkins', description: 'Who?')
        booleanParam(name: 'RUN', defaultValue: true)
    }
    libraries {
        lib('shared@main')
    }
    stages {
        stage('Build') {
            when {
                branch 'main'
                not { environment name: 'SKIP', value: 'true' }
                expression { return params.RUN }
            }
            steps {
                sh 'make'
                sh script: 'make test', returnStatus: true
                dir('sub') {
                    echo 'inside'
                }
                script {
                    def x = 1
                    echo "x=${x}"
                }
            }
        }
        stage('Deploy') {
            parallel {
                stage('east') { steps { echo 'e' } }
                stage('west') { steps { echo 'w' } }
            }
        }
    }
    post {
        always { echo 'done' }
        failure { mail to: 'team@example.com', subject: 'failed' }
    }
}
"#;

fn converter() -> Converter {
    Converter::default()
}

#[test]
fn test_compact_json_to_jenkinsfile() {
    let response = converter().to_jenkinsfile(
        r#"{"pipeline":{"agent":"any","stages":[{"stage":{"name":"Build","steps":[{"sh":"make"}]}}]}}"#,
    );
    assert!(response.is_success(), "{:?}", response.errors);
    assert_eq!(
        response.jenkinsfile.as_deref(),
        Some(
            "pipeline {\n    agent any\n    stages {\n        stage('Build') {\n            steps {\n                sh 'make'\n            }\n        }\n    }\n}\n"
        )
    );
    assert!(response.json.is_none());
}

#[test]
fn test_malformed_json_is_one_error() {
    let response = converter().to_jenkinsfile("{\"pipeline\": ");
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].contains("line 1"), "{}", response.errors[0]);
    assert!(response.jenkinsfile.is_none());
}

#[test]
fn test_stage_missing_steps_reports_only_that_stage() {
    let script = r#"
pipeline {
    agent any
    stages {
        stage('Build') {
            steps { sh 'make' }
        }
        stage('Test') {
        }
    }
}
"#;
    let response = converter().validate_jenkinsfile(script);
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].contains("\"Test\""));

    let mut errors = ErrorCollector::new();
    let pipeline = script_to_pipeline_def(script, &mut errors).unwrap();
    let build = &pipeline.stages.unwrap().stages[0];
    assert_eq!(
        build.to_json()["branches"][0]["steps"][0],
        json!({"name": "sh", "arguments": {"isLiteral": true, "value": "make"}})
    );
}

#[test]
fn test_single_step_object_matches_one_element_array() {
    let single = converter().steps_to_jenkinsfile(r#"{"name": "sh", "arguments": {"isLiteral": true, "value": "make"}}"#);
    let array = converter().steps_to_jenkinsfile(r#"[{"name": "sh", "arguments": {"isLiteral": true, "value": "make"}}]"#);
    assert!(single.is_success());
    assert_eq!(single, array);
    assert_eq!(single.jenkinsfile.as_deref(), Some("sh 'make'"));
}

#[test]
fn test_steps_to_jenkinsfile_joins_and_skips_non_objects() {
    let response = converter().steps_to_jenkinsfile(
        r#"[{"echo": "one"}, 42, {"name": "dir", "arguments": {"isLiteral": true, "value": "sub"}, "children": [{"name": "pwd", "arguments": []}]}]"#,
    );
    assert!(response.is_success(), "{:?}", response.errors);
    assert_eq!(
        response.jenkinsfile.as_deref(),
        Some("echo 'one'\ndir('sub') {\n    pwd()\n}")
    );
}

#[test]
fn test_most_negative_sleep_survives_both_directions() {
    let script = converter().steps_to_jenkinsfile(r#"{"sleep": -9223372036854775808}"#);
    assert!(script.is_success(), "{:?}", script.errors);
    assert_eq!(script.jenkinsfile.as_deref(), Some("sleep(-9223372036854775808)"));

    let back = converter().steps_to_json(&script.jenkinsfile.unwrap());
    assert!(back.is_success(), "{:?}", back.errors);
    assert_eq!(back.json.unwrap()[0]["arguments"]["value"], json!(i64::MIN));
}

#[test]
fn test_no_result_when_nothing_parses() {
    for input in ["[]", "[1, \"two\", null]", "\"sh\""] {
        let response = converter().steps_to_jenkinsfile(input);
        assert_eq!(response.result, ConversionResult::Failure);
        assert_eq!(response.errors, vec![NO_RESULT.to_string()]);
    }
}

#[test]
fn test_step_errors_win_over_no_result() {
    let response = converter().steps_to_jenkinsfile(r#"[{"name": "bad name"}]"#);
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(
        response.errors,
        vec!["[0].name: \"bad name\" is not a valid step name"]
    );
}

#[test]
fn test_json_errors_accumulate_across_stages() {
    let response = converter().validate_json(
        r#"{"pipeline": {
            "agent": "any",
            "stages": [
                {"name": "one", "steps": [{"echo": "a"}, {"name": "no such step!"}]},
                {"steps": [{"sh": "make"}]}
            ]
        }}"#,
    );
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 2, "{:?}", response.errors);
    assert!(response.errors[0].starts_with("pipeline.stages[0].steps[1].name"));
    assert!(response.errors[1].starts_with("pipeline.stages[1]: missing required field \"name\""));
}

#[test]
fn test_syntax_error_reports_position() {
    let response = converter().to_json("pipeline {\n    agent any\n    stages {\n");
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].contains("@ line"), "{}", response.errors[0]);
}

#[test]
fn test_structure_error_without_pipeline_block() {
    let response = converter().validate_jenkinsfile("node { sh 'make' }");
    assert_eq!(
        response.errors,
        vec!["Not a valid pipeline definition: no pipeline block found"]
    );
}

#[test]
fn test_script_json_script_round_trip() {
    let to_json = converter().to_json(FULL);
    assert!(to_json.is_success(), "{:?}", to_json.errors);
    let json = to_json.json.unwrap();
    assert_eq!(check_schema(&json), Ok(()));

    let back = converter().to_jenkinsfile(&json.to_string());
    assert!(back.is_success(), "{:?}", back.errors);
    let pretty = converter().pretty_print(FULL);
    assert_eq!(back.jenkinsfile, pretty.jenkinsfile);

    let mut errors = ErrorCollector::new();
    let original = script_to_pipeline_def(FULL, &mut errors).unwrap();
    let reparsed =
        script_to_pipeline_def(back.jenkinsfile.as_deref().unwrap(), &mut errors).unwrap();
    assert!(!errors.has_errors());
    assert_eq!(reparsed, original);
}

#[test]
fn test_pretty_print_is_stable() {
    let first = converter().pretty_print("pipeline { agent any\n stages { stage('A') { steps { echo 'a' } } } }");
    assert!(first.is_success(), "{:?}", first.errors);
    let text = first.jenkinsfile.unwrap();
    assert_eq!(
        text,
        "pipeline {\n    agent any\n    stages {\n        stage('A') {\n            steps {\n                echo 'a'\n            }\n        }\n    }\n}\n"
    );
    let second = converter().pretty_print(&text);
    assert_eq!(second.jenkinsfile.as_deref(), Some(text.as_str()));
}

#[test]
fn test_steps_to_json_conforms_to_schema() {
    let response =
        converter().steps_to_json("sh 'make'\nretry(3) {\n    git url: 'https://example.com/repo.git'\n}");
    assert!(response.is_success(), "{:?}", response.errors);
    let json = response.json.unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[1]["children"][0]["name"], "git");
    assert_eq!(check_steps_schema(&json), Ok(()));
}

#[test]
fn test_steps_to_json_validates_steps() {
    let response = converter().steps_to_json("sleep time: 'soon'");
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 1);
}

#[test]
fn test_unknown_fields_are_warnings_by_default() {
    let doc = r#"{"pipeline": {"agent": "any", "colour": "blue", "stages": [{"name": "A", "steps": [{"echo": "a"}]}]}}"#;

    let lenient = converter().validate_json(doc);
    assert!(lenient.is_success());
    assert_eq!(lenient.warnings, vec!["pipeline: unknown field \"colour\""]);

    let strict = Converter::new(&ConverterConfig::strict()).validate_json(doc);
    assert_eq!(strict.result, ConversionResult::Failure);
    assert_eq!(strict.errors, vec!["pipeline: unknown field \"colour\""]);
}

#[test]
fn test_unknown_steps_follow_policy() {
    let script = "pipeline {\n agent any\n stages {\n  stage('A') {\n   steps { slackSend channel: '#ci' }\n  }\n }\n}";
    let rejected = converter().validate_jenkinsfile(script);
    assert_eq!(rejected.errors.len(), 1);
    assert!(rejected.errors[0].starts_with("Unknown step \"slackSend\""));

    let lenient = Converter::new(&ConverterConfig::lenient()).validate_jenkinsfile(script);
    assert!(lenient.is_success(), "{:?}", lenient.errors);
}

#[test]
fn test_unknown_step_and_missing_steps_reported_together() {
    let response = converter().validate_json(
        r#"{"pipeline": {
            "agent": "any",
            "stages": [
                {"name": "A", "steps": [{"notARealStep": "x"}]},
                {"name": "B"}
            ]
        }}"#,
    );
    assert_eq!(response.result, ConversionResult::Failure);
    assert_eq!(response.errors.len(), 2, "{:?}", response.errors);
    assert!(response.errors[0].starts_with("Unknown step \"notARealStep\""));
    assert!(response.errors[1].starts_with("Nothing to execute within stage \"B\""));
}

#[test]
fn test_response_envelope_shape() {
    let failure = ConversionResponse::failure(vec![NO_RESULT.to_string()]);
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        json!({"result": "failure", "errors": ["No result."]})
    );
    assert_eq!(
        serde_json::to_value(ConversionResponse::success()).unwrap(),
        json!({"result": "success"})
    );
}

#[test]
fn test_schema_operation() {
    let response = converter().schema();
    assert!(response.is_success());
    assert_eq!(response.json.unwrap()["title"], "Declarative pipeline model");
}
