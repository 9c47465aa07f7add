//! Integration tests for error handling

mod integration_test_helpers;

use integration_test_helpers::*;

#[test]
fn test_failure_envelope_exits_one() {
    let project = TestProject::with_file(
        "Jenkinsfile",
        "pipeline {\n    agent any\n    stages {\n        stage('Test') {\n        }\n    }\n}\n",
    );

    let output = project.run_command_failure(&["validate", "--file", "Jenkinsfile"]);
    assert_eq!(output.status.code(), Some(1));
    let response = envelope(&output);
    assert_eq!(response["result"], "failure");
    assert!(response["errors"][0].as_str().unwrap().contains("\"Test\""));
}

#[test]
fn test_malformed_json() {
    let project = TestProject::with_file("pipeline.json", "{\"pipeline\": ");

    let output = project.run_command_failure(&["to-jenkinsfile", "--file", "pipeline.json"]);
    let response = envelope(&output);
    assert_eq!(response["errors"].as_array().map(Vec::len), Some(1));
    assert!(response.get("jenkinsfile").is_none());
}

#[test]
fn test_syntax_error() {
    let project = TestProject::with_file("Jenkinsfile", "pipeline {\n    agent any\n");

    let output = project.run_command_failure(&["to-json", "--file", "Jenkinsfile"]);
    let response = envelope(&output);
    assert!(response["errors"][0].as_str().unwrap().contains("@ line"));
}

#[test]
fn test_no_result_for_empty_steps() {
    let project = TestProject::new();

    let output = project.run_with_stdin(&["steps-to-jenkinsfile"], "[]");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        envelope(&output),
        serde_json::json!({"result": "failure", "errors": ["No result."]})
    );
}

#[test]
fn test_missing_input_file() {
    let project = TestProject::new();

    let output = project.run_command_failure(&["to-json", "--file", "missing.groovy"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read missing.groovy"));
}

#[test]
fn test_invalid_config_file() {
    let project = TestProject::with_file("Jenkinsfile", &simple_pipeline("Build", "make"));
    project.write_file(".pipeline-model.yaml", "unknown_fields: sometimes\n");

    let output = project.run_command_failure(&["validate", "--file", "Jenkinsfile"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config file"));
}

#[test]
fn test_unsupported_completion_shell() {
    let project = TestProject::new();
    let output = project.run_command_failure(&["completion", "tcsh"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported shell"));
}
