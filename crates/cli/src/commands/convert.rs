//! Conversion and validation command implementation

use crate::error::CliResult;
use crate::utils::{config, input, output};
use pipeline_model::{ConversionResponse, Converter};

/// Flags shared by every conversion subcommand.
pub struct Settings {
    pub config: Option<String>,
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ToJenkinsfile,
    ToJson,
    StepsToJson,
    StepsToJenkinsfile,
    ValidateJenkinsfile,
    ValidateJson,
    PrettyPrint,
    Schema,
}

impl Operation {
    fn reads_input(self) -> bool {
        self != Operation::Schema
    }

    fn apply(self, converter: &Converter, text: &str) -> ConversionResponse {
        match self {
            Operation::ToJenkinsfile => converter.to_jenkinsfile(text),
            Operation::ToJson => converter.to_json(text),
            Operation::StepsToJson => converter.steps_to_json(text),
            Operation::StepsToJenkinsfile => converter.steps_to_jenkinsfile(text),
            Operation::ValidateJenkinsfile => converter.validate_jenkinsfile(text),
            Operation::ValidateJson => converter.validate_json(text),
            Operation::PrettyPrint => converter.pretty_print(text),
            Operation::Schema => converter.schema(),
        }
    }
}

pub struct Options {
    pub operation: Operation,
    pub file: Option<String>,
}

impl Options {
    pub fn new(operation: Operation, file: Option<String>) -> Self {
        Self { operation, file }
    }
}

/// Run one conversion and print its response envelope
pub fn run(options: &Options, settings: &Settings) -> i32 {
    match run_inner(options, settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ Conversion failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options, settings: &Settings) -> CliResult<i32> {
    let response = convert(options, settings.config.as_deref())?;
    output::print_response(&response, settings.pretty)?;
    Ok(output::exit_code(&response))
}

fn convert(options: &Options, config_path: Option<&str>) -> CliResult<ConversionResponse> {
    let config = config::load(config_path)?;
    let converter = Converter::new(&config);

    let text = if options.operation.reads_input() {
        input::read(options.file.as_deref())?
    } else {
        String::new()
    };

    tracing::debug!(operation = ?options.operation, bytes = text.len(), "running conversion");
    Ok(options.operation.apply(&converter, &text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::DirGuard;
    use pipeline_model::ConversionResult;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const SCRIPT: &str = "pipeline {\n    agent any\n    stages {\n        stage('Build') {\n            steps {\n                sh 'make'\n            }\n        }\n    }\n}\n";

    fn convert_file(operation: Operation, content: &str) -> ConversionResponse {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path()).unwrap();
        fs::write("input.txt", content).unwrap();
        convert(&Options::new(operation, Some("input.txt".to_string())), None).unwrap()
    }

    #[test]
    #[serial]
    fn test_to_json_from_file() {
        let response = convert_file(Operation::ToJson, SCRIPT);
        assert!(response.is_success(), "{:?}", response.errors);
        assert_eq!(response.json.unwrap()["pipeline"]["agent"]["type"], "any");
    }

    #[test]
    #[serial]
    fn test_pretty_print_from_file() {
        let response = convert_file(Operation::PrettyPrint, SCRIPT);
        assert_eq!(response.jenkinsfile.as_deref(), Some(SCRIPT));
    }

    #[test]
    #[serial]
    fn test_validate_json_failure_is_an_envelope() {
        let response = convert_file(Operation::ValidateJson, "{\"pipeline\": {}}");
        assert_eq!(response.result, ConversionResult::Failure);
        assert!(!response.errors.is_empty());
    }

    #[test]
    #[serial]
    fn test_config_file_applies_policies() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path()).unwrap();
        fs::write(".pipeline-model.yaml", "unknown_fields: reject\n").unwrap();
        fs::write(
            "input.json",
            r#"{"pipeline": {"agent": "any", "colour": "blue", "stages": [{"name": "A", "steps": [{"echo": "a"}]}]}}"#,
        )
        .unwrap();

        let response = convert(
            &Options::new(Operation::ValidateJson, Some("input.json".to_string())),
            None,
        )
        .unwrap();
        assert_eq!(response.errors, vec!["pipeline: unknown field \"colour\""]);
    }

    #[test]
    #[serial]
    fn test_missing_input_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path()).unwrap();
        let result = convert(&Options::new(Operation::ToJson, Some("nope.groovy".to_string())), None);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_schema_needs_no_input() {
        let response = convert(&Options::new(Operation::Schema, None), None).unwrap();
        assert!(response.is_success());
        assert!(response.json.is_some());
    }
}
