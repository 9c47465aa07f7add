//! Test helpers for integration tests

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

// Set by Cargo for integration tests of a package with this binary target
const BINARY_NAME: &str = env!("CARGO_BIN_EXE_pipeline-model");

/// A scratch directory to run the binary in
pub struct TestProject {
    #[allow(dead_code)] // Used to keep temp directory alive during tests
    pub temp_dir: TempDir,
    pub project_path: PathBuf,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let project_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            project_path,
        }
    }

    /// Create a test project holding one input file
    #[allow(dead_code)] // Used across multiple test files
    pub fn with_file(relative_path: &str, content: &str) -> Self {
        let project = Self::new();
        project.write_file(relative_path, content);
        project
    }

    #[allow(dead_code)] // Used across multiple test files
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let path = self.project_path.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Run pipeline-model with no standard input
    pub fn run_command(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(BINARY_NAME);
        cmd.current_dir(&self.project_path);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.output().unwrap()
    }

    /// Run pipeline-model feeding `input` on standard input
    #[allow(dead_code)] // Used across multiple test files
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = Command::new(BINARY_NAME)
            .current_dir(&self.project_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }

    /// Run pipeline-model, assert success, and return the parsed envelope
    #[allow(dead_code)] // Used across multiple test files
    pub fn run_command_success(&self, args: &[&str]) -> serde_json::Value {
        let output = self.run_command(args);
        if !output.status.success() {
            eprintln!("Command failed: pipeline-model {}", args.join(" "));
            eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
            eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
            panic!("Command failed with exit code: {:?}", output.status.code());
        }
        envelope(&output)
    }

    /// Run pipeline-model and assert failure
    #[allow(dead_code)] // Used across multiple test files
    pub fn run_command_failure(&self, args: &[&str]) -> Output {
        let output = self.run_command(args);
        assert!(!output.status.success(), "Command should have failed");
        output
    }
}

/// Parse the response envelope printed on stdout
#[allow(dead_code)] // Used across multiple test files
pub fn envelope(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A minimal valid pipeline script
#[allow(dead_code)] // Used across multiple test files
pub fn simple_pipeline(stage: &str, command: &str) -> String {
    format!(
        "pipeline {{\n    agent any\n    stages {{\n        stage('{stage}') {{\n            steps {{\n                sh '{command}'\n            }}\n        }}\n    }}\n}}\n"
    )
}
