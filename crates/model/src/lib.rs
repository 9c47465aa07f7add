//! Pipeline Model Library
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! This library converts declarative pipeline definitions between script source,
//! a typed Model AST and JSON, and validates them along the way.
//! It works only with in-memory data (no file I/O).
//!
//! # Example
//!
//! ```rust
//! use pipeline_model::to_jenkinsfile;
//!
//! let json = r#"{"pipeline": {"agent": "any", "stages": [
//!     {"name": "Build", "steps": [{"sh": "make"}]}
//! ]}}"#;
//!
//! let response = to_jenkinsfile(json);
//! assert!(response.is_success());
//! assert!(response.jenkinsfile.unwrap().contains("sh 'make'"));
//! ```

pub mod ast;
pub mod collector;
pub mod config;
pub mod convert;
pub mod error;
pub mod parser;
pub mod render;
pub mod schemas;
pub mod syntax;
pub mod validator;

// Re-export the types most callers need
pub use ast::{Pipeline, Position, Step};
pub use collector::{Diagnostic, ErrorCollector, ErrorKind, Severity};
pub use config::{ConverterConfig, UnknownFieldPolicy, UnknownStepPolicy};
pub use convert::{ConversionResponse, ConversionResult, Converter};
pub use error::ConversionError;
pub use parser::{script_to_pipeline_def, script_to_plain_steps, JsonParser};
pub use render::{ToJson, ToScript};
pub use validator::Validator;

/// Convert a JSON pipeline document to script, using default policies.
pub fn to_jenkinsfile(json_text: &str) -> ConversionResponse {
    Converter::default().to_jenkinsfile(json_text)
}

/// Convert a pipeline script to its JSON document, using default policies.
pub fn to_json(script: &str) -> ConversionResponse {
    Converter::default().to_json(script)
}

/// Convert bare script steps to a JSON array.
pub fn steps_to_json(script: &str) -> ConversionResponse {
    Converter::default().steps_to_json(script)
}

/// Convert a JSON step, or an array of steps, to script.
pub fn steps_to_jenkinsfile(json_text: &str) -> ConversionResponse {
    Converter::default().steps_to_jenkinsfile(json_text)
}

pub fn validate_jenkinsfile(script: &str) -> ConversionResponse {
    Converter::default().validate_jenkinsfile(script)
}

pub fn validate_json(json_text: &str) -> ConversionResponse {
    Converter::default().validate_json(json_text)
}

/// Re-render a pipeline script in canonical layout.
pub fn pretty_print(script: &str) -> ConversionResponse {
    Converter::default().pretty_print(script)
}
