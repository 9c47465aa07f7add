/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Request-level conversions and their response envelope.
 *
 * Each operation parses, validates, and renders only when nothing was
 * reported as an error. This is the one place where an aborting
 * `ConversionError` becomes a failure response.
 */

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::ast::{Pipeline, Position, Step};
use crate::collector::{ErrorCollector, ErrorKind};
use crate::config::ConverterConfig;
use crate::error::ConversionError;
use crate::parser::json::JsonParser;
use crate::parser::script::{script_to_pipeline_def, script_to_plain_steps};
use crate::render::{ToJson, ToScript};
use crate::schemas;
use crate::validator::Validator;

/// Message of the failure returned when a step conversion yields nothing.
pub const NO_RESULT: &str = "No result.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionResult {
    Success,
    Failure,
}

/// `{"result": "success"|"failure", "jenkinsfile"?, "json"?, "errors"?, "warnings"?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub result: ConversionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenkinsfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ConversionResponse {
    pub fn success() -> Self {
        Self {
            result: ConversionResult::Success,
            jenkinsfile: None,
            json: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            result: ConversionResult::Failure,
            errors,
            ..Self::success()
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == ConversionResult::Success
    }

    fn with_jenkinsfile(mut self, text: String) -> Self {
        self.jenkinsfile = Some(text);
        self
    }

    fn with_json(mut self, json: serde_json::Value) -> Self {
        self.json = Some(json);
        self
    }
}

/// Runs the conversion operations with one set of policies.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
    validator: Validator,
}

impl Converter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            config: *config,
            validator: Validator::new(config),
        }
    }

    /// JSON pipeline to script.
    pub fn to_jenkinsfile(&self, json_text: &str) -> ConversionResponse {
        respond("to_jenkinsfile", || {
            let (pipeline, errors) = self.read_json_pipeline(json_text)?;
            Ok(finish(&errors, |response| match pipeline {
                Some(pipeline) => response.with_jenkinsfile(pipeline_script(&pipeline)),
                None => response,
            }))
        })
    }

    /// Script pipeline to JSON.
    pub fn to_json(&self, script: &str) -> ConversionResponse {
        respond("to_json", || {
            let (pipeline, errors) = self.read_script_pipeline(script)?;
            Ok(finish(&errors, |response| response.with_json(pipeline.to_json())))
        })
    }

    /// Bare script steps to a JSON array of steps.
    pub fn steps_to_json(&self, script: &str) -> ConversionResponse {
        respond("steps_to_json", || {
            let mut errors = ErrorCollector::new();
            let steps = script_to_plain_steps(script, &mut errors)?;
            self.validate_steps(&steps, &mut errors);
            Ok(finish(&errors, |response| {
                let json = steps.iter().map(ToJson::to_json).collect();
                response.with_json(serde_json::Value::Array(json))
            }))
        })
    }

    /// A JSON step, or an array of them, to newline-joined script.
    pub fn steps_to_jenkinsfile(&self, json_text: &str) -> ConversionResponse {
        respond("steps_to_jenkinsfile", || {
            let value: serde_json::Value = serde_json::from_str(json_text)?;
            let mut parser = JsonParser::new(&self.config);
            let steps = parser.parse_steps(&value);
            let mut errors = parser.into_collector();
            self.validate_steps(&steps, &mut errors);
            if steps.is_empty() && !errors.has_errors() {
                errors.error(ErrorKind::EmptyResult, NO_RESULT, Position::Synthetic);
            }
            Ok(finish(&errors, |response| {
                let text = steps
                    .iter()
                    .map(ToScript::to_script)
                    .collect::<Vec<_>>()
                    .join("\n");
                response.with_jenkinsfile(text)
            }))
        })
    }

    pub fn validate_jenkinsfile(&self, script: &str) -> ConversionResponse {
        respond("validate_jenkinsfile", || {
            let (_, errors) = self.read_script_pipeline(script)?;
            Ok(finish(&errors, |response| response))
        })
    }

    pub fn validate_json(&self, json_text: &str) -> ConversionResponse {
        respond("validate_json", || {
            let (_, errors) = self.read_json_pipeline(json_text)?;
            Ok(finish(&errors, |response| response))
        })
    }

    /// Script to AST and back, normalising layout.
    pub fn pretty_print(&self, script: &str) -> ConversionResponse {
        respond("pretty_print", || {
            let (pipeline, errors) = self.read_script_pipeline(script)?;
            Ok(finish(&errors, |response| {
                response.with_jenkinsfile(pipeline_script(&pipeline))
            }))
        })
    }

    /// The embedded JSON schema.
    pub fn schema(&self) -> ConversionResponse {
        ConversionResponse::success().with_json(schemas::load_schema())
    }

    fn read_script_pipeline(
        &self,
        script: &str,
    ) -> Result<(Pipeline, ErrorCollector), ConversionError> {
        let mut errors = ErrorCollector::new();
        let pipeline = script_to_pipeline_def(script, &mut errors)?;
        self.validator.validate_pipeline(&pipeline, &mut errors);
        Ok((pipeline, errors))
    }

    fn read_json_pipeline(
        &self,
        json_text: &str,
    ) -> Result<(Option<Pipeline>, ErrorCollector), ConversionError> {
        let value: serde_json::Value = serde_json::from_str(json_text)?;
        let mut parser = JsonParser::new(&self.config);
        let pipeline = parser.parse(&value);
        let mut errors = parser.into_collector();
        if let Some(pipeline) = &pipeline {
            self.validator.validate_pipeline(pipeline, &mut errors);
        }
        Ok((pipeline, errors))
    }

    fn validate_steps(&self, steps: &[Step], errors: &mut ErrorCollector) {
        for step in steps {
            self.validator.validate_step(step, errors);
        }
    }
}

fn pipeline_script(pipeline: &Pipeline) -> String {
    let mut text = pipeline.to_script();
    text.push('\n');
    text
}

/// Package collected diagnostics, rendering only when there are no errors.
fn finish(
    errors: &ErrorCollector,
    render: impl FnOnce(ConversionResponse) -> ConversionResponse,
) -> ConversionResponse {
    let mut response = if errors.has_errors() {
        ConversionResponse::failure(errors.errors_as_strings())
    } else {
        render(ConversionResponse::success())
    };
    response.warnings = errors.warnings_as_strings();
    response
}

fn respond(
    operation: &str,
    run: impl FnOnce() -> Result<ConversionResponse, ConversionError>,
) -> ConversionResponse {
    tracing::debug!(operation, "conversion started");
    let response = run().unwrap_or_else(|err| {
        tracing::debug!(operation, error = %err, "conversion aborted");
        ConversionResponse::failure(err.messages())
    });
    tracing::debug!(
        operation,
        success = response.is_success(),
        errors = response.errors.len(),
        warnings = response.warnings.len(),
        "conversion finished"
    );
    response
}
