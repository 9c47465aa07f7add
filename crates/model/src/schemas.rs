/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */
use jsonschema::JSONSchema;
use serde_json::{json, Value};

/// Embed the pipeline model schema at compile time
/// This keeps the library free of file I/O
const PIPELINE_SCHEMA_JSON: &str = include_str!("../../../schemas/pipeline-model.schema.v1.json");

/// Load the pipeline model schema
///
/// Returns the parsed JSON schema as a `serde_json::Value`.
/// This function never fails at runtime since the schema is embedded at compile time.
///
/// # Panics
///
/// Panics if the embedded schema JSON is invalid (this should never happen).
#[must_use]
pub fn load_schema() -> Value {
    serde_json::from_str(PIPELINE_SCHEMA_JSON)
        .expect("Failed to parse embedded pipeline schema - this should never happen")
}

/// The embedded schema text, byte for byte.
#[must_use]
pub fn schema_text() -> &'static str {
    PIPELINE_SCHEMA_JSON
}

/// Check a `{"pipeline": {...}}` document against the schema.
///
/// # Errors
///
/// Returns one message per schema violation, prefixed with the JSON pointer
/// of the offending value.
pub fn check_schema(document: &Value) -> Result<(), Vec<String>> {
    check_against(&load_schema(), document)
}

/// Check a JSON array of steps against the schema's step definition.
///
/// # Errors
///
/// Returns one message per schema violation.
pub fn check_steps_schema(steps: &Value) -> Result<(), Vec<String>> {
    let schema = load_schema();
    let steps_schema = json!({
        "$schema": schema["$schema"],
        "type": "array",
        "items": {"$ref": "#/definitions/step"},
        "definitions": schema["definitions"],
    });
    check_against(&steps_schema, steps)
}

fn check_against(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(err) => return Err(vec![format!("Failed to compile schema: {err}")]),
    };

    let result = match compiled.validate(data) {
        Ok(()) => Ok(()),
        Err(errors) => Err(errors
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect()),
    };
    result
}
