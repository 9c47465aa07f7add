/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Front ends producing the Model AST: pipeline script and JSON.
 * Both work on in-memory text only (no file I/O).
 */

pub mod json;
pub mod script;

pub use json::{JsonNode, JsonParser};
pub use script::{script_to_pipeline_def, script_to_plain_steps};
