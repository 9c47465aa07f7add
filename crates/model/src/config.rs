/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Converter policies. Loaded from YAML by the CLI; the library itself only
 * consumes the deserialized value.
 */

use serde::{Deserialize, Serialize};

/// What the JSON parser does with fields it does not recognise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Record a warning and keep going.
    #[default]
    Warn,
    /// Record an error.
    Reject,
    Ignore,
}

/// What the validator does with steps missing from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStepPolicy {
    /// Pass unknown steps through untyped, for plugin steps outside the
    /// registry.
    Allow,
    /// Report each unknown step as an error.
    #[default]
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConverterConfig {
    pub unknown_fields: UnknownFieldPolicy,
    pub unknown_steps: UnknownStepPolicy,
}

impl ConverterConfig {
    /// Reject unknown JSON fields and unknown steps.
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
            unknown_steps: UnknownStepPolicy::Reject,
        }
    }

    /// Warn on unknown JSON fields and pass unknown steps through.
    pub fn lenient() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Warn,
            unknown_steps: UnknownStepPolicy::Allow,
        }
    }
}
