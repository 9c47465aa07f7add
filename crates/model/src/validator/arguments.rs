/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::HashSet;

use crate::ast::{Arguments, Literal, Position, Value};
use crate::collector::{ErrorCollector, ErrorKind};
use crate::validator::registry::{suggest, ParamKind, Signature};

/// Check call arguments against a known signature.
///
/// `label` names the kind of call in messages ("step", "option", ...).
pub fn check_arguments(
    signature: &Signature,
    label: &str,
    arguments: &Arguments,
    position: Position,
    errors: &mut ErrorCollector,
) {
    let name = signature.name;
    let mut report = |message: String| errors.error(ErrorKind::Validation, message, position);
    let mut present = HashSet::new();

    match arguments {
        Arguments::Positional(values) => match (values.as_slice(), signature.default_parameter) {
            ([], _) => {}
            ([value], Some(default)) => {
                present.insert(default);
                if let Some(param) = signature.param(default) {
                    if let Some(found) = type_mismatch(param.kind, value) {
                        report(format!(
                            "Expecting {} for parameter \"{default}\" of {label} \"{name}\" but got {found}",
                            param.kind.name()
                        ));
                    }
                }
            }
            ([_], None) => {
                report(format!(
                    "{} \"{name}\" does not take a positional argument",
                    capitalize(label)
                ));
                return;
            }
            (values, _) => {
                report(format!(
                    "Too many positional arguments for {label} \"{name}\": expected at most 1, got {}",
                    values.len()
                ));
                return;
            }
        },
        Arguments::Named(args) => {
            for arg in args {
                let key = arg.key.as_str();
                if !present.insert(key) {
                    report(format!(
                        "Duplicate parameter \"{key}\" for {label} \"{name}\""
                    ));
                    continue;
                }
                match signature.param(key) {
                    Some(param) => {
                        if let Some(found) = type_mismatch(param.kind, &arg.value) {
                            report(format!(
                                "Expecting {} for parameter \"{key}\" of {label} \"{name}\" but got {found}",
                                param.kind.name()
                            ));
                        }
                    }
                    None => {
                        let mut message =
                            format!("Invalid parameter \"{key}\" for {label} \"{name}\"");
                        if let Some(similar) = suggest(key, signature.params.iter().map(|p| p.name))
                        {
                            message.push_str(&format!(", did you mean \"{similar}\"?"));
                        }
                        report(message);
                    }
                }
            }
        }
    }

    for param in signature.params.iter().filter(|p| p.required) {
        if !present.contains(param.name) {
            report(format!(
                "Missing required parameter \"{}\" for {label} \"{name}\"",
                param.name
            ));
        }
    }
}

/// Type name of a literal that does not fit `kind`.
fn type_mismatch(kind: ParamKind, value: &Value) -> Option<&'static str> {
    let found = match value {
        Value::Literal(Literal::Null) | Value::Expression(_) | Value::MethodCall(_) => return None,
        Value::List(_) => "list",
        Value::Literal(literal) => literal.type_name(),
    };
    let matches = match kind {
        ParamKind::Any => true,
        ParamKind::String => matches!(value, Value::Literal(Literal::String(_))),
        ParamKind::Boolean => matches!(value, Value::Literal(Literal::Bool(_))),
        ParamKind::Integer => matches!(value, Value::Literal(Literal::Int(_))),
        ParamKind::List => matches!(value, Value::List(_)),
    };
    (!matches).then_some(found)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
