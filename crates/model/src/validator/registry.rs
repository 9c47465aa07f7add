/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Static signatures of known steps, options, triggers, parameters and when
 * conditions.
 */

/// Accepted literal type of a parameter. Non-literal values (expressions,
/// nested calls) are never type-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
    Integer,
    List,
    Any,
}

impl ParamKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::List => "list",
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

const fn req(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: true,
    }
}

const fn opt(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub name: &'static str,
    pub params: &'static [Param],
    /// Parameter a lone positional value binds to (`sh 'make'`).
    pub default_parameter: Option<&'static str>,
    pub takes_body: bool,
}

impl Signature {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

const fn sig(
    name: &'static str,
    params: &'static [Param],
    default_parameter: Option<&'static str>,
    takes_body: bool,
) -> Signature {
    Signature {
        name,
        params,
        default_parameter,
        takes_body,
    }
}

use ParamKind::{Any, Boolean, Integer, List, String as Str};

const SHELL: &[Param] = &[
    req("script", Str),
    opt("returnStdout", Boolean),
    opt("returnStatus", Boolean),
    opt("encoding", Str),
    opt("label", Str),
];

pub const STEPS: &[Signature] = &[
    sig("sh", SHELL, Some("script"), false),
    sig("bat", SHELL, Some("script"), false),
    sig("powershell", SHELL, Some("script"), false),
    sig("pwsh", SHELL, Some("script"), false),
    sig("echo", &[req("message", Str)], Some("message"), false),
    sig("error", &[req("message", Str)], Some("message"), false),
    sig("unstable", &[req("message", Str)], Some("message"), false),
    sig(
        "checkout",
        &[req("scm", Any), opt("changelog", Boolean), opt("poll", Boolean)],
        Some("scm"),
        false,
    ),
    sig(
        "git",
        &[
            req("url", Str),
            opt("branch", Str),
            opt("credentialsId", Str),
            opt("changelog", Boolean),
            opt("poll", Boolean),
        ],
        Some("url"),
        false,
    ),
    sig("dir", &[req("path", Str)], Some("path"), true),
    sig("ws", &[req("dir", Str)], Some("dir"), true),
    sig("node", &[opt("label", Str)], Some("label"), true),
    sig(
        "timeout",
        &[req("time", Integer), opt("unit", Str), opt("activity", Boolean)],
        Some("time"),
        true,
    ),
    sig("retry", &[req("count", Integer)], Some("count"), true),
    sig("sleep", &[req("time", Integer), opt("unit", Str)], Some("time"), false),
    sig("withEnv", &[req("overrides", List)], Some("overrides"), true),
    sig("withCredentials", &[req("bindings", List)], Some("bindings"), true),
    sig(
        "catchError",
        &[opt("buildResult", Str), opt("stageResult", Str), opt("message", Str)],
        None,
        true,
    ),
    sig(
        "waitUntil",
        &[opt("initialRecurrencePeriod", Integer), opt("quiet", Boolean)],
        None,
        true,
    ),
    sig(
        "lock",
        &[
            opt("resource", Str),
            opt("label", Str),
            opt("quantity", Integer),
            opt("inversePrecedence", Boolean),
        ],
        Some("resource"),
        true,
    ),
    sig(
        "stash",
        &[
            req("name", Str),
            opt("includes", Str),
            opt("excludes", Str),
            opt("allowEmpty", Boolean),
            opt("useDefaultExcludes", Boolean),
        ],
        Some("name"),
        false,
    ),
    sig("unstash", &[req("name", Str)], Some("name"), false),
    sig(
        "archiveArtifacts",
        &[
            req("artifacts", Str),
            opt("allowEmptyArchive", Boolean),
            opt("excludes", Str),
            opt("fingerprint", Boolean),
            opt("onlyIfSuccessful", Boolean),
        ],
        Some("artifacts"),
        false,
    ),
    sig(
        "junit",
        &[
            req("testResults", Str),
            opt("allowEmptyResults", Boolean),
            opt("keepLongStdio", Boolean),
        ],
        Some("testResults"),
        false,
    ),
    sig(
        "input",
        &[
            req("message", Str),
            opt("id", Str),
            opt("ok", Str),
            opt("submitter", Str),
            opt("parameters", List),
        ],
        Some("message"),
        false,
    ),
    sig(
        "mail",
        &[
            req("to", Str),
            req("subject", Str),
            opt("body", Str),
            opt("cc", Str),
            opt("bcc", Str),
            opt("from", Str),
            opt("replyTo", Str),
            opt("mimeType", Str),
            opt("charset", Str),
        ],
        None,
        false,
    ),
    sig(
        "build",
        &[
            req("job", Str),
            opt("parameters", List),
            opt("propagate", Boolean),
            opt("wait", Boolean),
            opt("quietPeriod", Integer),
        ],
        Some("job"),
        false,
    ),
    sig("milestone", &[opt("ordinal", Integer), opt("label", Str)], Some("ordinal"), false),
    sig("readFile", &[req("file", Str), opt("encoding", Str)], Some("file"), false),
    sig(
        "writeFile",
        &[req("file", Str), req("text", Str), opt("encoding", Str)],
        None,
        false,
    ),
    sig("fileExists", &[req("file", Str)], Some("file"), false),
    sig("tool", &[req("name", Str), opt("type", Str)], Some("name"), false),
    sig("deleteDir", &[], None, false),
    sig("pwd", &[opt("tmp", Boolean)], None, false),
    sig("isUnix", &[], None, false),
    sig(
        "cleanWs",
        &[
            opt("deleteDirs", Boolean),
            opt("disableDeferredWipeout", Boolean),
            opt("notFailBuild", Boolean),
            opt("patterns", List),
        ],
        None,
        false,
    ),
    sig("properties", &[req("properties", List)], Some("properties"), false),
    sig("script", &[], None, true),
];

pub const OPTIONS: &[Signature] = &[
    sig("buildDiscarder", &[req("strategy", Any)], Some("strategy"), false),
    sig("checkoutToSubdirectory", &[req("path", Str)], Some("path"), false),
    sig("disableConcurrentBuilds", &[opt("abortPrevious", Boolean)], None, false),
    sig("disableResume", &[], None, false),
    sig("newContainerPerStage", &[], None, false),
    sig("overrideIndexTriggers", &[req("value", Boolean)], Some("value"), false),
    sig("parallelsAlwaysFailFast", &[], None, false),
    sig("preserveStashes", &[opt("buildCount", Integer)], None, false),
    sig("quietPeriod", &[req("quietPeriod", Integer)], Some("quietPeriod"), false),
    sig("retry", &[req("count", Integer)], Some("count"), false),
    sig("skipDefaultCheckout", &[opt("value", Boolean)], Some("value"), false),
    sig("skipStagesAfterUnstable", &[], None, false),
    sig(
        "timeout",
        &[req("time", Integer), opt("unit", Str), opt("activity", Boolean)],
        Some("time"),
        false,
    ),
    sig("timestamps", &[], None, false),
    sig("ansiColor", &[req("colorMapName", Str)], Some("colorMapName"), false),
];

pub const TRIGGERS: &[Signature] = &[
    sig("cron", &[req("spec", Str)], Some("spec"), false),
    sig(
        "pollSCM",
        &[req("scmpoll_spec", Str), opt("ignorePostCommitHooks", Boolean)],
        Some("scmpoll_spec"),
        false,
    ),
    sig(
        "upstream",
        &[req("upstreamProjects", Str), opt("threshold", Any)],
        Some("upstreamProjects"),
        false,
    ),
];

pub const PARAMETERS: &[Signature] = &[
    sig(
        "string",
        &[
            req("name", Str),
            opt("defaultValue", Str),
            opt("description", Str),
            opt("trim", Boolean),
        ],
        None,
        false,
    ),
    sig(
        "text",
        &[req("name", Str), opt("defaultValue", Str), opt("description", Str)],
        None,
        false,
    ),
    sig(
        "booleanParam",
        &[req("name", Str), opt("defaultValue", Boolean), opt("description", Str)],
        None,
        false,
    ),
    sig(
        "choice",
        &[req("name", Str), opt("choices", Any), opt("description", Str)],
        None,
        false,
    ),
    sig(
        "password",
        &[req("name", Str), opt("defaultValue", Str), opt("description", Str)],
        None,
        false,
    ),
    sig("file", &[req("name", Str), opt("description", Str)], None, false),
];

/// Simple when conditions. `not`, `allOf`, `anyOf` and `expression` have
/// their own shapes and are checked separately.
pub const WHEN_CONDITIONS: &[Signature] = &[
    sig("branch", &[req("pattern", Str), opt("comparator", Str)], Some("pattern"), false),
    sig("buildingTag", &[], None, false),
    sig(
        "changelog",
        &[req("pattern", Str)],
        Some("pattern"),
        false,
    ),
    sig(
        "changeset",
        &[req("pattern", Str), opt("caseSensitive", Boolean), opt("comparator", Str)],
        Some("pattern"),
        false,
    ),
    sig(
        "changeRequest",
        &[
            opt("id", Str),
            opt("target", Str),
            opt("branch", Str),
            opt("fork", Str),
            opt("url", Str),
            opt("title", Str),
            opt("author", Str),
            opt("authorDisplayName", Str),
            opt("authorEmail", Str),
            opt("comparator", Str),
        ],
        None,
        false,
    ),
    sig(
        "environment",
        &[
            req("name", Str),
            req("value", Str),
            opt("ignoreCase", Boolean),
            opt("comparator", Str),
        ],
        None,
        false,
    ),
    sig("equals", &[req("expected", Any), req("actual", Any)], None, false),
    sig("tag", &[opt("pattern", Str), opt("comparator", Str)], Some("pattern"), false),
    sig(
        "triggeredBy",
        &[req("cause", Str), opt("detail", Str)],
        Some("cause"),
        false,
    ),
];

pub const NESTED_WHEN_CONDITIONS: &[&str] = &["not", "allOf", "anyOf"];

pub const AGENT_TYPES: &[&str] = &["any", "none", "label", "node", "docker", "dockerfile"];

pub const POST_CONDITIONS: &[&str] = &[
    "always",
    "changed",
    "fixed",
    "regression",
    "aborted",
    "failure",
    "success",
    "unstable",
    "unsuccessful",
    "cleanup",
    "notBuilt",
];

pub fn lookup<'a>(table: &'a [Signature], name: &str) -> Option<&'a Signature> {
    table.iter().find(|s| s.name == name)
}

/// Closest candidate to a misspelt name, if any is close enough.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= 0.85)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_finds_known_steps() {
        let sh = lookup(STEPS, "sh").unwrap();
        assert_eq!(sh.default_parameter, Some("script"));
        assert!(sh.param("returnStdout").is_some());
        assert!(lookup(STEPS, "not-a-step").is_none());
    }

    #[test]
    fn test_default_parameters_are_declared() {
        for table in [STEPS, OPTIONS, TRIGGERS, PARAMETERS, WHEN_CONDITIONS] {
            for signature in table {
                if let Some(default) = signature.default_parameter {
                    assert!(
                        signature.param(default).is_some(),
                        "{} declares unknown default {default}",
                        signature.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_suggest_close_names() {
        let params = ["returnStdout", "returnStatus", "encoding"];
        assert_eq!(suggest("returnStdOut", params), Some("returnStdout"));
        assert_eq!(suggest("xyz", params), None);
    }
}
