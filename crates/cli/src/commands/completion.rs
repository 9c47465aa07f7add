//! Shell completion command implementation

use crate::error::{CliError, CliResult};
use crate::get_cli_command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

const SUPPORTED: &str = "bash, zsh, fish, elvish, powershell";

pub struct Options {
    pub shell: String,
}

/// Generate shell completion script
pub fn run(options: &Options) -> i32 {
    match run_inner(options, &mut io::stdout()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ Completion generation failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn parse_shell(name: &str) -> CliResult<Shell> {
    if name.is_empty() {
        return Err(CliError::Message(format!(
            "Shell name is required. Supported shells: {SUPPORTED}"
        )));
    }
    name.to_lowercase().parse::<Shell>().map_err(|_| {
        CliError::Message(format!(
            "Unsupported shell: {name}. Supported shells: {SUPPORTED}"
        ))
    })
}

fn run_inner(options: &Options, out: &mut dyn Write) -> CliResult<()> {
    let shell = parse_shell(&options.shell)?;
    let mut cmd = get_cli_command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_command_name() {
        assert_eq!(get_cli_command().get_name(), "pipeline-model");
    }

    #[test]
    fn test_bash_completion_lists_subcommands() {
        let mut out = Vec::new();
        let options = Options {
            shell: "Bash".to_string(),
        };
        run_inner(&options, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("to-jenkinsfile"));
        assert!(script.contains("steps-to-json"));
    }

    #[test]
    fn test_every_supported_shell_is_documented() {
        let cmd = get_cli_command();
        let help = cmd
            .find_subcommand("completion")
            .and_then(|sub| sub.get_arguments().find(|arg| arg.get_id() == "shell"))
            .and_then(|arg| arg.get_help())
            .map(ToString::to_string)
            .unwrap();
        for shell in SUPPORTED.split(", ") {
            assert!(parse_shell(shell).is_ok(), "{shell}");
            assert!(help.contains(shell), "{shell} missing from {help:?}");
        }
    }

    #[test]
    fn test_unsupported_shell() {
        let options = Options {
            shell: "tcsh".to_string(),
        };
        match run_inner(&options, &mut Vec::new()) {
            Err(CliError::Message(msg)) => {
                assert!(msg.contains("Unsupported shell"));
                assert!(msg.contains("tcsh"));
            }
            other => panic!("Expected CliError::Message, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_shell() {
        let options = Options {
            shell: String::new(),
        };
        assert!(matches!(
            run_inner(&options, &mut Vec::new()),
            Err(CliError::Message(msg)) if msg.starts_with("Shell name is required")
        ));
    }
}
