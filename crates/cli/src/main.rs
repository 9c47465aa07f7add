//! Pipeline Model CLI
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.

mod commands;
mod error;
mod utils;

#[cfg(test)]
mod test_helpers;

use clap::{CommandFactory, Parser, Subcommand};
use commands::{completion, convert};

/// Pipeline Model CLI - Convert and validate declarative pipelines
#[derive(Parser)]
#[command(name = "pipeline-model")]
#[command(about = "Pipeline Model CLI - Convert and validate declarative pipelines", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a converter config file (defaults to .pipeline-model.yaml)
    #[arg(long, global = true)]
    config: Option<String>,
    /// Pretty-print the JSON response
    #[arg(long, global = true)]
    pretty: bool,
    /// Log conversion details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON pipeline to script
    ToJenkinsfile {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Convert a pipeline script to JSON
    ToJson {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Convert bare script steps to a JSON array
    StepsToJson {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Convert a JSON step or array of steps to script
    StepsToJenkinsfile {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Validate a pipeline script, or a JSON pipeline with --json
    Validate {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
        /// Treat the input as a JSON pipeline
        #[arg(long)]
        json: bool,
    },
    /// Re-render a pipeline script in canonical layout
    PrettyPrint {
        /// Input file (reads standard input when omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Print the JSON schema of the pipeline model
    Schema,
    /// Generate shell completion scripts
    Completion {
        /// Shell name: bash, zsh, fish, elvish, or powershell
        shell: String,
    },
}

/// Get the CLI command structure (used by completion generation)
pub fn get_cli_command() -> clap::Command {
    Cli::command()
}

fn main() {
    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    let settings = convert::Settings {
        config: cli.config,
        pretty: cli.pretty,
    };

    let exit_code = match cli.command {
        Commands::ToJenkinsfile { file } => {
            convert::run(&convert::Options::new(convert::Operation::ToJenkinsfile, file), &settings)
        }
        Commands::ToJson { file } => {
            convert::run(&convert::Options::new(convert::Operation::ToJson, file), &settings)
        }
        Commands::StepsToJson { file } => {
            convert::run(&convert::Options::new(convert::Operation::StepsToJson, file), &settings)
        }
        Commands::StepsToJenkinsfile { file } => convert::run(
            &convert::Options::new(convert::Operation::StepsToJenkinsfile, file),
            &settings,
        ),
        Commands::PrettyPrint { file } => {
            convert::run(&convert::Options::new(convert::Operation::PrettyPrint, file), &settings)
        }
        Commands::Schema => {
            convert::run(&convert::Options::new(convert::Operation::Schema, None), &settings)
        }
        Commands::Validate { file, json } => {
            let operation = if json {
                convert::Operation::ValidateJson
            } else {
                convert::Operation::ValidateJenkinsfile
            };
            convert::run(&convert::Options::new(operation, file), &settings)
        }
        Commands::Completion { shell } => {
            let opts = completion::Options { shell };
            completion::run(&opts)
        }
    };

    std::process::exit(exit_code);
}
