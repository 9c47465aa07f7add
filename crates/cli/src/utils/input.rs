//! Command input: a file path or standard input

use crate::error::{CliError, CliResult};
use std::fs;
use std::io::{self, Read};

/// Read the command input from `file`, or from standard input when no path is given.
///
/// Refuses to block on an interactive terminal.
pub fn read(file: Option<&str>) -> CliResult<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::Message(format!("Failed to read {path}: {e}"))),
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err(CliError::Message(
                    "No input: pass --file <path> or pipe the input on standard input".to_string(),
                ));
            }
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Jenkinsfile");
        fs::write(&path, "pipeline {}\n").unwrap();
        let text = read(path.to_str()).unwrap();
        assert_eq!(text, "pipeline {}\n");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing");
        match read(path.to_str()) {
            Err(CliError::Message(msg)) => assert!(msg.starts_with("Failed to read")),
            other => panic!("Expected CliError::Message, got {other:?}"),
        }
    }
}
