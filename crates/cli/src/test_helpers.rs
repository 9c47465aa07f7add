//! Test helpers for unit tests
//!
//! Commands resolve `--file` and the default config file against the current
//! directory, so unit tests switch into a temporary directory first. Tests
//! using it must be `#[serial]`. Integration tests live in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Changes the current directory and restores it on drop, even on panic.
pub struct DirGuard {
    original_dir: PathBuf,
}

impl DirGuard {
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or entered.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let original_dir = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        Ok(DirGuard { original_dir })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}
