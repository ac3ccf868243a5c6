//! Download-if-missing for the model catalog.
//!
//! Presence is checked by file name only. Nothing verifies what was
//! downloaded, so an interrupted transfer that left a file behind counts as
//! present on the next run.

use crate::error::BootstrapError;
use crate::model::catalog::{ModelEntry, MODELS};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Something that can put `entry` into `dir`.
pub trait Fetcher {
    fn fetch(&self, entry: &ModelEntry, dir: &Path) -> Result<(), BootstrapError>;
}

/// Runs an external download program: `<program> <args..> <dir> <url>`.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// `wget -nc -q --show-progress -P <dir> <url>`
    pub fn wget() -> Self {
        Self::named("wget")
    }

    /// The wget flag set under a different program name or path.
    pub fn named(program: impl Into<String>) -> Self {
        Self::new(
            program,
            ["-nc", "-q", "--show-progress", "-P"].map(String::from).to_vec(),
        )
    }
}

impl Default for CommandFetcher {
    fn default() -> Self {
        Self::wget()
    }
}

impl Fetcher for CommandFetcher {
    fn fetch(&self, entry: &ModelEntry, dir: &Path) -> Result<(), BootstrapError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(dir)
            .arg(entry.url)
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => BootstrapError::ToolUnavailable {
                    tool: self.program.clone(),
                    source: e,
                },
                _ => BootstrapError::FetchFailed {
                    name: entry.file_name.to_string(),
                    url: entry.url.to_string(),
                    reason: e.to_string(),
                },
            })?;

        if !status.success() {
            return Err(BootstrapError::FetchFailed {
                name: entry.file_name.to_string(),
                url: entry.url.to_string(),
                reason: status.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub present: Vec<PathBuf>,
    pub fetched: Vec<PathBuf>,
}

/// Make sure one catalog entry exists under `dir`. Returns true if it had
/// to be fetched.
pub fn ensure_model_present(
    dir: &Path,
    entry: &ModelEntry,
    fetcher: &dyn Fetcher,
) -> Result<bool, BootstrapError> {
    let path = entry.path_in(dir);
    if path.exists() {
        return Ok(false);
    }

    std::fs::create_dir_all(dir).map_err(|source| BootstrapError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    info!(model = entry.file_name, url = entry.url, "downloading model");
    fetcher.fetch(entry, dir)?;

    if !path.exists() {
        return Err(BootstrapError::FetchFailed {
            name: entry.file_name.to_string(),
            url: entry.url.to_string(),
            reason: format!("{} not found after fetch", path.display()),
        });
    }
    info!(path = %path.display(), "model downloaded");
    Ok(true)
}

/// Fetch every catalog entry missing from `dir`. Stops at the first failure.
pub fn ensure_models_present(
    dir: &Path,
    fetcher: &dyn Fetcher,
) -> Result<BootstrapReport, BootstrapError> {
    let mut report = BootstrapReport::default();
    for entry in MODELS {
        let fetched = ensure_model_present(dir, entry, fetcher)?;
        let path = entry.path_in(dir);
        if fetched {
            report.fetched.push(path);
        } else {
            report.present.push(path);
        }
    }
    info!(
        present = report.present.len(),
        fetched = report.fetched.len(),
        "models ready"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wget_flags() {
        let f = CommandFetcher::wget();
        assert_eq!(f.program, "wget");
        assert_eq!(f.args, ["-nc", "-q", "--show-progress", "-P"]);
    }

    #[test]
    fn missing_program_is_tool_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let f = CommandFetcher::named("definitely-not-a-real-fetch-tool-4d1c");
        let err = f.fetch(&MODELS[0], dir.path()).unwrap_err();
        assert!(matches!(err, BootstrapError::ToolUnavailable { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_fetch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let f = CommandFetcher::new("false", vec![]);
        let err = f.fetch(&MODELS[0], dir.path()).unwrap_err();
        assert!(matches!(err, BootstrapError::FetchFailed { .. }), "{err}");
    }
}
