use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};

use super::{
    error::{FormatError, LogError},
    template::{expand_placeholders, RenderContext},
};

/// Resolves a file name template against the instant the logger is opened at.
pub fn resolve_path(
    template: &str,
    name: &str,
    instant: DateTime<FixedOffset>,
) -> Result<PathBuf, FormatError> {
    let ctx = RenderContext {
        name,
        instant,
        level: None,
    };
    expand_placeholders(template, &ctx).map(PathBuf::from)
}

/// Creates the parent directories of `path` and a fresh, empty file at `path`.
/// A file already present at `path` is removed first.
pub fn create_log_file(path: &Path) -> Result<File, LogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LogError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_error = |source| LogError::FileCreation {
        path: path.to_path_buf(),
        source,
    };

    // A dangling symlink counts as present and is replaced too.
    if fs::symlink_metadata(path).is_ok() {
        tracing::debug!(target: "ezlogger", "replacing existing log file {}", path.display());
        fs::remove_file(path).map_err(file_error)?;
    }

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(file_error)
}
