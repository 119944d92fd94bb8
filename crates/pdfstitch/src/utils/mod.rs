//! Utilities for path collection and size formatting.

use crate::registry::SourceKind;
use crate::{Result, StitchError};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Check whether an input argument contains glob wildcards.
pub fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expand inputs that contain wildcards, keeping plain paths as given.
///
/// Each pattern's matches are sorted; the relative order of the arguments is
/// preserved. A pattern matching nothing is an error.
pub fn expand_inputs<T>(inputs: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !is_glob_pattern(input) {
            resolved.push(PathBuf::from(input));
            continue;
        }

        let matches = collect_paths_for_pattern(input)?;
        if matches.is_empty() {
            return Err(StitchError::other(format!(
                "Pattern matched no files: {input}"
            )));
        }
        resolved.extend(matches);
    }

    Ok(resolved)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./scans/*.png"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern.as_ref()).map_err(|err| {
        StitchError::invalid_config(format!("Invalid pattern '{}': {err}", pattern.as_ref()))
    })?;

    let mut resolved_paths = paths
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| StitchError::other(err.to_string()))?;
    resolved_paths.sort();

    Ok(resolved_paths)
}

/// Collect the supported files in `dir` whose names match `pattern`.
///
/// Results are sorted by file name. Subdirectories, unsupported files and
/// `exclude` (typically the output file) are skipped.
///
/// # Errors
///
/// - [`StitchError::NotFound`] if `dir` does not exist
/// - [`StitchError::InvalidConfig`] if `dir` is not a directory or
///   `pattern` is not a valid glob
pub fn collect_directory(
    dir: &Path,
    pattern: &str,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StitchError::not_found(dir),
        _ => StitchError::from(e),
    })?;
    if !metadata.is_dir() {
        return Err(StitchError::invalid_config(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let matcher = glob::Pattern::new(pattern).map_err(|err| {
        StitchError::invalid_config(format!("Invalid pattern '{pattern}': {err}"))
    })?;
    let excluded = exclude.and_then(|p| std::fs::canonicalize(p).ok());

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !matcher.matches(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        // Follows symlinks; a dangling link is skipped.
        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => continue,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        }

        if excluded.is_some() && std::fs::canonicalize(&path).ok() == excluded {
            continue;
        }

        if !SourceKind::is_supported(&path) {
            warn!(path = %path.display(), "skipping unsupported file");
            continue;
        }

        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
