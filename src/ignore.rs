//! File and directory ignore pattern handling for Sprout templates.
//! This module processes .sproutignore files to exclude specific paths
//! from template copying, similar to .gitignore functionality.

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

use crate::constants::{DEFAULT_IGNORE_PATTERNS, IGNORE_FILE};
use crate::error::{Error, Result};

/// Compiles a list of glob patterns into a single set.
pub fn build_glob_set<I, S>(patterns: I) -> Result<GlobSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        builder.add(
            Glob::new(pattern)
                .map_err(|e| Error::IgnoreError(format!("invalid pattern '{pattern}': {e}")))?,
        );
    }
    builder.build().map_err(|e| Error::IgnoreError(e.to_string()))
}

/// Reads the .sproutignore file of a template and combines it with the
/// built-in patterns.
///
/// # Notes
/// - If the .sproutignore file doesn't exist, only the defaults apply
/// - Each non-empty line that is not a `#` comment is a glob pattern
///
/// # Example
/// ```ignore
/// # Contents of .sproutignore:
/// *.pyc
/// **/__pycache__
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(template_root: P) -> Result<GlobSet> {
    let ignore_path = template_root.as_ref().join(IGNORE_FILE);
    let mut patterns: Vec<String> =
        DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect();

    if let Ok(contents) = read_to_string(&ignore_path) {
        patterns.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    } else {
        debug!("{IGNORE_FILE} does not exist");
    }

    build_glob_set(&patterns)
}

/// Returns true when `relative` or any of its ancestors matches the set.
pub fn is_ignored(patterns: &GlobSet, relative: &Path) -> bool {
    relative
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| patterns.is_match(p))
}
