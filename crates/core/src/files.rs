//! Local file enumeration
//!
//! Expands a glob pattern into the regular files it matches.

use std::path::PathBuf;

use glob::MatchOptions;

use crate::error::Result;

/// Dotfiles only match when the pattern names the dot explicitly.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Expand `pattern` into the sorted list of regular files it matches.
///
/// Zero matches is an empty list. Directories matched by the pattern are
/// left out since only files can be uploaded.
pub fn enumerate(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in glob::glob_with(pattern, MATCH_OPTIONS)? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    tracing::debug!(pattern, matches = files.len(), "Expanded glob pattern");

    Ok(files)
}

/// Guess the content type of a file from its extension.
pub fn content_type(path: &std::path::Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}
