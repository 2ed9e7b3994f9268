use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{unify_path, SearchError, SearchResult};

/// Separator between terms in the raw term string.
pub const TERM_DELIMITER: char = ';';

/// A validated search over one folder tree.
///
/// Built through [`SearchRequest::new`], which owns the precondition checks:
/// the root must be an existing directory and at least one term must survive
/// parsing. The controller assumes both hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub root_folder: PathBuf,
    pub terms: Vec<String>,
    pub case_sensitive: bool,
}

/// Splits a raw `;`-delimited string into trimmed, non-empty terms.
///
/// Order is preserved and duplicates are kept.
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(TERM_DELIMITER)
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true when `path` exists and is a directory, without following a
/// trailing symlink.
pub fn is_directory(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

impl SearchRequest {
    /// Validates and builds a request from a root folder and a raw term string.
    pub fn new(
        root_folder: impl AsRef<Path>,
        raw_terms: &str,
        case_sensitive: bool,
    ) -> SearchResult<Self> {
        Self::from_terms(root_folder, parse_terms(raw_terms), case_sensitive)
    }

    /// Validates and builds a request from already-split terms.
    pub fn from_terms(
        root_folder: impl AsRef<Path>,
        terms: Vec<String>,
        case_sensitive: bool,
    ) -> SearchResult<Self> {
        let root = root_folder.as_ref();
        if root.as_os_str().is_empty() {
            return Err(SearchError::invalid_request("no folder selected"));
        }
        if !is_directory(root) {
            return Err(SearchError::invalid_request(format!(
                "{} is not an existing directory",
                root.display()
            )));
        }
        if terms.is_empty() || terms.iter().any(|t| t.is_empty()) {
            return Err(SearchError::invalid_request(
                "at least one non-empty search term is required",
            ));
        }

        Ok(Self {
            root_folder: unify_path(root),
            terms,
            case_sensitive,
        })
    }
}
