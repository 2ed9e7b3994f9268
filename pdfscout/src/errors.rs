use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Failure to turn one PDF into page texts.
///
/// Raised by a [`crate::extractor::TextExtractor`] and recovered by the scan
/// controller, which reports it as a `FileError` event and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to extract text from {path}: {message}")]
pub struct ExtractionError {
    pub path: PathBuf,
    pub message: String,
}

impl ExtractionError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short, single-line description for display next to a file.
    pub fn summary(&self) -> String {
        self.message
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Failed to walk {path}: {message}")]
    WalkError { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

/// Canonicalize the path and strip UNC prefixes so that
/// comparisons on Windows are consistent.
pub fn unify_path(original: &Path) -> PathBuf {
    let canonical = original
        .canonicalize()
        .unwrap_or_else(|_| original.to_path_buf());
    strip_unc_prefix(&canonical)
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl SearchError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn walk_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WalkError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SearchError::invalid_request("no terms");
        assert!(matches!(err, SearchError::InvalidRequest(_)));

        let err = SearchError::invalid_pattern("(unclosed");
        assert!(matches!(err, SearchError::InvalidPattern(_)));

        let err = SearchError::walk_error("/tmp/locked", "permission denied");
        assert!(matches!(err, SearchError::WalkError { .. }));

        let err: SearchError = ExtractionError::new("b.pdf", "broken xref").into();
        assert!(matches!(err, SearchError::Extraction(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::invalid_request("search terms must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid request: search terms must not be empty"
        );

        let err = SearchError::config_error("Missing required field".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );

        let err: SearchError = ExtractionError::new("b.pdf", "broken xref").into();
        assert_eq!(
            err.to_string(),
            "Failed to extract text from b.pdf: broken xref"
        );
    }

    #[test]
    fn test_extraction_summary_is_first_line() {
        let err = ExtractionError::new("c.pdf", "  Syntax Error: bad header \ndetails follow");
        assert_eq!(err.summary(), "Syntax Error: bad header");

        let empty = ExtractionError::new("d.pdf", "");
        assert_eq!(empty.summary(), "");
    }

    #[test]
    fn test_unify_path_keeps_missing_paths() {
        let missing = Path::new("definitely/not/here");
        assert_eq!(unify_path(missing), PathBuf::from("definitely/not/here"));
    }
}
