//! Text extraction collaborators.
//!
//! The scan controller only ever sees the [`TextExtractor`] trait: one
//! asynchronous call per file that yields the page texts in order, or an
//! [`ExtractionError`]. Two implementations ship with the crate, a pure-Rust
//! one built on `lopdf` and one that shells out to poppler's `pdftotext`.
use async_trait::async_trait;
use lopdf::Document;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::ExtractionError;

const PAGE_BREAK: char = '\x0c';

/// Converts one PDF into its page texts.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Which extractor to build from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Lopdf,
    Pdftotext,
}

impl ExtractorKind {
    pub fn build(self, pdftotext_path: Option<&Path>) -> Arc<dyn TextExtractor> {
        match self {
            ExtractorKind::Lopdf => Arc::new(LopdfExtractor),
            ExtractorKind::Pdftotext => Arc::new(match pdftotext_path {
                Some(program) => PdftotextExtractor::with_program(program),
                None => PdftotextExtractor::new(),
            }),
        }
    }
}

impl std::str::FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lopdf" => Ok(ExtractorKind::Lopdf),
            "pdftotext" => Ok(ExtractorKind::Pdftotext),
            other => Err(format!("unknown extractor '{}' (lopdf|pdftotext)", other)),
        }
    }
}

/// Extracts text in-process with `lopdf`.
///
/// Parsing is CPU-bound, so it runs on the blocking pool while the caller
/// awaits it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    fn extract_blocking(path: &Path) -> Result<Vec<String>, ExtractionError> {
        let doc = Document::load(path).map_err(|e| ExtractionError::new(path, e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractionError::new(path, "document is encrypted"));
        }

        let pages = doc.get_pages();
        trace!("{} has {} pages", path.display(), pages.len());
        pages
            .keys()
            .map(|&page_number| {
                doc.extract_text(&[page_number]).map_err(|e| {
                    ExtractionError::new(path, format!("page {}: {}", page_number, e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl TextExtractor for LopdfExtractor {
    async fn extract_page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        debug!("Extracting {} with lopdf", path.display());
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_blocking(&owned))
            .await
            .map_err(|e| ExtractionError::new(path, format!("extraction task failed: {}", e)))?
    }
}

/// Runs the external `pdftotext` program and splits its output on page
/// breaks.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: PathBuf,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::with_program("pdftotext")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `pdftotext` output into pages. The tool ends every page, including
/// the last one, with a form feed.
pub fn split_pages(output: &str) -> Vec<String> {
    let mut pages: Vec<String> = output.split(PAGE_BREAK).map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[async_trait]
impl TextExtractor for PdftotextExtractor {
    async fn extract_page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        debug!(
            "Extracting {} with {}",
            path.display(),
            self.program.display()
        );
        let output = Command::new(&self.program)
            .args(["-layout", "-enc", "UTF-8"])
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| {
                ExtractionError::new(
                    path,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(ExtractionError::new(path, message));
        }

        Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
    }
}
