use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::events::TermStatus;
use crate::metrics::ScanMetrics;

const SIMPLE_PATTERN_THRESHOLD: usize = 32;

static PATTERN_CACHE: Lazy<DashMap<String, MatchStrategy>> = Lazy::new(DashMap::new);

/// How the raw term text is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermMode {
    /// The term is an unescaped regular expression, so `.` or `(` keep their
    /// regex meaning
    #[default]
    Regex,
    /// The term is escaped and matched as plain text
    Literal,
}

/// Strategy for pattern matching
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    Simple(String),
    Regex(Arc<Regex>),
}

impl MatchStrategy {
    fn count(&self, text: &str) -> usize {
        match self {
            MatchStrategy::Simple(pattern) => text.matches(pattern.as_str()).count(),
            MatchStrategy::Regex(regex) => regex.find_iter(text).count(),
        }
    }
}

/// Counts occurrences of one term across the pages of a file.
///
/// When matching is case-insensitive the pattern text and every page are
/// lowercased before matching. The pattern is lowercased as written, so an
/// escape such as `\D` in a regex term becomes `\d`.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    case_sensitive: bool,
    strategy: MatchStrategy,
    metrics: ScanMetrics,
}

impl TermMatcher {
    /// Compiles a matcher for `term`
    pub fn new(term: &str, case_sensitive: bool, mode: TermMode) -> SearchResult<Self> {
        Self::with_metrics(term, case_sensitive, mode, ScanMetrics::new())
    }

    /// Compiles a matcher that records pattern cache use into `metrics`
    pub fn with_metrics(
        term: &str,
        case_sensitive: bool,
        mode: TermMode,
        metrics: ScanMetrics,
    ) -> SearchResult<Self> {
        let cased = if case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };
        let pattern = match mode {
            TermMode::Regex => cased,
            TermMode::Literal => regex::escape(&cased),
        };

        let strategy = if let Some(entry) = PATTERN_CACHE.get(&pattern) {
            metrics.record_cache_operation(true);
            entry.clone()
        } else {
            let strategy = if Self::is_simple_pattern(&pattern) {
                MatchStrategy::Simple(pattern.clone())
            } else {
                let regex = Regex::new(&pattern)
                    .map_err(|e| SearchError::invalid_pattern(format!("'{}': {}", term, e)))?;
                MatchStrategy::Regex(Arc::new(regex))
            };
            metrics.record_cache_operation(false);
            PATTERN_CACHE.insert(pattern, strategy.clone());
            strategy
        };

        Ok(Self {
            term: term.to_string(),
            case_sensitive,
            strategy,
            metrics,
        })
    }

    /// The term as the user wrote it
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Determines if a pattern can use simple string matching
    fn is_simple_pattern(pattern: &str) -> bool {
        pattern.len() < SIMPLE_PATTERN_THRESHOLD
            && !pattern.contains(|c: char| c.is_ascii_punctuation() && c != '_' && c != '-')
    }

    /// Sums the non-overlapping matches on every page
    pub fn count<S: AsRef<str>>(&self, pages: &[S]) -> usize {
        let total = pages
            .iter()
            .map(|page| {
                let page = page.as_ref();
                if self.case_sensitive {
                    self.strategy.count(page)
                } else {
                    self.strategy.count(&page.to_lowercase())
                }
            })
            .sum();
        trace!("Term '{}' matched {} times", self.term, total);
        self.metrics.record_occurrences(total);
        total
    }

    /// Counts and classifies in one step
    pub fn evaluate<S: AsRef<str>>(&self, pages: &[S]) -> (usize, TermStatus) {
        let occurrences = self.count(pages);
        (occurrences, TermStatus::from_count(occurrences))
    }
}

/// One-shot form of [`TermMatcher::count`] using regex term semantics.
pub fn count_occurrences<S: AsRef<str>>(
    pages: &[S],
    term: &str,
    case_sensitive: bool,
) -> SearchResult<usize> {
    Ok(TermMatcher::new(term, case_sensitive, TermMode::Regex)?.count(pages))
}
