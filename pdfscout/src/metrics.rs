use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters collected over the lifetime of a scan.
///
/// Clones share the same counters, so the controller and the matchers it
/// builds can record into one instance.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    files_listed: Arc<AtomicU64>,
    files_processed: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
    pages_extracted: Arc<AtomicU64>,
    occurrences: Arc<AtomicU64>,

    // Pattern cache
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            files_listed: Arc::new(AtomicU64::new(0)),
            files_processed: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            pages_extracted: Arc::new(AtomicU64::new(0)),
            occurrences: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_listing(&self, files: usize) {
        self.files_listed.fetch_add(files as u64, Ordering::Relaxed);
    }

    /// Records a file whose pages were extracted
    pub fn record_extraction(&self, pages: usize) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        let total = self
            .pages_extracted
            .fetch_add(pages as u64, Ordering::Relaxed)
            + pages as u64;
        debug!("Extracted {} pages, total: {} pages", pages, total);
    }

    /// Records a file whose extraction failed
    pub fn record_failure(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_occurrences(&self, count: usize) {
        self.occurrences.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Records a pattern cache lookup
    pub fn record_cache_operation(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_listed: self.files_listed.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            pages_extracted: self.pages_extracted.load(Ordering::Relaxed),
            occurrences: self.occurrences.load(Ordering::Relaxed),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Files listed/processed/failed: {}/{}/{}\n\
             Pages extracted: {}\n\
             Occurrences counted: {}\n\
             Pattern cache hits/misses: {}/{}",
            stats.files_listed,
            stats.files_processed,
            stats.files_failed,
            stats.pages_extracted,
            stats.occurrences,
            stats.cache_hits,
            stats.cache_misses
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_listed: u64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub pages_extracted: u64,
    pub occurrences: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
