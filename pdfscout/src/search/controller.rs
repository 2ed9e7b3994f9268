use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::matcher::{TermMatcher, TermMode};
use crate::collector::{list_pdf_files, WalkErrorPolicy};
use crate::errors::SearchResult;
use crate::events::{EventSink, ScanEvent, ScanProgress};
use crate::extractor::TextExtractor;
use crate::metrics::ScanMetrics;
use crate::request::SearchRequest;

/// Invoked once when a scan has processed every file
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Whether the controller has a scan in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Scanning { generation: u64 },
}

/// How a call to [`Scan::run`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every file was processed and `ScanComplete` was emitted
    Completed { files: usize },
    /// The folder held no PDFs; `NoFilesFound` was emitted by `start`
    NoFilesFound,
    /// A newer scan was started, or the scan was cancelled
    Superseded,
}

/// Tunables that are not part of the request itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub term_mode: TermMode,
    pub walk_errors: WalkErrorPolicy,
}

#[derive(Debug, Default)]
struct SharedState {
    generation: AtomicU64,
    // generation of the running scan, 0 when idle
    scanning: AtomicU64,
}

/// Identifies one scan. Stale once a newer scan starts or the controller
/// cancels.
#[derive(Debug, Clone)]
pub struct ScanToken {
    generation: u64,
    shared: Arc<SharedState>,
}

impl ScanToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.shared.generation.load(Ordering::SeqCst) == self.generation
    }
}

/// Files of one scan and the position reached in them.
#[derive(Debug, Clone)]
pub struct ScanState {
    files: Vec<PathBuf>,
    index: usize,
    finished: bool,
}

impl ScanState {
    fn new(files: Vec<PathBuf>) -> Self {
        let finished = files.is_empty();
        Self {
            files,
            index: 0,
            finished,
        }
    }

    fn next_file(&mut self) -> Option<PathBuf> {
        match self.files.get(self.index) {
            Some(path) => {
                self.index += 1;
                Some(path.clone())
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.files.len() - self.index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Drives scans: lists the PDFs, extracts them one at a time and reports
/// every result to the event sink.
///
/// Only one scan is live at a time. Starting a new scan, or calling
/// [`ScanController::cancel`], makes any earlier [`Scan`] stale: it stops at
/// its next check and never emits again.
pub struct ScanController {
    extractor: Arc<dyn TextExtractor>,
    sink: Arc<dyn EventSink>,
    options: ScanOptions,
    shared: Arc<SharedState>,
    metrics: ScanMetrics,
}

impl ScanController {
    pub fn new(extractor: Arc<dyn TextExtractor>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            extractor,
            sink,
            options: ScanOptions::default(),
            shared: Arc::new(SharedState::default()),
            metrics: ScanMetrics::new(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn status(&self) -> ScanStatus {
        match self.shared.scanning.load(Ordering::SeqCst) {
            0 => ScanStatus::Idle,
            generation => ScanStatus::Scanning { generation },
        }
    }

    /// Abandons the running scan, if any
    pub fn cancel(&self) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.scanning.store(0, Ordering::SeqCst);
        debug!("Cancelled scans before generation {}", generation);
    }

    /// Prepares a scan of `request`.
    ///
    /// Term patterns are compiled and the file list is built before anything
    /// is emitted, so a bad pattern or an unreadable tree fails here with no
    /// events. An empty file list emits `NoFilesFound`, runs `on_complete`
    /// and leaves the controller idle; the returned scan then does nothing.
    pub fn start(
        &self,
        request: &SearchRequest,
        on_complete: Option<CompletionCallback>,
    ) -> SearchResult<Scan> {
        let matchers = request
            .terms
            .iter()
            .map(|term| {
                TermMatcher::with_metrics(
                    term,
                    request.case_sensitive,
                    self.options.term_mode,
                    self.metrics.clone(),
                )
            })
            .collect::<SearchResult<Vec<_>>>()?;

        let files = list_pdf_files(&request.root_folder, self.options.walk_errors)?;
        self.metrics.record_listing(files.len());

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = ScanToken {
            generation,
            shared: Arc::clone(&self.shared),
        };
        info!(
            "Starting scan {} of {} with terms {:?} ({} files)",
            generation,
            request.root_folder.display(),
            request.terms,
            files.len()
        );

        let mut scan = Scan {
            token,
            root_folder: request.root_folder.clone(),
            matchers,
            state: ScanState::new(files),
            extractor: Arc::clone(&self.extractor),
            sink: Arc::clone(&self.sink),
            metrics: self.metrics.clone(),
            on_complete,
        };

        if scan.state.is_finished() {
            self.shared.scanning.store(0, Ordering::SeqCst);
            scan.emit(ScanEvent::NoFilesFound {
                root_folder: request.root_folder.clone(),
            });
            info!("No files found in folder {}", request.root_folder.display());
            if let Some(callback) = scan.on_complete.take() {
                callback();
            }
        } else {
            self.shared.scanning.store(generation, Ordering::SeqCst);
        }

        Ok(scan)
    }
}

/// One started scan. Call [`Scan::run`] to process its files.
pub struct Scan {
    token: ScanToken,
    root_folder: PathBuf,
    matchers: Vec<TermMatcher>,
    state: ScanState,
    extractor: Arc<dyn TextExtractor>,
    sink: Arc<dyn EventSink>,
    metrics: ScanMetrics,
    on_complete: Option<CompletionCallback>,
}

impl Scan {
    pub fn token(&self) -> &ScanToken {
        &self.token
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Returns false, without emitting, once the scan is stale
    fn emit(&self, event: ScanEvent) -> bool {
        if !self.token.is_current() {
            return false;
        }
        self.sink.emit(event);
        true
    }

    fn abandon(&self) -> ScanOutcome {
        info!(
            "Scan {} of {} superseded with {} of {} files left",
            self.token.generation,
            self.root_folder.display(),
            self.state.remaining(),
            self.state.files().len()
        );
        ScanOutcome::Superseded
    }

    /// Processes the files one at a time, in list order.
    ///
    /// The only suspension point is the extractor call; the next file is not
    /// started until every event for the current one has been emitted.
    pub async fn run(mut self) -> ScanOutcome {
        if self.state.is_finished() {
            return ScanOutcome::NoFilesFound;
        }
        let extractor = Arc::clone(&self.extractor);

        while let Some(path) = self.state.next_file() {
            if !self.emit(ScanEvent::FileStarted {
                file_path: path.clone(),
            }) {
                return self.abandon();
            }

            debug!(
                "Extracting file {} of {}: {}",
                self.state.current_index(),
                self.state.files().len(),
                path.display()
            );
            let extracted = extractor.extract_page_texts(&path).await;
            if !self.token.is_current() {
                return self.abandon();
            }

            match extracted {
                Ok(pages) => {
                    self.metrics.record_extraction(pages.len());
                    for matcher in &self.matchers {
                        let (occurrences, status) = matcher.evaluate(&pages);
                        debug!(
                            "{}: '{}' occurs {} times",
                            path.display(),
                            matcher.term(),
                            occurrences
                        );
                        let progress = ScanProgress {
                            file_path: path.clone(),
                            term: matcher.term().to_string(),
                            occurrences,
                            status,
                        };
                        if !self.emit(ScanEvent::TermResult(progress)) {
                            return self.abandon();
                        }
                    }
                }
                Err(e) => {
                    error!("{}", e);
                    self.metrics.record_failure();
                    if !self.emit(ScanEvent::FileError {
                        file_path: path.clone(),
                        error_summary: e.summary(),
                    }) {
                        return self.abandon();
                    }
                }
            }
        }

        if !self.emit(ScanEvent::ScanComplete) {
            return self.abandon();
        }
        let _ = self.token.shared.scanning.compare_exchange(
            self.token.generation,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        info!(
            "Scan {} complete: {} files processed",
            self.token.generation,
            self.state.files().len()
        );
        self.metrics.log_stats();

        if let Some(callback) = self.on_complete.take() {
            callback();
        }
        ScanOutcome::Completed {
            files: self.state.files().len(),
        }
    }
}

impl Drop for Scan {
    /// A scan dropped before it finishes returns the controller to `Idle`,
    /// unless a newer scan has already taken over.
    fn drop(&mut self) {
        let _ = self.token.shared.scanning.compare_exchange(
            self.token.generation,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}
