use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::events::{ScanEvent, ScanProgress, TermStatus};

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FileOutcome {
    /// Per-term results, in request order
    Terms(Vec<ScanProgress>),
    /// Extraction failed with this summary
    Error(String),
}

/// All results for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn has_matches(&self) -> bool {
        match &self.outcome {
            FileOutcome::Terms(results) => results.iter().any(|r| r.status == TermStatus::Found),
            FileOutcome::Error(_) => false,
        }
    }
}

/// Summary of a scan, built from its events
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Terms of the request, used to fill in rows for failed files
    pub terms: Vec<String>,
    pub file_reports: Vec<FileReport>,
    pub files_scanned: usize,
    pub files_with_matches: usize,
    pub files_failed: usize,
    pub total_occurrences: usize,
    /// Set by `NoFilesFound`
    pub no_files_found: bool,
    /// Set by the terminal event
    pub complete: bool,
}

impl ScanReport {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: terms.to_vec(),
            ..Default::default()
        }
    }

    pub fn from_events<I>(terms: &[String], events: I) -> Self
    where
        I: IntoIterator<Item = ScanEvent>,
    {
        let mut report = Self::new(terms);
        for event in events {
            report.record(&event);
        }
        report
    }

    /// Folds one event into the report
    pub fn record(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::NoFilesFound { .. } => {
                self.no_files_found = true;
                self.complete = true;
            }
            ScanEvent::FileStarted { file_path } => {
                self.files_scanned += 1;
                self.file_reports.push(FileReport {
                    path: file_path.clone(),
                    outcome: FileOutcome::Terms(Vec::new()),
                });
            }
            ScanEvent::TermResult(progress) => {
                let had_matches = self
                    .current_file(&progress.file_path)
                    .map(|r| r.has_matches())
                    .unwrap_or(false);
                if !had_matches && progress.status == TermStatus::Found {
                    self.files_with_matches += 1;
                }
                self.total_occurrences += progress.occurrences;

                match self.current_file_mut(&progress.file_path) {
                    Some(FileReport {
                        outcome: FileOutcome::Terms(results),
                        ..
                    }) => results.push(progress.clone()),
                    _ => {
                        self.files_scanned += 1;
                        self.file_reports.push(FileReport {
                            path: progress.file_path.clone(),
                            outcome: FileOutcome::Terms(vec![progress.clone()]),
                        });
                    }
                }
            }
            ScanEvent::FileError {
                file_path,
                error_summary,
            } => {
                self.files_failed += 1;
                match self.current_file_mut(file_path) {
                    Some(report) => report.outcome = FileOutcome::Error(error_summary.clone()),
                    None => {
                        self.files_scanned += 1;
                        self.file_reports.push(FileReport {
                            path: file_path.clone(),
                            outcome: FileOutcome::Error(error_summary.clone()),
                        });
                    }
                }
            }
            ScanEvent::ScanComplete => self.complete = true,
        }
    }

    fn current_file(&self, path: &Path) -> Option<&FileReport> {
        self.file_reports.last().filter(|r| r.path.as_path() == path)
    }

    fn current_file_mut(&mut self, path: &Path) -> Option<&mut FileReport> {
        self.file_reports.last_mut().filter(|r| r.path.as_path() == path)
    }

    /// One row per file and term; failed files get `ExtractionError` rows
    pub fn rows(&self) -> Vec<ScanProgress> {
        let mut rows = Vec::new();
        for report in &self.file_reports {
            match &report.outcome {
                FileOutcome::Terms(results) => rows.extend(results.iter().cloned()),
                FileOutcome::Error(_) => rows.extend(self.terms.iter().map(|term| ScanProgress {
                    file_path: report.path.clone(),
                    term: term.clone(),
                    occurrences: 0,
                    status: TermStatus::ExtractionError,
                })),
            }
        }
        rows
    }
}
