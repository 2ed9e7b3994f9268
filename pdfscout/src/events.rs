use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Outcome of one term in one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermStatus {
    Found,
    NotFound,
    ExtractionError,
}

impl TermStatus {
    pub fn from_count(occurrences: usize) -> Self {
        if occurrences > 0 {
            TermStatus::Found
        } else {
            TermStatus::NotFound
        }
    }
}

/// Per-file, per-term result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub file_path: PathBuf,
    pub term: String,
    pub occurrences: usize,
    pub status: TermStatus,
}

/// Everything a scan reports to its sink, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    NoFilesFound { root_folder: PathBuf },
    FileStarted { file_path: PathBuf },
    TermResult(ScanProgress),
    FileError { file_path: PathBuf, error_summary: String },
    ScanComplete,
}

impl ScanEvent {
    /// The file this event is about, if any
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            ScanEvent::FileStarted { file_path } | ScanEvent::FileError { file_path, .. } => {
                Some(file_path)
            }
            ScanEvent::TermResult(progress) => Some(&progress.file_path),
            ScanEvent::NoFilesFound { .. } | ScanEvent::ScanComplete => None,
        }
    }

    /// True for the last event a scan emits
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanEvent::NoFilesFound { .. } | ScanEvent::ScanComplete
        )
    }
}

/// Receives scan events as they are produced.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

pub type EventSender = mpsc::UnboundedSender<ScanEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ScanEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

impl EventSink for EventSender {
    fn emit(&self, event: ScanEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event);
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct VecSink {
    events: Mutex<Vec<ScanEvent>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for VecSink {
    fn emit(&self, event: ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
