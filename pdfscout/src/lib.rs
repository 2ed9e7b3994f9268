pub mod collector;
pub mod config;
pub mod errors;
pub mod events;
pub mod extractor;
pub mod metrics;
pub mod request;
pub mod results;
pub mod search;

pub use collector::{list_pdf_files, WalkErrorPolicy};
pub use config::{CliOverrides, SearchConfig};
pub use errors::{ExtractionError, SearchError, SearchResult};
pub use events::{EventSink, ScanEvent, ScanProgress, TermStatus};
pub use extractor::{ExtractorKind, LopdfExtractor, PdftotextExtractor, TextExtractor};
pub use request::{parse_terms, SearchRequest};
pub use results::{FileOutcome, FileReport, ScanReport};
pub use search::{ScanController, ScanOptions, ScanOutcome, ScanStatus};
