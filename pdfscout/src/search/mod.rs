//! Scanning a folder of PDFs for terms.
//!
//! [`controller`] owns the scan state machine, [`matcher`] the counting rule
//! and [`engine`] a convenience wrapper that runs one scan to completion and
//! folds its events into a [`crate::results::ScanReport`].
pub mod controller;
pub mod engine;
pub mod matcher;

pub use controller::{
    CompletionCallback, Scan, ScanController, ScanOptions, ScanOutcome, ScanState, ScanStatus,
    ScanToken,
};
pub use engine::search;
pub use matcher::{count_occurrences, TermMatcher, TermMode};
