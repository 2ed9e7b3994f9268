use std::sync::Arc;
use tracing::info;

use super::controller::{ScanController, ScanOptions};
use crate::errors::SearchResult;
use crate::events::VecSink;
use crate::extractor::TextExtractor;
use crate::request::SearchRequest;
use crate::results::ScanReport;

/// Runs one scan of `request` to completion and returns its report
pub async fn search(
    request: &SearchRequest,
    extractor: Arc<dyn TextExtractor>,
    options: ScanOptions,
) -> SearchResult<ScanReport> {
    let sink = Arc::new(VecSink::new());
    let controller = ScanController::new(extractor, sink.clone()).with_options(options);
    controller.start(request, None)?.run().await;

    let report = ScanReport::from_events(&request.terms, sink.take());
    info!(
        "Search complete. Found {} occurrences in {} of {} files",
        report.total_occurrences, report.files_with_matches, report.files_scanned
    );
    Ok(report)
}
