use clap::ValueEnum;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pdfscout::events::EventReceiver;
use pdfscout::{ScanEvent, ScanProgress, ScanReport, SearchError, TermStatus};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable results
    Text,
    /// One JSON object per event
    Json,
}

/// Prints scan events as they arrive and keeps a running report.
pub struct EventPrinter {
    format: OutputFormat,
    spinner: ProgressBar,
    report: ScanReport,
}

impl EventPrinter {
    pub fn new(format: OutputFormat, terms: &[String]) -> Self {
        let spinner = match format {
            OutputFormat::Text => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.enable_steady_tick(Duration::from_millis(120));
                spinner
            }
            OutputFormat::Json => ProgressBar::hidden(),
        };

        Self {
            format,
            spinner,
            report: ScanReport::new(terms),
        }
    }

    /// Drains the channel until the scan drops its sender
    pub async fn consume(mut self, mut events: EventReceiver) -> Result<ScanReport, SearchError> {
        while let Some(event) = events.recv().await {
            self.print(&event)?;
            self.report.record(&event);
        }
        self.spinner.finish_and_clear();

        if self.format == OutputFormat::Text && !self.report.no_files_found {
            print_summary(&self.report);
        }
        Ok(self.report)
    }

    fn print(&self, event: &ScanEvent) -> Result<(), SearchError> {
        match self.format {
            OutputFormat::Json => {
                let line = serde_json::to_string(event)?;
                println!("{}", line);
            }
            OutputFormat::Text => {
                if let ScanEvent::FileStarted { file_path } = event {
                    self.spinner
                        .set_message(format!("Extracting {}", file_path.display()));
                }
                if let Some(line) = render_text(event) {
                    self.spinner.suspend(|| println!("{}", line));
                }
            }
        }
        Ok(())
    }
}

/// Text for one event, or `None` for events with nothing to show
pub fn render_text(event: &ScanEvent) -> Option<String> {
    match event {
        ScanEvent::NoFilesFound { root_folder } => Some(
            format!("No files found in folder {}", root_folder.display())
                .yellow()
                .to_string(),
        ),
        ScanEvent::FileStarted { file_path } => {
            Some(format!("\n{}", file_path.display().to_string().blue()))
        }
        ScanEvent::TermResult(progress) => Some(render_progress(progress)),
        ScanEvent::FileError { error_summary, .. } => {
            let marker = "Error".red();
            if error_summary.is_empty() {
                Some(format!("  {}", marker))
            } else {
                Some(format!("  {}: {}", marker, error_summary))
            }
        }
        ScanEvent::ScanComplete => None,
    }
}

fn render_progress(progress: &ScanProgress) -> String {
    let detail = match progress.status {
        TermStatus::Found => format!("{} occurrences", progress.occurrences)
            .green()
            .to_string(),
        TermStatus::NotFound => "not found".red().to_string(),
        TermStatus::ExtractionError => "error".red().to_string(),
    };
    format!("  {}: {}", progress.term, detail)
}

fn print_summary(report: &ScanReport) {
    println!(
        "\nFound {} occurrences in {} of {} files ({} failed)",
        report.total_occurrences,
        report.files_with_matches,
        report.files_scanned,
        report.files_failed
    );
}
