mod logging;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use output::{EventPrinter, OutputFormat};
use pdfscout::{
    config::{CliOverrides, SearchConfig},
    events::create_event_channel,
    list_pdf_files, ExtractorKind, ScanController, SearchError, WalkErrorPolicy,
};
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

type Result<T> = std::result::Result<T, SearchError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Root directory to search in [default: .]
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// Search terms separated by ';' (e.g. "invoice; total due")
    #[arg(short = 't', long)]
    terms: Option<String>,

    /// Match case exactly
    #[arg(short = 'c', long)]
    case_sensitive: bool,

    /// Match terms as plain text instead of regular expressions
    #[arg(long)]
    literal: bool,

    /// Text extractor to use (lopdf|pdftotext)
    #[arg(long)]
    extractor: Option<ExtractorKind>,

    /// Path to the pdftotext program
    #[arg(long)]
    pdftotext: Option<PathBuf>,

    /// Skip unreadable subfolders instead of failing
    #[arg(long)]
    skip_unreadable: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: warn]
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count search terms in every PDF under a folder
    Search(Box<CliSearchConfig>),

    /// List the PDF files that a search would scan
    List {
        /// Root directory to list
        #[arg(short = 'd', long, default_value = ".")]
        root: PathBuf,

        /// Skip unreadable subfolders instead of failing
        #[arg(long)]
        skip_unreadable: bool,
    },
}

fn walk_policy(skip_unreadable: bool) -> Option<WalkErrorPolicy> {
    skip_unreadable.then_some(WalkErrorPolicy::Skip)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            let file_config = SearchConfig::load_from(args.config.as_deref())?;
            let cli_config = CliOverrides {
                root_path: args.root,
                terms: args.terms,
                case_sensitive: args.case_sensitive,
                literal_terms: args.literal,
                extractor: args.extractor,
                pdftotext_path: args.pdftotext,
                walk_errors: walk_policy(args.skip_unreadable),
                log_level: args.log_level,
            };
            let config = file_config.merge_with_cli(cli_config);
            logging::init_logger(&config.log_level);
            debug!("Effective configuration: {:?}", config);

            let request = config.to_request()?;
            let extractor = config.extractor.build(config.pdftotext_path.as_deref());
            let (tx, rx) = create_event_channel();

            // The channel closes once the scan, the only remaining sender, is dropped.
            let scan = {
                let controller = ScanController::new(extractor, Arc::new(tx))
                    .with_options(config.scan_options());
                controller.start(&request, None)?
            };

            let printer = EventPrinter::new(args.format, &request.terms);
            let (_, report) = tokio::join!(scan.run(), printer.consume(rx));
            report?;
            Ok(())
        }
        Commands::List {
            root,
            skip_unreadable,
        } => {
            logging::init_logger("warn");
            if !pdfscout::request::is_directory(&root) {
                return Err(SearchError::invalid_request(format!(
                    "{} is not an existing directory",
                    root.display()
                )));
            }
            let policy = walk_policy(skip_unreadable).unwrap_or_default();
            let files = list_pdf_files(&root, policy)?;
            for file in &files {
                println!("{}", file.display());
            }
            eprintln!("Found {} PDF files", files.len());
            Ok(())
        }
    }
}
