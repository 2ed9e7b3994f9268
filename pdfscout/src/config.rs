use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collector::WalkErrorPolicy;
use crate::errors::{SearchError, SearchResult};
use crate::extractor::ExtractorKind;
use crate::request::SearchRequest;
use crate::search::{ScanOptions, TermMode};

const LOCAL_CONFIG: &str = ".pdfscout.yaml";
const GLOBAL_CONFIG: &str = "pdfscout/config.yaml";

/// Settings for a scan, merged from config files and the command line.
///
/// # Configuration Locations
///
/// Files are layered, later ones overriding earlier ones:
/// 1. Global `$CONFIG_DIR/pdfscout/config.yaml`
/// 2. Local `.pdfscout.yaml` in the current directory
/// 3. A file given with `--config`
///
/// Command-line flags are applied last, see [`SearchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Folder to scan
/// root_path: "/srv/scans"
///
/// # Terms separated by ';' (each one is a regex unless literal_terms is set)
/// terms: "invoice; total due"
///
/// case_sensitive: false
/// literal_terms: false
///
/// # lopdf (built in) or pdftotext (poppler)
/// extractor: pdftotext
/// pdftotext_path: "/usr/local/bin/pdftotext"
///
/// # fail or skip when a subfolder cannot be read
/// walk_errors: skip
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory to scan
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Raw `;`-delimited term string
    #[serde(default)]
    pub terms: String,

    #[serde(default)]
    pub case_sensitive: bool,

    /// Match terms as plain text instead of regular expressions
    #[serde(default)]
    pub literal_terms: bool,

    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Program to run for the pdftotext extractor
    #[serde(default)]
    pub pdftotext_path: Option<PathBuf>,

    #[serde(default)]
    pub walk_errors: WalkErrorPolicy,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            terms: String::new(),
            case_sensitive: false,
            literal_terms: false,
            extractor: ExtractorKind::default(),
            pdftotext_path: None,
            walk_errors: WalkErrorPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values taken from the command line. `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub root_path: Option<PathBuf>,
    pub terms: Option<String>,
    pub case_sensitive: bool,
    pub literal_terms: bool,
    pub extractor: Option<ExtractorKind>,
    pub pdftotext_path: Option<PathBuf>,
    pub walk_errors: Option<WalkErrorPolicy>,
    pub log_level: Option<String>,
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(SearchError::config_error(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }

        let config_files = [
            dirs::config_dir().map(|p| p.join(GLOBAL_CONFIG)),
            Some(PathBuf::from(LOCAL_CONFIG)),
            config_path.map(PathBuf::from),
        ];

        let mut builder = ConfigBuilder::builder();
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Every flag that was given wins, even when it names the default.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(terms) = cli.terms {
            self.terms = terms;
        }
        if cli.case_sensitive {
            self.case_sensitive = true;
        }
        if cli.literal_terms {
            self.literal_terms = true;
        }
        if let Some(extractor) = cli.extractor {
            self.extractor = extractor;
        }
        if cli.pdftotext_path.is_some() {
            self.pdftotext_path = cli.pdftotext_path;
        }
        if let Some(walk_errors) = cli.walk_errors {
            self.walk_errors = walk_errors;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Validates the folder and terms into a request
    pub fn to_request(&self) -> SearchResult<SearchRequest> {
        SearchRequest::new(&self.root_path, &self.terms, self.case_sensitive)
    }

    pub fn term_mode(&self) -> TermMode {
        if self.literal_terms {
            TermMode::Literal
        } else {
            TermMode::Regex
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            term_mode: self.term_mode(),
            walk_errors: self.walk_errors,
        }
    }
}
