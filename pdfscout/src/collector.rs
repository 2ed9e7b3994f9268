use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::errors::{SearchError, SearchResult};

const PDF_SUFFIX: &str = ".pdf";

/// What to do with an entry the walker cannot read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkErrorPolicy {
    /// Abort the listing with the first error
    #[default]
    Fail,
    /// Log the error and keep walking
    Skip,
}

/// Returns true if the file name, lowercased, ends in `.pdf`.
pub fn is_pdf_name(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(PDF_SUFFIX))
        .unwrap_or(false)
}

/// Recursively lists every PDF file under `root`.
///
/// Entries come back in the order the directory listing yields them, with
/// each subdirectory walked depth-first before its later siblings. Nothing is
/// sorted and no ignore files or hidden-file rules are applied. Symlinks are
/// not followed; a symlink whose name ends in `.pdf` is listed like a file.
pub fn list_pdf_files(root: &Path, policy: WalkErrorPolicy) -> SearchResult<Vec<PathBuf>> {
    debug!("Listing PDF files under {}", root.display());

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => match policy {
                WalkErrorPolicy::Fail => return Err(walk_failure(root, e)),
                WalkErrorPolicy::Skip => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            },
        };

        if entry.depth() == 0 {
            continue;
        }
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if !is_dir && is_pdf_name(entry.path()) {
            trace!("Adding PDF: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }

    debug!("Found {} PDF files under {}", files.len(), root.display());
    Ok(files)
}

fn walk_failure(root: &Path, err: ignore::Error) -> SearchError {
    match err.into_io_error() {
        Some(io) => SearchError::walk_error(root, io.to_string()),
        None => SearchError::walk_error(root, "unreadable directory entry"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_pdf_name() {
        assert!(is_pdf_name(Path::new("a.pdf")));
        assert!(is_pdf_name(Path::new("dir/REPORT.PDF")));
        assert!(is_pdf_name(Path::new("mixed.PdF")));
        assert!(is_pdf_name(Path::new(".pdf")));
        assert!(!is_pdf_name(Path::new("a.pdf.txt")));
        assert!(!is_pdf_name(Path::new("pdf")));
        assert!(!is_pdf_name(Path::new("notes.txt")));
    }

    #[test]
    fn test_lists_nested_pdfs_only() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("top.pdf"), b"").unwrap();
        fs::write(dir.path().join("top.txt"), b"").unwrap();
        fs::write(dir.path().join("a").join("MID.PDF"), b"").unwrap();
        fs::write(nested.join("deep.pdf"), b"").unwrap();
        fs::write(nested.join("deep.pdf.bak"), b"").unwrap();

        let mut files = list_pdf_files(dir.path(), WalkErrorPolicy::Fail).unwrap();
        files.sort();

        let mut expected = vec![
            dir.path().join("top.pdf"),
            dir.path().join("a").join("MID.PDF"),
            nested.join("deep.pdf"),
        ];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_directory_named_pdf_is_recursed_not_listed() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("scans.pdf");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("inner.pdf"), b"").unwrap();

        let files = list_pdf_files(dir.path(), WalkErrorPolicy::Fail).unwrap();
        assert_eq!(files, vec![folder.join("inner.pdf")]);
    }

    #[test]
    fn test_hidden_entries_are_included() {
        let dir = tempdir().unwrap();
        let hidden = dir.path().join(".archive");
        fs::create_dir(&hidden).unwrap();
        fs::write(hidden.join("old.pdf"), b"").unwrap();
        fs::write(dir.path().join(".ignore"), "*.pdf\n").unwrap();

        let files = list_pdf_files(dir.path(), WalkErrorPolicy::Fail).unwrap();
        assert_eq!(files, vec![hidden.join("old.pdf")]);
    }

    #[test]
    fn test_subdirectory_contents_are_contiguous() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        for name in ["1.pdf", "2.pdf", "3.pdf"] {
            fs::write(sub.join(name), b"").unwrap();
        }
        fs::write(dir.path().join("x.pdf"), b"").unwrap();
        fs::write(dir.path().join("y.pdf"), b"").unwrap();

        let files = list_pdf_files(dir.path(), WalkErrorPolicy::Fail).unwrap();
        let positions: Vec<usize> = files
            .iter()
            .enumerate()
            .filter(|(_, p)| p.starts_with(&sub))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2] - positions[0], 2);
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        let files = list_pdf_files(dir.path(), WalkErrorPolicy::Skip).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_error_policy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        let open = dir.path().join("open");
        fs::create_dir(&locked).unwrap();
        fs::create_dir(&open).unwrap();
        fs::write(locked.join("secret.pdf"), b"").unwrap();
        fs::write(open.join("visible.pdf"), b"").unwrap();
        fs::write(dir.path().join("top.pdf"), b"").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Permissions are not enforced for this user
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let failed = list_pdf_files(dir.path(), WalkErrorPolicy::Fail);
        assert!(matches!(failed, Err(SearchError::WalkError { .. })));

        let mut files = list_pdf_files(dir.path(), WalkErrorPolicy::Skip).unwrap();
        files.sort();
        let mut expected = vec![dir.path().join("top.pdf"), open.join("visible.pdf")];
        expected.sort();
        assert_eq!(files, expected);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
