use anyhow::Result;
use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn pdfscout(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("pdfscout-cli")?;
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_pdf(path: &Path, text: &str) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

#[test]
fn test_search_counts_terms() -> Result<()> {
    let dir = tempdir()?;
    write_pdf(&dir.path().join("report.pdf"), "The cat sat with a CAT")?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat; dog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf"))
        .stdout(predicate::str::contains("cat: 2 occurrences"))
        .stdout(predicate::str::contains("dog: not found"));
    Ok(())
}

#[test]
fn test_search_empty_folder() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("notes.txt"), "cat")?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files found in folder"));
    Ok(())
}

#[test]
fn test_broken_pdf_does_not_fail_the_run() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("broken.pdf"), b"definitely not a pdf")?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("broken.pdf"))
        .stdout(predicate::str::contains("Error"))
        .stdout(predicate::str::contains("(1 failed)"));
    Ok(())
}

#[test]
fn test_empty_terms_are_rejected() -> Result<()> {
    let dir = tempdir()?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", " ; ;"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid request"));
    Ok(())
}

#[test]
fn test_missing_folder_is_rejected() -> Result<()> {
    let dir = tempdir()?;

    pdfscout(&dir)?
        .args(["search", "-d", "does-not-exist", "-t", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid request"));
    Ok(())
}

#[test]
fn test_bad_regex_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("a.pdf"), b"")?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat(("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"))
        .stdout(predicate::str::is_empty());

    // The same text is fine as a literal term
    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat((", "--literal"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("b.pdf"), b"garbage")?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "cat", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"file_started""#))
        .stdout(predicate::str::contains(r#""event":"file_error""#))
        .stdout(predicate::str::contains(r#""event":"scan_complete""#));
    Ok(())
}

#[test]
fn test_terms_from_local_config() -> Result<()> {
    let dir = tempdir()?;
    write_pdf(&dir.path().join("a.pdf"), "invoice invoice")?;
    fs::write(dir.path().join(".pdfscout.yaml"), "terms: \"invoice\"\n")?;

    pdfscout(&dir)?
        .args(["search", "-d", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice: 2 occurrences"));
    Ok(())
}

#[test]
fn test_cli_extractor_overrides_config() -> Result<()> {
    let dir = tempdir()?;
    write_pdf(&dir.path().join("a.pdf"), "invoice invoice")?;
    fs::write(
        dir.path().join(".pdfscout.yaml"),
        "extractor: pdftotext\npdftotext_path: \"/nonexistent/pdftotext\"\n",
    )?;

    pdfscout(&dir)?
        .args(["search", "-d", ".", "-t", "invoice", "--extractor", "lopdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice: 2 occurrences"));
    Ok(())
}

#[test]
fn test_list_pdf_files() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("2023/q1"))?;
    fs::write(dir.path().join("top.pdf"), b"")?;
    fs::write(dir.path().join("2023/q1/deep.PDF"), b"")?;
    fs::write(dir.path().join("2023/readme.txt"), b"")?;

    pdfscout(&dir)?
        .args(["list", "-d", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("top.pdf"))
        .stdout(predicate::str::contains("deep.PDF"))
        .stdout(predicate::str::contains("readme.txt").not())
        .stderr(predicate::str::contains("Found 2 PDF files"));
    Ok(())
}
