//! Hard-link deduplication across blog directories

use std::fs;

use folio::dedupe::{deduplicate, DedupeOptions, LinkOutcome};
use folio::fs::WalkOptions;

use super::helpers::*;

const SHARED: &str = "_contenido-final.qmd";

fn options(dry_run: bool) -> DedupeOptions {
    DedupeOptions {
        file_name: SHARED.to_string(),
        walk: WalkOptions::default(),
        dry_run,
    }
}

#[cfg(unix)]
#[test]
fn test_shared_partials_are_linked_and_conflicts_kept() {
    use std::os::unix::fs::MetadataExt;

    let temp = tempfile::TempDir::new().unwrap();
    let root = temp.path();
    let source = write_file(root, "axiomata/posts/_contenido-final.qmd", "::: footer\n:::\n");
    let copy = write_file(root, "numerus/posts/_contenido-final.qmd", "::: footer\n:::\n");
    let edited = write_file(root, "chaska/posts/_contenido-final.qmd", "::: footer edited\n:::\n");
    write_file(root, "numerus/_freeze/posts/_contenido-final.qmd", "::: footer\n:::\n");

    let report = deduplicate(root, &options(false)).expect("Failed to deduplicate");

    assert_eq!(report.source.as_ref().unwrap().path, source);
    assert_eq!(report.candidates.len(), 2, "_freeze copies are never visited");
    assert_eq!(report.summary.updated, 1);
    assert_eq!(report.summary.warnings, 1);
    assert!(!report.summary.has_errors());

    let source_ino = fs::metadata(&source).unwrap().ino();
    assert_eq!(fs::metadata(&copy).unwrap().ino(), source_ino);
    assert_ne!(fs::metadata(&edited).unwrap().ino(), source_ino);
    assert_eq!(read(&edited), "::: footer edited\n:::\n");

    // A second run finds everything already linked
    let rerun = deduplicate(root, &options(false)).unwrap();
    let linked = rerun
        .candidates
        .iter()
        .filter(|c| matches!(c.outcome, LinkOutcome::AlreadyLinked))
        .count();
    assert_eq!(linked, 1);
    assert_eq!(rerun.summary.updated, 0);
}

#[test]
fn test_dry_run_reports_without_linking() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp.path();
    write_file(root, "a/_contenido-final.qmd", "same");
    let copy = write_file(root, "b/_contenido-final.qmd", "same");
    let before = fs::metadata(&copy).unwrap().modified().unwrap();

    let report = deduplicate(root, &options(true)).unwrap();
    assert!(matches!(report.candidates[0].outcome, LinkOutcome::WouldLink));
    assert_eq!(fs::metadata(&copy).unwrap().modified().unwrap(), before);
}
