//! Frontmatter repair followed by tag maintenance on the same files

use std::path::Path;

use folio::fs::{files_with_extension, WalkOptions};
use folio::repair::{repair_file, RepairStatus};
use folio::report::Outcome;
use folio::tags::{collect_usage, process_file, ConfirmAll, TagLimits, TagPlan};

use super::helpers::*;

const BROKEN: &str = "---\ntitle: Comercio exterior\ncategories:\n  - economía\ndraft: false---\n## Exportaciones\n\nTexto con --- en medio.\n";

#[test]
fn test_repair_then_tag_keeps_other_lines() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_file(temp.path(), "blog/2024-02-10-comercio/index.qmd", BROKEN);

    let status = repair_file(&path, false).unwrap();
    assert!(matches!(status, RepairStatus::Fixed { .. }));
    let repaired = read(&path);
    assert_eq!(
        repaired,
        "---\ntitle: Comercio exterior\ncategories:\n  - economía\ndraft: false\n---\n\n## Exportaciones\n\nTexto con --- en medio.\n"
    );
    assert_eq!(repair_file(&path, false).unwrap(), RepairStatus::AlreadyCorrect);

    let plan = TagPlan {
        add: vec!["Comercio Internacional".into()],
        ..Default::default()
    };
    let report = process_file(&path, &plan, TagLimits::default(), &mut ConfirmAll, false).unwrap();
    assert_eq!(report.outcome, Outcome::Updated);
    assert_eq!(
        read(&path),
        "---\ntitle: Comercio exterior\ncategories:\n  - economía\ntags:\n  - comercio_internacional\ndraft: false\n---\n\n## Exportaciones\n\nTexto con --- en medio.\n"
    );
}

#[test]
fn test_declined_removals_keep_tags() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_file(
        temp.path(),
        "post.qmd",
        "---\ntitle: T\ntags: [Borrador, Economía, temp]\n---\nBody\n",
    );

    let plan = TagPlan {
        remove: vec!["borrador".into(), "temp".into()],
        ..Default::default()
    };
    let mut decider = |_: &Path, tag: &str| tag != "temp";
    let report = process_file(&path, &plan, TagLimits::default(), &mut decider, false).unwrap();

    let changes = report.changes.unwrap();
    assert_eq!(changes.removed, vec!["borrador"]);
    assert_eq!(changes.declined, vec!["temp"]);
    assert_eq!(read(&path), "---\ntitle: T\ntags:\n  - economia\n  - temp\n---\nBody\n");
}

#[test]
fn test_batch_over_tree_and_usage() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp.path();
    write_file(root, "a/index.qmd", "---\ntitle: A\ntags:\n- Logistics\n- Supply Chain\n---\n");
    write_file(root, "b/index.qmd", "---\ntitle: B\ntags: logistics\n---\n");
    write_file(root, "c/index.qmd", "---\ntitle: C\n---\n");
    write_file(root, "_site/a/index.qmd", "---\ntags: [Logistics]\n---\n");

    let files = files_with_extension(root, "qmd", WalkOptions::default());
    assert_eq!(files.len(), 3);

    let before = collect_usage(files.clone());
    assert_eq!(before.untagged, 1);
    assert_eq!(before.non_canonical(), vec!["Logistics", "Supply Chain"]);

    let plan = TagPlan {
        normalize: true,
        replacements: vec![("Logistics".into(), "logistica".into())],
        ..Default::default()
    };
    let outcomes: Vec<Outcome> = files
        .iter()
        .map(|f| {
            process_file(f, &plan, TagLimits::default(), &mut ConfirmAll, false)
                .unwrap()
                .outcome
        })
        .collect();
    assert_eq!(outcomes, vec![Outcome::Updated, Outcome::Updated, Outcome::Skipped]);

    let after = collect_usage(files);
    assert_eq!(after.ranked(), vec![("logistica", 2), ("supply_chain", 1)]);
    assert!(after.non_canonical().is_empty());
    assert_eq!(read(&root.join("_site/a/index.qmd")), "---\ntags: [Logistics]\n---\n");
}
