//! Export → edit → import round trips over a temporary site

use std::collections::BTreeMap;
use std::path::Path;

use folio::metadata::sheet::read_sheet;
use folio::metadata::{export_metadata, import_metadata, ExportOptions, ImportOptions, MetadataConfig};
use folio::report::Outcome;

use super::helpers::*;

const POBREZA: &str = "axiomata/posts/2024-01-15-pobreza/index.qmd";
const INFLACION: &str = "axiomata/posts/2024-03-02-inflacion/index.qmd";
const REGRESION: &str = "numerus/2023-11-20-regresion/index.qmd";

fn export_all(base: &Path, output: &Path) -> folio::metadata::ExportReport {
    let options = ExportOptions {
        blog: None,
        output: output.to_path_buf(),
        incremental: false,
    };
    export_metadata(base, &options, &MetadataConfig::default()).expect("Failed to export")
}

fn snapshot(base: &Path) -> BTreeMap<&'static str, String> {
    [POBREZA, INFLACION, REGRESION]
        .into_iter()
        .map(|rel| (rel, read(&base.join(rel))))
        .collect()
}

/// Rewrite one cell of the row for `relative`
fn edit_cell(sheet: &Path, relative: &str, column: &str, text: &str) {
    let mut reader = csv::Reader::from_path(sheet).expect("Failed to open sheet");
    let headers = reader.headers().expect("Failed to read headers").clone();
    let path_idx = headers.iter().position(|h| h == "ruta_archivo").unwrap();
    let col_idx = headers.iter().position(|h| h == column).unwrap();

    let records: Vec<Vec<String>> = reader
        .records()
        .map(|r| {
            let record = r.expect("Failed to read record");
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells[path_idx] == relative {
                cells[col_idx] = text.to_string();
            }
            cells
        })
        .collect();

    let mut writer = csv::Writer::from_path(sheet).expect("Failed to open sheet for writing");
    writer.write_record(&headers).unwrap();
    for record in records {
        writer.write_record(&record).unwrap();
    }
    writer.flush().unwrap();
}

#[test]
fn test_export_lists_articles_in_order() {
    let site = create_site();
    let base = site.path();
    let output = base.join("out/metadata.csv");

    let report = export_all(base, &output);
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.by_type.get("doc"), Some(&1));
    assert_eq!(report.by_type.get("stu"), Some(&1));
    assert_eq!(report.by_type.get("man"), Some(&1));

    let sheet = read_sheet(&output).unwrap();
    let paths: Vec<&str> = sheet.rows.iter().filter_map(|r| r.get("ruta_archivo")).collect();
    assert_eq!(paths, vec![POBREZA, INFLACION, REGRESION]);

    let pobreza = &sheet.rows[0];
    assert_eq!(pobreza.get("blog_nombre"), Some("axiomata"));
    assert_eq!(pobreza.get("title"), Some("Pobreza: un análisis regional"));
    assert_eq!(pobreza.get("tags"), Some("economia, pobreza"));
    assert_eq!(pobreza.get("author_1_name"), Some("Edison Achalma"));
    assert_eq!(pobreza.get("citation_type"), Some("article-journal"));

    let regresion = &sheet.rows[2];
    assert_eq!(regresion.get("tipo_documento"), Some("man"));
    assert_eq!(regresion.get("author_1_orcid"), Some("0000-0002-1825-0097"));
    assert_eq!(regresion.get("author_1_affiliation_city"), Some("Ayacucho"));
    assert_eq!(regresion.get("numbered_lines"), Some("TRUE"));
}

#[test]
fn test_unedited_sheet_changes_nothing() {
    let site = create_site();
    let base = site.path();
    let output = base.join("metadata.csv");
    export_all(base, &output);
    let before = snapshot(base);

    let report = import_metadata(base, &output, &ImportOptions::default(), &MetadataConfig::default())
        .expect("Failed to import");

    assert_eq!(report.summary.unchanged, 3);
    assert_eq!(report.summary.updated, 0);
    assert!(report.errors.is_empty());
    assert_eq!(snapshot(base), before);
}

#[test]
fn test_edited_cells_are_written_to_own_frontmatter() {
    let site = create_site();
    let base = site.path();
    let output = base.join("metadata.csv");
    export_all(base, &output);

    edit_cell(&output, INFLACION, "title", "Inflación en el Perú");
    edit_cell(&output, INFLACION, "draft", "FALSE");

    let report = import_metadata(base, &output, &ImportOptions::default(), &MetadataConfig::default())
        .expect("Failed to import");
    assert_eq!(report.summary.updated, 1);
    assert_eq!(report.summary.unchanged, 2);

    let row = report.rows.iter().find(|r| r.outcome == Outcome::Updated).unwrap();
    let fields: Vec<&str> = row.changes.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "draft"]);

    let text = read(&base.join(INFLACION));
    assert!(text.contains("title: Inflación en el Perú\n"));
    assert!(text.contains("draft: false\n"));
    assert!(text.contains("course: Macroeconomía\n"));
    assert!(text.ends_with("Cuerpo.\n"));
    assert!(!text.contains("license"), "inherited fields stay in _metadata.yml");
    assert!(!text.contains("Edison Achalma"));
}

#[test]
fn test_dry_run_and_blog_filter() {
    let site = create_site();
    let base = site.path();
    let output = base.join("metadata.csv");
    export_all(base, &output);
    edit_cell(&output, INFLACION, "title", "Otro título");
    edit_cell(&output, REGRESION, "title", "Regresión múltiple");
    let before = snapshot(base);

    let dry = ImportOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = import_metadata(base, &output, &dry, &MetadataConfig::default()).unwrap();
    assert_eq!(report.summary.updated, 2);
    assert_eq!(snapshot(base), before);

    let numerus_only = ImportOptions {
        blog: Some("numerus".into()),
        ..Default::default()
    };
    let report = import_metadata(base, &output, &numerus_only, &MetadataConfig::default()).unwrap();
    assert_eq!(report.rows.len(), 1);
    assert!(read(&base.join(REGRESION)).contains("title: Regresión múltiple"));
    assert_eq!(read(&base.join(INFLACION)), before[INFLACION]);
}

#[test]
fn test_incremental_export_appends_only_new_articles() {
    let site = create_site();
    let base = site.path();
    let output = base.join("metadata.csv");
    export_all(base, &output);

    write_file(
        base,
        "numerus/2024-05-01-series/index.qmd",
        "---\ntitle: Series de tiempo\n---\n",
    );
    let options = ExportOptions {
        blog: None,
        output: output.clone(),
        incremental: true,
    };
    let report = export_metadata(base, &options, &MetadataConfig::default()).unwrap();
    assert!(report.appended);
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.already_present, 3);

    let again = export_metadata(base, &options, &MetadataConfig::default()).unwrap();
    assert_eq!(again.rows_written, 0);

    let sheet = read_sheet(&output).unwrap();
    assert_eq!(sheet.rows.len(), 4);
    assert_eq!(sheet.rows[3].get("title"), Some("Series de tiempo"));
}

#[test]
fn test_no_inherit_exports_own_fields_only() {
    let site = create_site();
    let base = site.path();
    let output = base.join("own.csv");
    let config = MetadataConfig {
        inherit: false,
        ..Default::default()
    };
    let options = ExportOptions {
        blog: Some("axiomata".into()),
        output: output.clone(),
        incremental: false,
    };
    export_metadata(base, &options, &config).unwrap();

    let sheet = read_sheet(&output).unwrap();
    assert_eq!(sheet.rows.len(), 2);
    assert!(sheet.rows.iter().all(|r| r.get("author_1_name").is_none()));
}
