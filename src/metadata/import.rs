//! Applying an edited sheet back to the documents it describes.
//!
//! Each row is compared with the document's effective frontmatter (own fields
//! over inherited defaults). Only cells that say something different are
//! written, and they are written into the document's own mapping. A row
//! that matches the document leaves the file byte-identical.

use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::export::{affiliation_with, field_value};
use super::inherit::effective_mapping;
use super::schema::{
    all_columns, detect_doc_type, field_for, AuthorAttr, DocType, Field, APA_FORMAT_KEY,
    AUTHOR_COLUMNS, COL_BLOG, COL_PATH, FORMAT_KEY, TYPE_KEY,
};
use super::sheet::{read_sheet, SheetRow};
use super::value::{
    coerce_date, coerce_list, coerce_scalar, date_matches, list_matches, render_cell, render_json,
    scalar_matches,
};
use super::MetadataConfig;
use crate::error::{FolioError, FolioResult};
use crate::parser::frontmatter;
use crate::report::{BatchSummary, Outcome};

const MAX_AUTHORS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Only rows whose `blog_nombre` equals this
    pub blog: Option<String>,
    /// Only rows whose path starts with this
    pub path_prefix: Option<String>,
    pub dry_run: bool,
}

/// One field that differs between the sheet and the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before = if self.before.is_empty() { "(none)" } else { &self.before };
        write!(f, "{}: {} → {}", self.field, before, self.after)
    }
}

#[derive(Debug, Clone)]
pub struct RowReport {
    pub relative: String,
    pub path: PathBuf,
    pub outcome: Outcome,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub rows: Vec<RowReport>,
    pub errors: Vec<FolioError>,
    pub summary: BatchSummary,
    pub dry_run: bool,
}

/// Apply every selected row of `sheet_path` to the documents under `base`
///
/// # Errors
///
/// Fails only when the sheet itself cannot be read or has no path column.
/// Row-level failures are collected in the report.
pub fn import_metadata(
    base: &Path,
    sheet_path: &Path,
    options: &ImportOptions,
    config: &MetadataConfig,
) -> FolioResult<ImportReport> {
    let sheet = read_sheet(sheet_path)?;
    if !sheet.headers.iter().any(|h| h == COL_PATH) {
        return Err(FolioError::InvalidSheet {
            path: sheet_path.to_path_buf(),
            reason: format!("no '{COL_PATH}' column"),
        });
    }

    let mut report = ImportReport {
        dry_run: options.dry_run,
        ..Default::default()
    };
    for error in sheet.errors {
        tracing::error!(%error, "unreadable sheet record");
        report.summary.record_error(&error);
        report.errors.push(error);
    }

    for row in &sheet.rows {
        let Some(relative) = row.get(COL_PATH) else {
            continue;
        };
        if options.blog.as_deref().is_some_and(|blog| row.get(COL_BLOG) != Some(blog)) {
            continue;
        }
        if options
            .path_prefix
            .as_deref()
            .is_some_and(|prefix| !relative.starts_with(prefix))
        {
            continue;
        }

        match import_row(base, relative, row, options.dry_run, config) {
            Ok(row_report) => {
                report.summary.record(row_report.outcome);
                report.rows.push(row_report);
            }
            Err(error) => {
                tracing::error!(line = row.line, %error, "row not applied");
                report.summary.record_error(&error);
                report.errors.push(error);
            }
        }
    }

    tracing::info!(
        updated = report.summary.updated,
        unchanged = report.summary.unchanged,
        errors = report.summary.errors,
        dry_run = options.dry_run,
        "metadata import finished"
    );
    Ok(report)
}

/// Apply one row to the document at `base/relative`
pub fn import_row(
    base: &Path,
    relative: &str,
    row: &SheetRow,
    dry_run: bool,
    config: &MetadataConfig,
) -> FolioResult<RowReport> {
    let path = base.join(relative);
    if !path.is_file() {
        return Err(FolioError::MissingDocument { path });
    }

    let content = fs::read_to_string(&path).map_err(|e| FolioError::io(&path, e))?;
    let (mut own, body) =
        frontmatter::parse_document(&content).map_err(|e| FolioError::frontmatter(&path, e))?;
    let effective = effective_mapping(&own, &path, base, config.inherit);

    let changes = apply_row(&mut own, &effective, row, config);
    if changes.is_empty() {
        tracing::debug!(path = %path.display(), "no changes");
        return Ok(RowReport {
            relative: relative.to_string(),
            path,
            outcome: Outcome::Unchanged,
            changes,
        });
    }

    if !dry_run {
        let updated = frontmatter::render_document(&own, body).map_err(|source| FolioError::Serialize {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, updated).map_err(|e| FolioError::io(&path, e))?;
    }
    tracing::debug!(path = %path.display(), changes = changes.len(), dry_run, "document updated");

    Ok(RowReport {
        relative: relative.to_string(),
        path,
        outcome: Outcome::Updated,
        changes,
    })
}

/// Write the cells of `row` that differ from `effective` into `own`
pub fn apply_row(
    own: &mut Mapping,
    effective: &Mapping,
    row: &SheetRow,
    config: &MetadataConfig,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for column in all_columns() {
        let (Some(cell), Some(field)) = (row.get(column), field_for(column)) else {
            continue;
        };
        let current = field_value(field, effective);

        match field {
            Field::Identity | Field::LinksEnabled | Field::Author(..) => {}
            Field::DocType => apply_doc_type(own, effective, cell, config, &mut changes),
            Field::Scalar(key) => {
                if !scalar_matches(cell, current) {
                    set_field(own, key, coerce_scalar(cell), current, &mut changes);
                }
            }
            Field::Date(key) => {
                if !date_matches(cell, current) {
                    set_field(own, key, coerce_date(cell), current, &mut changes);
                }
            }
            Field::List(key) => {
                if !list_matches(cell, current) {
                    set_field(own, key, coerce_list(cell), current, &mut changes);
                }
            }
            Field::Citation(sub) => apply_citation(own, effective, sub, cell, &mut changes),
            Field::LinksData => apply_links(own, cell, current, &mut changes),
        }
    }

    apply_authors(own, row, &mut changes);
    changes
}

fn set_field(
    own: &mut Mapping,
    key: &str,
    value: Value,
    before: Option<&Value>,
    changes: &mut Vec<FieldChange>,
) {
    changes.push(FieldChange {
        field: key.to_string(),
        before: before.map(render_cell).unwrap_or_default(),
        after: render_cell(&value),
    });
    own.insert(Value::from(key), value);
}

/// Store a changed document type where the document already keeps it
///
/// A direct `documentmode` wins over `format.apaquarto-pdf.documentmode`. With
/// neither present, a direct key is only created for a non-default type.
fn apply_doc_type(
    own: &mut Mapping,
    effective: &Mapping,
    cell: &str,
    config: &MetadataConfig,
    changes: &mut Vec<FieldChange>,
) {
    let detected = detect_doc_type(effective, &config.default_doc_type);
    let wanted = DocType::from(cell);
    if wanted == detected {
        return;
    }

    let label = Value::from(wanted.label());
    let change = |field: &str| FieldChange {
        field: field.to_string(),
        before: detected.label().to_string(),
        after: wanted.label().to_string(),
    };

    if own.contains_key(TYPE_KEY) {
        own.insert(Value::from(TYPE_KEY), label);
        changes.push(change(TYPE_KEY));
        return;
    }

    let nested = own
        .get_mut(FORMAT_KEY)
        .and_then(Value::as_mapping_mut)
        .and_then(|format| format.get_mut(APA_FORMAT_KEY))
        .and_then(Value::as_mapping_mut)
        .filter(|apa| apa.contains_key(TYPE_KEY));
    if let Some(apa) = nested {
        apa.insert(Value::from(TYPE_KEY), label);
        changes.push(change("format.apaquarto-pdf.documentmode"));
        return;
    }

    if wanted != config.default_doc_type {
        own.insert(Value::from(TYPE_KEY), label);
        changes.push(change(TYPE_KEY));
    }
}

fn apply_citation(
    own: &mut Mapping,
    effective: &Mapping,
    sub: &'static str,
    cell: &str,
    changes: &mut Vec<FieldChange>,
) {
    let current = field_value(Field::Citation(sub), effective);
    let is_list = matches!(current, Some(Value::Sequence(_)));
    let unchanged = if is_list {
        list_matches(cell, current)
    } else {
        scalar_matches(cell, current)
    };
    if unchanged {
        return;
    }

    let value = if is_list {
        coerce_list(cell)
    } else {
        Value::String(cell.to_string())
    };
    changes.push(FieldChange {
        field: format!("citation.{sub}"),
        before: current.map(render_cell).unwrap_or_default(),
        after: render_cell(&value),
    });

    // A boolean `citation` (or none at all) becomes a mapping
    let mut citation = match own.get("citation").or_else(|| effective.get("citation")) {
        Some(Value::Mapping(existing)) => existing.clone(),
        _ => Mapping::new(),
    };
    citation.insert(Value::from(sub), value);
    own.insert(Value::from("citation"), Value::Mapping(citation));
}

fn apply_links(own: &mut Mapping, cell: &str, current: Option<&Value>, changes: &mut Vec<FieldChange>) {
    let before = current.map(render_json).unwrap_or_default();
    if cell == before {
        return;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(cell)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_yaml::to_value(json).map_err(|e| e.to_string()));
    let links = match parsed {
        Ok(links) => links,
        Err(error) => {
            tracing::warn!(%error, "ignoring links_data that is not valid JSON");
            return;
        }
    };
    if current == Some(&links) {
        return;
    }

    changes.push(FieldChange {
        field: "links".to_string(),
        before,
        after: render_json(&links),
    });
    own.insert(Value::from("links"), links);
}

/// Update authors field by field, only when the document lists its own
fn apply_authors(own: &mut Mapping, row: &SheetRow, changes: &mut Vec<FieldChange>) {
    let Some(Value::Sequence(authors)) = own.get_mut("author") else {
        return;
    };

    for index in 1..=MAX_AUTHORS {
        let cells: Vec<(AuthorAttr, &str)> = AUTHOR_COLUMNS
            .iter()
            .filter_map(|column| match field_for(column)? {
                Field::Author(i, attr) if i == index => Some((attr, row.get(column)?)),
                _ => None,
            })
            .collect();
        if cells.is_empty() {
            continue;
        }

        let slot = index - 1;
        if slot > authors.len() {
            tracing::warn!(index, "author row skipped, earlier authors are missing");
            continue;
        }
        if slot == authors.len() {
            if !cells.iter().any(|(attr, _)| *attr == AuthorAttr::Name) {
                continue;
            }
            authors.push(Value::Mapping(Mapping::new()));
        }

        let entry = &mut authors[slot];
        if let Value::String(name) = entry {
            let only_same_name = cells
                .iter()
                .all(|(attr, cell)| *attr == AuthorAttr::Name && *cell == name.as_str());
            if only_same_name {
                continue;
            }
            let mut fields = Mapping::new();
            fields.insert(Value::from("name"), Value::String(name.clone()));
            *entry = Value::Mapping(fields);
        }
        let Value::Mapping(fields) = entry else {
            continue;
        };

        for (attr, cell) in cells {
            apply_author_attr(fields, index, attr, cell, changes);
        }
    }
}

fn apply_author_attr(
    fields: &mut Mapping,
    index: usize,
    attr: AuthorAttr,
    cell: &str,
    changes: &mut Vec<FieldChange>,
) {
    let key = attr.key();

    if let AuthorAttr::Affiliation(sub) = attr {
        let current = affiliation_with(fields, sub).and_then(|aff| aff.get(sub));
        if scalar_matches(cell, current) {
            return;
        }
        changes.push(FieldChange {
            field: format!("author[{index}].affiliations.{sub}"),
            before: current.map(render_cell).unwrap_or_default(),
            after: cell.to_string(),
        });

        if !matches!(fields.get("affiliations"), Some(Value::Sequence(_))) {
            fields.insert(Value::from("affiliations"), Value::Sequence(Vec::new()));
        }
        let Some(Value::Sequence(list)) = fields.get_mut("affiliations") else {
            return;
        };
        // The entry the export read from, else the first mapping, else a new one
        let holder = list
            .iter()
            .position(|item| item.as_mapping().is_some_and(|aff| aff.contains_key(sub)))
            .or_else(|| list.iter().position(Value::is_mapping));
        let position = match holder {
            Some(position) => position,
            None => {
                list.push(Value::Mapping(Mapping::new()));
                list.len() - 1
            }
        };
        if let Some(Value::Mapping(affiliation)) = list.get_mut(position) {
            affiliation.insert(Value::from(sub), Value::String(cell.to_string()));
        }
        return;
    }

    let current = fields.get(key);
    let (unchanged, value) = match attr {
        AuthorAttr::Roles => (list_matches(cell, current), coerce_list(cell)),
        AuthorAttr::Corresponding => (scalar_matches(cell, current), coerce_scalar(cell)),
        _ => (scalar_matches(cell, current), Value::String(cell.to_string())),
    };
    if unchanged {
        return;
    }

    changes.push(FieldChange {
        field: format!("author[{index}].{key}"),
        before: current.map(render_cell).unwrap_or_default(),
        after: render_cell(&value),
    });
    fields.insert(Value::from(key), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn sheet_row(cells: &[(&str, &str)]) -> SheetRow {
        SheetRow::new(
            2,
            cells.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    fn apply(own_yaml: &str, cells: &[(&str, &str)]) -> (Mapping, Vec<FieldChange>) {
        let mut own = mapping(own_yaml);
        let effective = own.clone();
        let changes = apply_row(&mut own, &effective, &sheet_row(cells), &MetadataConfig::default());
        (own, changes)
    }

    #[test]
    fn test_year_cell_is_written_as_integer() {
        let (own, changes) = apply("title: T\n", &[("copyrightnotice", "2025.0")]);
        assert_eq!(changes.len(), 1);
        assert_eq!(own.get("copyrightnotice"), Some(&Value::Number(2025.into())));
        assert!(serde_yaml::to_string(&own).unwrap().contains("copyrightnotice: 2025\n"));
    }

    #[test]
    fn test_matching_cells_are_not_changes() {
        let (_, changes) = apply(
            "title: Pobreza\ndraft: false\ntags: [a, b]\ndate: 2024-01-15\n",
            &[
                ("title", "Pobreza"),
                ("draft", "FALSE"),
                ("tags", "a, b"),
                ("date", "01/15/2024"),
                ("abstract", ""),
            ],
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changed_cells_are_coerced() {
        let (own, changes) = apply(
            "title: T\ndraft: false\ntags: [a]\n",
            &[("draft", "true"), ("tags", "a, nuevo"), ("duedate", "03/01/2025"), ("numbered_lines", "TRUE")],
        );
        assert_eq!(changes.len(), 4);
        assert_eq!(own.get("draft"), Some(&Value::Bool(true)));
        assert_eq!(own.get("tags"), Some(&serde_yaml::from_str::<Value>("[a, nuevo]").unwrap()));
        assert_eq!(own.get("duedate").and_then(Value::as_str), Some("2025-03-01"));
        assert_eq!(own.get("numbered-lines"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_citation_boolean_becomes_mapping() {
        let (own, changes) = apply("citation: true\n", &[("citation_type", "article-journal")]);
        assert_eq!(changes[0].field, "citation.type");
        assert_eq!(
            own.get("citation"),
            Some(&serde_yaml::from_str::<Value>("{type: article-journal}").unwrap())
        );
    }

    #[test]
    fn test_links_json() {
        let (own, changes) = apply(
            "links:\n  - icon: github\n",
            &[("links_data", r#"[{"icon":"github"}]"#), ("links_enabled", "FALSE")],
        );
        assert!(changes.is_empty());
        assert!(own.contains_key("links"));

        let (own, changes) = apply("title: T\n", &[("links_data", r#"[{"icon": "x", "href": "https://x"}]"#)]);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            own.get("links"),
            Some(&serde_yaml::from_str::<Value>("[{icon: x, href: 'https://x'}]").unwrap())
        );

        let (_, changes) = apply("title: T\n", &[("links_data", "not json")]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_doc_type_written_where_it_lives() {
        let (own, _) = apply("documentmode: man\n", &[("tipo_documento", "jou")]);
        assert_eq!(own.get("documentmode").and_then(Value::as_str), Some("jou"));

        let (own, changes) = apply(
            "format:\n  apaquarto-pdf:\n    documentmode: man\n",
            &[("tipo_documento", "stu")],
        );
        assert_eq!(changes[0].field, "format.apaquarto-pdf.documentmode");
        assert!(!own.contains_key("documentmode"));
        assert_eq!(
            super::super::schema::nested_type(&own).and_then(Value::as_str),
            Some("stu")
        );

        let (own, changes) = apply("title: T\n", &[("tipo_documento", "jou")]);
        assert_eq!(changes.len(), 1);
        assert_eq!(own.get("documentmode").and_then(Value::as_str), Some("jou"));
    }

    #[test]
    fn test_default_type_is_not_created() {
        let (own, changes) = apply("course: Econ\n", &[("tipo_documento", "doc")]);
        assert!(changes.is_empty());
        assert!(!own.contains_key("documentmode"));

        let (_, changes) = apply("title: T\n", &[("tipo_documento", "doc")]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_authors_need_own_list() {
        let mut own = mapping("title: T\n");
        let effective = mapping("title: T\nauthor:\n  - name: Inherited\n");
        let row = sheet_row(&[("author_1_name", "Someone Else")]);
        let changes = apply_row(&mut own, &effective, &row, &MetadataConfig::default());
        assert!(changes.is_empty());
        assert!(!own.contains_key("author"));
    }

    #[test]
    fn test_authors_merge_field_by_field() {
        let (own, changes) = apply(
            "author:\n  - name: Edison\n    email: old@x.pe\n    custom: kept\n",
            &[
                ("author_1_name", "Edison"),
                ("author_1_email", "new@x.pe"),
                ("author_1_corresponding", "TRUE"),
                ("author_1_affiliation_city", "Ayacucho"),
                ("author_1_roles", "writing, editing"),
                ("author_2_name", "Second"),
                ("author_2_orcid", "0000-0002-1825-0097"),
            ],
        );
        let expected: Value = serde_yaml::from_str(
            r#"
- name: Edison
  email: new@x.pe
  custom: kept
  corresponding: true
  affiliations:
    - city: Ayacucho
  role: [writing, editing]
- name: Second
  orcid: 0000-0002-1825-0097
"#,
        )
        .unwrap();
        assert_eq!(own.get("author"), Some(&expected));
        assert_eq!(changes.len(), 6);
    }

    #[test]
    fn test_affiliation_written_to_entry_holding_the_field() {
        let doc = "author:\n  - name: Edison\n    affiliations:\n      - ref: unsch\n      - name: Universidad Nacional\n        city: Huamanga\n";
        let (own, changes) = apply(
            doc,
            &[
                ("author_1_name", "Edison"),
                ("author_1_affiliation_name", "Universidad Nacional"),
                ("author_1_affiliation_city", "Ayacucho"),
                ("author_1_affiliation_country", "Peru"),
            ],
        );
        let expected: Value = serde_yaml::from_str(
            r#"
- name: Edison
  affiliations:
    - ref: unsch
      country: Peru
    - name: Universidad Nacional
      city: Ayacucho
"#,
        )
        .unwrap();
        assert_eq!(own.get("author"), Some(&expected));
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["author[1].affiliations.city", "author[1].affiliations.country"]
        );
    }

    #[test]
    fn test_string_author_is_upgraded_only_when_needed() {
        let (own, changes) = apply("author:\n  - Edison\n", &[("author_1_name", "Edison")]);
        assert!(changes.is_empty());
        assert_eq!(own.get("author"), Some(&serde_yaml::from_str::<Value>("[Edison]").unwrap()));

        let (own, _) = apply("author:\n  - Edison\n", &[("author_1_email", "e@x.pe")]);
        assert_eq!(
            own.get("author"),
            Some(&serde_yaml::from_str::<Value>("[{name: Edison, email: e@x.pe}]").unwrap())
        );
    }

    fn write_doc(base: &Path, rel: &str, content: &str) -> PathBuf {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_row_keeps_body_and_skips_unchanged() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let original = "---\ntitle: Old\n---\n\nBody with ---\n";
        let path = write_doc(base, "blog/2024-01-01-a/index.qmd", original);
        let rel = "blog/2024-01-01-a/index.qmd";
        let config = MetadataConfig::default();

        let same = import_row(base, rel, &sheet_row(&[("title", "Old")]), false, &config).unwrap();
        assert_eq!(same.outcome, Outcome::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        let dry = import_row(base, rel, &sheet_row(&[("title", "New")]), true, &config).unwrap();
        assert_eq!(dry.outcome, Outcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        import_row(base, rel, &sheet_row(&[("title", "New")]), false, &config).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "---\ntitle: New\n---\n\nBody with ---\n");
    }

    #[test]
    fn test_missing_document_is_error() {
        let temp = TempDir::new().unwrap();
        let err = import_row(
            temp.path(),
            "blog/2024-01-01-gone/index.qmd",
            &sheet_row(&[("title", "x")]),
            false,
            &MetadataConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::MissingDocument { .. }));
    }

    #[test]
    fn test_import_filters_and_summary() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        write_doc(base, "a/2024-01-01-x/index.qmd", "---\ntitle: A\n---\n");
        write_doc(base, "b/2024-01-01-y/index.qmd", "---\ntitle: B\n---\n");
        let sheet = base.join("sheet.csv");
        fs::write(
            &sheet,
            "ruta_archivo,blog_nombre,title\n\
             a/2024-01-01-x/index.qmd,a,A2\n\
             b/2024-01-01-y/index.qmd,b,B2\n\
             a/2024-01-01-missing/index.qmd,a,Z\n\
             ,a,ignored\n",
        )
        .unwrap();

        let options = ImportOptions {
            blog: Some("a".into()),
            ..Default::default()
        };
        let report = import_metadata(base, &sheet, &options, &MetadataConfig::default()).unwrap();
        assert_eq!(report.summary.updated, 1);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(
            fs::read_to_string(base.join("b/2024-01-01-y/index.qmd")).unwrap(),
            "---\ntitle: B\n---\n"
        );

        let options = ImportOptions {
            path_prefix: Some("b/".into()),
            dry_run: true,
            ..Default::default()
        };
        let report = import_metadata(base, &sheet, &options, &MetadataConfig::default()).unwrap();
        assert_eq!(report.summary.updated, 1);
        assert_eq!(report.rows[0].changes[0].to_string(), "title: B → B2");
    }
}
