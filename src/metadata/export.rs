//! Flattening article frontmatter into spreadsheet rows.

use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::discovery::{discover_documents, DocumentEntry};
use super::inherit::effective_mapping;
use super::schema::{all_columns, detect_doc_type, field_for, AuthorAttr, DocType, Field, COL_PATH};
use super::sheet::{append_rows, read_sheet, write_sheet};
use super::value::{render_cell, render_json};
use super::MetadataConfig;
use crate::error::{FolioError, FolioResult};
use crate::parser::frontmatter;
use crate::report::{BatchSummary, Outcome};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Restrict the export to one blog directory
    pub blog: Option<String>,
    pub output: PathBuf,
    /// Append only documents missing from an existing sheet
    pub incremental: bool,
}

/// One document projected onto the sheet columns
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub entry: DocumentEntry,
    pub doc_type: DocType,
    cells: BTreeMap<&'static str, String>,
}

impl ExportRow {
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map_or("", String::as_str)
    }

    /// Cells in the order of `headers`; unknown headers get empty cells
    pub fn cells_for<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.cell(h.as_ref()).to_string())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ExportReport {
    pub output: PathBuf,
    pub rows_written: usize,
    /// Rows skipped because the sheet already listed the document
    pub already_present: usize,
    /// True when rows were appended to an existing sheet
    pub appended: bool,
    /// Written rows per document type label
    pub by_type: BTreeMap<String, usize>,
    pub summary: BatchSummary,
    pub errors: Vec<FolioError>,
}

/// Project an effective frontmatter mapping onto every sheet column
pub fn build_row(entry: DocumentEntry, effective: &Mapping, config: &MetadataConfig) -> ExportRow {
    let doc_type = detect_doc_type(effective, &config.default_doc_type);
    let specific = doc_type.specific_columns();

    let mut cells = BTreeMap::new();
    for column in all_columns() {
        let Some(field) = field_for(column) else {
            continue;
        };
        if super::schema::SPECIFIC_COLUMNS.contains(&column) && !specific.contains(&column) {
            continue;
        }
        let text = match field {
            Field::Identity if column == COL_PATH => entry.relative.clone(),
            Field::Identity => entry.blog.clone(),
            Field::DocType => doc_type.label().to_string(),
            other => field_text(other, effective),
        };
        if !text.is_empty() {
            cells.insert(column, text);
        }
    }

    ExportRow {
        entry,
        doc_type,
        cells,
    }
}

/// Cell text for a non-identity field of `mapping`
pub fn field_text(field: Field, mapping: &Mapping) -> String {
    match field {
        Field::LinksEnabled => {
            let enabled = mapping.get("links").is_some_and(|v| !v.is_null());
            render_cell(&Value::Bool(enabled))
        }
        Field::LinksData => field_value(field, mapping).map(render_json).unwrap_or_default(),
        _ => field_value(field, mapping).map(render_cell).unwrap_or_default(),
    }
}

/// The stored value a field reads from, if any
pub fn field_value(field: Field, mapping: &Mapping) -> Option<&Value> {
    let value = match field {
        Field::Identity | Field::DocType | Field::LinksEnabled => return None,
        Field::Scalar(key) | Field::List(key) | Field::Date(key) => mapping.get(key)?,
        Field::Citation(sub) => mapping.get("citation")?.as_mapping()?.get(sub)?,
        Field::LinksData => mapping.get("links")?,
        Field::Author(index, attr) => author_value(mapping, index, attr)?,
    };
    (!value.is_null()).then_some(value)
}

fn author_value(mapping: &Mapping, index: usize, attr: AuthorAttr) -> Option<&Value> {
    let author = match mapping.get("author")? {
        Value::Sequence(authors) => authors.get(index.checked_sub(1)?)?,
        single if index == 1 => single,
        _ => return None,
    };

    match (author, attr) {
        (Value::String(_), AuthorAttr::Name) => Some(author),
        (Value::Mapping(fields), AuthorAttr::Affiliation(sub)) => affiliation_with(fields, sub)?.get(sub),
        (Value::Mapping(fields), attr) => fields.get(attr.key()),
        _ => None,
    }
}

/// First mapping entry of an author's `affiliations` list that holds `sub`
pub fn affiliation_with<'a>(author: &'a Mapping, sub: &str) -> Option<&'a Mapping> {
    author
        .get("affiliations")?
        .as_sequence()?
        .iter()
        .filter_map(Value::as_mapping)
        .find(|affiliation| affiliation.contains_key(sub))
}

/// Read and project every discovered article
///
/// Documents that cannot be read or parsed are returned as errors.
pub fn collect_rows(
    base: &Path,
    blog: Option<&str>,
    config: &MetadataConfig,
) -> (Vec<ExportRow>, Vec<FolioError>) {
    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for entry in discover_documents(base, blog, config) {
        let own = fs::read_to_string(&entry.path)
            .map_err(|e| FolioError::io(&entry.path, e))
            .and_then(|content| {
                frontmatter::parse_document(&content)
                    .map(|(mapping, _)| mapping)
                    .map_err(|e| FolioError::frontmatter(&entry.path, e))
            });
        let own = match own {
            Ok(own) => own,
            Err(e) => {
                tracing::warn!(error = %e, "skipping document");
                errors.push(e);
                continue;
            }
        };

        let effective = effective_mapping(&own, &entry.path, base, config.inherit);
        rows.push(build_row(entry, &effective, config));
    }

    rows.sort_by(|a, b| {
        a.entry
            .blog
            .cmp(&b.entry.blog)
            .then_with(|| a.doc_type.label().cmp(b.doc_type.label()))
            .then_with(|| b.entry.created.cmp(&a.entry.created))
    });
    (rows, errors)
}

/// Export metadata of the articles under `base` to a CSV sheet
///
/// # Errors
///
/// Fails when the sheet cannot be written, or in incremental mode when the
/// existing sheet cannot be read or lacks the path column.
pub fn export_metadata(
    base: &Path,
    options: &ExportOptions,
    config: &MetadataConfig,
) -> FolioResult<ExportReport> {
    let (rows, errors) = collect_rows(base, options.blog.as_deref(), config);

    let mut report = ExportReport {
        output: options.output.clone(),
        ..Default::default()
    };
    for error in &errors {
        report.summary.record_error(error);
    }
    report.errors = errors;

    let to_write: Vec<&ExportRow> = if options.incremental && options.output.exists() {
        let sheet = read_sheet(&options.output)?;
        if !sheet.headers.iter().any(|h| h == COL_PATH) {
            return Err(FolioError::InvalidSheet {
                path: options.output.clone(),
                reason: format!("no '{COL_PATH}' column"),
            });
        }
        let known: HashSet<&str> = sheet.rows.iter().filter_map(|r| r.get(COL_PATH)).collect();

        let (present, missing): (Vec<&ExportRow>, Vec<&ExportRow>) =
            rows.iter().partition(|row| known.contains(row.entry.relative.as_str()));
        report.already_present = present.len();
        report.appended = true;

        let cells: Vec<Vec<String>> = missing.iter().map(|row| row.cells_for(&sheet.headers)).collect();
        if !cells.is_empty() {
            append_rows(&options.output, &cells)?;
        }
        missing
    } else {
        let headers = all_columns();
        let cells: Vec<Vec<String>> = rows.iter().map(|row| row.cells_for(&headers)).collect();
        write_sheet(&options.output, &headers, &cells)?;
        rows.iter().collect()
    };

    for row in &to_write {
        *report.by_type.entry(row.doc_type.label().to_string()).or_default() += 1;
        report.summary.record(Outcome::Updated);
    }
    for _ in 0..report.already_present {
        report.summary.record(Outcome::Unchanged);
    }
    report.rows_written = to_write.len();

    tracing::info!(
        output = %options.output.display(),
        written = report.rows_written,
        skipped = report.already_present,
        "metadata export finished"
    );
    Ok(report)
}
