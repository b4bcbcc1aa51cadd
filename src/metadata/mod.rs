//! Metadata round trip between content documents and a spreadsheet.
//!
//! `export` flattens each article's effective frontmatter into one row of a
//! CSV sheet. `import` reads an edited sheet back and rewrites only the
//! fields whose cells differ from what the document currently says.

pub mod discovery;
pub mod export;
pub mod import;
pub mod inherit;
pub mod schema;
pub mod sheet;
pub mod value;

use std::collections::BTreeSet;

use crate::fs::walk::WalkOptions;

pub use discovery::{discover_documents, DocumentEntry};
pub use export::{export_metadata, ExportOptions, ExportReport};
pub use import::{import_metadata, FieldChange, ImportOptions, ImportReport, RowReport};
pub use schema::DocType;

/// Index-style files that never describe an article
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "_contenido-inicio.qmd",
    "_contenido-final.qmd",
    "_contenido_posts.qmd",
    "_contenido_economia-preuniversitaria.qmd",
    "_contenido_inteligencia-comercial.qmd",
    "_contenido_talk.qmd",
    "_contenido_teching.qmd",
    "404.qmd",
    "contact.qmd",
    "accessibility.qmd",
    "license.qmd",
];

/// Settings shared by export and import
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// Blog directories to scan when no blog filter is given (empty = all)
    pub blogs: Vec<String>,
    pub walk: WalkOptions,
    /// File names that hold an article's frontmatter
    pub document_names: Vec<String>,
    pub excluded_files: BTreeSet<String>,
    pub default_doc_type: DocType,
    /// Merge the nearest `_metadata.yml` underneath each document
    pub inherit: bool,
    /// Only accept documents whose directory name starts with `YYYY-MM-DD`
    pub require_dated_dir: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            blogs: Vec::new(),
            walk: WalkOptions::default(),
            document_names: vec!["index.qmd".to_string()],
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            default_doc_type: DocType::Document,
            inherit: true,
            require_dated_dir: true,
        }
    }
}
