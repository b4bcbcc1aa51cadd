//! Spreadsheet column schema and document types.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;


pub const COL_PATH: &str = "ruta_archivo";
pub const COL_BLOG: &str = "blog_nombre";
pub const COL_TYPE: &str = "tipo_documento";

/// Identity columns, then the fields every document type shares
pub const COMMON_COLUMNS: &[&str] = &[
    COL_PATH,
    COL_BLOG,
    COL_TYPE,
    "title",
    "shorttitle",
    "subtitle",
    "date",
    "draft",
    "abstract",
    "description",
    "keywords",
    "tags",
    "categories",
    "image",
    "eval",
    "citation_type",
    "citation_author",
    "citation_pdf_url",
    "links_enabled",
    "links_data",
    "bibliography",
];

pub const AUTHOR_COLUMNS: &[&str] = &[
    "author_1_name",
    "author_1_corresponding",
    "author_1_orcid",
    "author_1_email",
    "author_1_affiliation_name",
    "author_1_affiliation_department",
    "author_1_affiliation_city",
    "author_1_affiliation_region",
    "author_1_affiliation_country",
    "author_1_roles",
    "author_2_name",
    "author_2_corresponding",
    "author_2_orcid",
    "author_2_email",
    "author_2_affiliation_name",
    "author_2_roles",
    "author_3_name",
    "author_3_orcid",
    "author_3_affiliation_name",
    "author_3_roles",
];

/// Union of every type-specific column, in sheet order
pub const SPECIFIC_COLUMNS: &[&str] = &[
    "course",
    "professor",
    "duedate",
    "note",
    "journal",
    "volume",
    "copyrightnotice",
    "copyrightext",
    "floatsintext",
    "numbered_lines",
    "meta_analysis",
    "mask",
];

/// Full header row of an exported sheet
pub fn all_columns() -> Vec<&'static str> {
    COMMON_COLUMNS
        .iter()
        .chain(AUTHOR_COLUMNS)
        .chain(SPECIFIC_COLUMNS)
        .copied()
        .collect()
}

/// APA document mode of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Student,
    Journal,
    Manuscript,
    #[default]
    Document,
    Other(String),
}

impl DocType {
    pub fn label(&self) -> &str {
        match self {
            DocType::Student => "stu",
            DocType::Journal => "jou",
            DocType::Manuscript => "man",
            DocType::Document => "doc",
            DocType::Other(label) => label,
        }
    }

    /// Columns that only apply to this type
    pub fn specific_columns(&self) -> &'static [&'static str] {
        match self {
            DocType::Student => &["course", "professor", "duedate", "note"],
            DocType::Journal => &["journal", "volume", "copyrightnotice", "copyrightext"],
            DocType::Manuscript => &["floatsintext", "numbered_lines", "meta_analysis", "mask"],
            DocType::Document => &["floatsintext", "numbered_lines"],
            DocType::Other(_) => &[],
        }
    }
}

impl From<&str> for DocType {
    fn from(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "stu" => DocType::Student,
            "jou" => DocType::Journal,
            "man" => DocType::Manuscript,
            "doc" => DocType::Document,
            other => DocType::Other(other.to_string()),
        }
    }
}

impl From<String> for DocType {
    fn from(label: String) -> Self {
        DocType::from(label.as_str())
    }
}

impl From<DocType> for String {
    fn from(doc_type: DocType) -> Self {
        doc_type.label().to_string()
    }
}

impl FromStr for DocType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DocType::from(s))
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const TYPE_KEY: &str = "documentmode";
pub const FORMAT_KEY: &str = "format";
pub const APA_FORMAT_KEY: &str = "apaquarto-pdf";

/// Infer the document type from a frontmatter mapping
///
/// Checks the direct `documentmode` key, then
/// `format.apaquarto-pdf.documentmode`, then type-indicating fields, and
/// finally falls back to `default`.
pub fn detect_doc_type(mapping: &Mapping, default: &DocType) -> DocType {
    if let Some(label) = mapping.get(TYPE_KEY).and_then(label_of) {
        return DocType::from(label.as_str());
    }
    if let Some(label) = nested_type(mapping).and_then(label_of) {
        return DocType::from(label.as_str());
    }

    let has = |key: &str| mapping.contains_key(key);
    if has("course") || has("professor") {
        DocType::Student
    } else if has("journal") && has("volume") {
        DocType::Journal
    } else if has("meta-analysis") {
        DocType::Manuscript
    } else {
        default.clone()
    }
}

/// `format.apaquarto-pdf.documentmode`, when present
pub fn nested_type(mapping: &Mapping) -> Option<&Value> {
    mapping.get(FORMAT_KEY)?
        .as_mapping()?
        .get(APA_FORMAT_KEY)?
        .as_mapping()?
        .get(TYPE_KEY)
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Author attribute a column refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorAttr {
    Name,
    Corresponding,
    Orcid,
    Email,
    Roles,
    /// Sub-field of the first mapping in `affiliations`
    Affiliation(&'static str),
}

impl AuthorAttr {
    /// Key inside the author mapping
    pub fn key(&self) -> &'static str {
        match self {
            AuthorAttr::Name => "name",
            AuthorAttr::Corresponding => "corresponding",
            AuthorAttr::Orcid => "orcid",
            AuthorAttr::Email => "email",
            AuthorAttr::Roles => "role",
            AuthorAttr::Affiliation(sub) => sub,
        }
    }
}

/// Where a column's value lives in the frontmatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Read-only identity column
    Identity,
    /// Document type column
    DocType,
    Scalar(&'static str),
    /// Comma-separated list of strings
    List(&'static str),
    /// Date string compared by calendar day
    Date(&'static str),
    /// Sub-field of the `citation` mapping
    Citation(&'static str),
    LinksEnabled,
    LinksData,
    /// 1-based author index
    Author(usize, AuthorAttr),
}

/// Resolve a column header to its frontmatter location
pub fn field_for(column: &str) -> Option<Field> {
    let field = match column {
        COL_PATH | COL_BLOG => Field::Identity,
        COL_TYPE => Field::DocType,
        "keywords" | "tags" | "categories" => Field::List(static_key(column)?),
        "date" => Field::Date("date"),
        "duedate" => Field::Date("duedate"),
        "citation_type" => Field::Citation("type"),
        "citation_author" => Field::Citation("author"),
        "citation_pdf_url" => Field::Citation("pdf-url"),
        "links_enabled" => Field::LinksEnabled,
        "links_data" => Field::LinksData,
        "numbered_lines" => Field::Scalar("numbered-lines"),
        "meta_analysis" => Field::Scalar("meta-analysis"),
        other if other.starts_with("author_") => author_field(other)?,
        other => Field::Scalar(static_key(other)?),
    };
    Some(field)
}

/// The schema's own `'static` spelling of a plain column name
fn static_key(column: &str) -> Option<&'static str> {
    COMMON_COLUMNS
        .iter()
        .chain(SPECIFIC_COLUMNS)
        .find(|c| **c == column)
        .copied()
}

fn author_field(column: &str) -> Option<Field> {
    let rest = column.strip_prefix("author_")?;
    let (index, attr) = rest.split_once('_')?;
    let index: usize = index.parse().ok().filter(|i| *i >= 1)?;

    let attr = match attr {
        "name" => AuthorAttr::Name,
        "corresponding" => AuthorAttr::Corresponding,
        "orcid" => AuthorAttr::Orcid,
        "email" => AuthorAttr::Email,
        "roles" => AuthorAttr::Roles,
        "affiliation_name" => AuthorAttr::Affiliation("name"),
        "affiliation_department" => AuthorAttr::Affiliation("department"),
        "affiliation_city" => AuthorAttr::Affiliation("city"),
        "affiliation_region" => AuthorAttr::Affiliation("region"),
        "affiliation_country" => AuthorAttr::Affiliation("country"),
        _ => return None,
    };
    Some(Field::Author(index, attr))
}
