use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Reasons a document's frontmatter block cannot be used
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("No frontmatter delimiter found at start of content")]
    MissingOpening,

    #[error("Frontmatter not properly closed with ---")]
    MissingClosing,

    #[error("Failed to parse YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Frontmatter is not a YAML mapping")]
    NotAMapping,
}

/// Borrowed view of a document split at its frontmatter delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentParts<'a> {
    /// Raw YAML between the delimiter lines, including its trailing newline
    pub yaml: &'a str,
    /// Everything after the closing delimiter line, byte-for-byte
    pub body: &'a str,
}

/// Split a document into its frontmatter YAML and body
///
/// Expects frontmatter delimited by `---` at the start and end:
///
/// ```text
/// ---
/// title: Hello
/// tags: [a, b]
/// ---
/// # Markdown content here
/// ```
///
/// The closing delimiter must sit at the same indentation as the opening one,
/// so an indented `---` inside a YAML block scalar does not end the block.
///
/// # Errors
///
/// Returns an error if the opening or closing delimiter is missing.
pub fn split_document(content: &str) -> Result<DocumentParts<'_>, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(FrontmatterError::MissingOpening)?;
    if first.trim() != "---" {
        return Err(FrontmatterError::MissingOpening);
    }
    let opening_indent = indent_of(first);

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim() == "---" && indent_of(line) == opening_indent {
            return Ok(DocumentParts {
                yaml: &content[yaml_start..offset],
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::MissingClosing)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Parse the frontmatter block into a `serde_yaml::Value`
///
/// Unlike [`parse_document`], any YAML shape is accepted.
pub fn extract_yaml_frontmatter(content: &str) -> Result<Value, FrontmatterError> {
    let parts = split_document(content)?;
    Ok(serde_yaml::from_str(parts.yaml)?)
}

/// Parse the frontmatter as a mapping and return it with the untouched body
///
/// An empty frontmatter block yields an empty mapping.
pub fn parse_document(content: &str) -> Result<(Mapping, &str), FrontmatterError> {
    let parts = split_document(content)?;
    let mapping = parse_mapping(parts.yaml)?;
    Ok((mapping, parts.body))
}

/// Parse a YAML text that must be a mapping (or empty)
pub fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Regenerate a document from a frontmatter mapping and a verbatim body
pub fn render_document(frontmatter: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = if frontmatter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(frontmatter)?
    };
    Ok(format!("---\n{yaml}---\n{body}"))
}

/// Merge `overrides` on top of `defaults`, key by key
///
/// Keys from `defaults` keep their order; keys only present in `overrides`
/// follow in their own order. Nested mappings are replaced, not merged.
pub fn merge_mappings(defaults: &Mapping, overrides: &Mapping) -> Mapping {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
