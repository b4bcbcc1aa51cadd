//! Tag pipeline and in-place rewriting of the `tags:` block.
//!
//! Only the lines that make up the `tags:` entry are regenerated. Every other
//! line of the frontmatter and the whole body are copied through unchanged.

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::normalize::{dedupe_tags, normalize_tag};
use super::profile::{TagLimits, TagPlan};
use crate::error::{FolioError, FolioResult};
use crate::parser::frontmatter::{self, FrontmatterError};
use crate::report::Outcome;

/// Keys after which a new `tags:` block is inserted, in order of preference
const INSERT_AFTER_KEYS: &[&str] = &["categories", "keywords", "abstract"];

/// Asks whether a tag may be removed from a document
pub trait RemovalDecider {
    fn confirm_removal(&mut self, path: &Path, tag: &str) -> bool;
}

/// Approves every removal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmAll;

impl RemovalDecider for ConfirmAll {
    fn confirm_removal(&mut self, _path: &Path, _tag: &str) -> bool {
        true
    }
}

impl<F> RemovalDecider for F
where
    F: FnMut(&Path, &str) -> bool,
{
    fn confirm_removal(&mut self, path: &Path, tag: &str) -> bool {
        self(path, tag)
    }
}

/// Everything the pipeline did to one tag list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    pub original: Vec<String>,
    pub tags: Vec<String>,
    pub replaced: Vec<(String, String)>,
    pub removed: Vec<String>,
    /// Removals the decider turned down
    pub declined: Vec<String>,
    pub added: Vec<String>,
    /// Additions that were already present
    pub skipped_additions: Vec<String>,
    pub duplicates_dropped: usize,
}

/// Run normalize, replace, remove, add and dedupe over `tags`
pub fn apply_plan(
    path: &Path,
    tags: &[String],
    plan: &TagPlan,
    decider: &mut dyn RemovalDecider,
) -> TagChanges {
    let mut changes = TagChanges {
        original: tags.to_vec(),
        ..Default::default()
    };

    let mut current: Vec<String> = tags
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .collect();

    for (old, new) in plan.normalized_replacements() {
        if current.contains(&old) {
            for tag in current.iter_mut().filter(|t| **t == old) {
                tag.clone_from(&new);
            }
            changes.replaced.push((old, new));
        }
    }

    let removals = dedupe_tags(plan.remove.iter().map(|t| normalize_tag(t)).collect());
    for target in removals {
        if !current.contains(&target) {
            continue;
        }
        if decider.confirm_removal(path, &target) {
            current.retain(|t| *t != target);
            changes.removed.push(target);
        } else {
            changes.declined.push(target);
        }
    }

    for addition in plan.add.iter().map(|t| normalize_tag(t)) {
        if addition.is_empty() {
            continue;
        }
        if current.contains(&addition) {
            changes.skipped_additions.push(addition);
        } else {
            current.push(addition.clone());
            changes.added.push(addition);
        }
    }

    let before = current.len();
    changes.tags = dedupe_tags(current);
    changes.duplicates_dropped = before - changes.tags.len();
    changes
}

/// Read the `tags` entry of a parsed frontmatter as a list of strings
pub fn tags_of(mapping: &serde_yaml::Mapping) -> Vec<String> {
    tags_from(mapping.get("tags"))
}

/// Strings held by a `tags` value: a list, or a single scalar
pub fn tags_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Problems worth reporting that never block a write
pub fn validate(tags: &[String], limits: TagLimits) -> Vec<String> {
    let mut warnings = Vec::new();
    for tag in tags {
        let length = tag.chars().count();
        if length > limits.max_tag_length {
            warnings.push(format!(
                "tag '{tag}' is {length} characters long (limit {})",
                limits.max_tag_length
            ));
        }
    }
    if tags.len() > limits.max_tags_per_file {
        warnings.push(format!(
            "{} tags exceed the per-document limit of {}",
            tags.len(),
            limits.max_tags_per_file
        ));
    }
    warnings
}

/// Report for one processed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// `None` when the document was skipped before the pipeline ran
    pub changes: Option<TagChanges>,
    pub warnings: Vec<String>,
}

/// Apply `plan` to one document, writing it back unless `dry_run`
///
/// # Errors
///
/// Fails when the file cannot be read or written, or when its frontmatter is
/// missing or not a YAML mapping.
pub fn process_file(
    path: &Path,
    plan: &TagPlan,
    limits: TagLimits,
    decider: &mut dyn RemovalDecider,
    dry_run: bool,
) -> FolioResult<TagFileReport> {
    let content = fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;
    let parts = frontmatter::split_document(&content).map_err(|e| FolioError::frontmatter(path, e))?;
    let mapping = frontmatter::parse_mapping(parts.yaml).map_err(|e| FolioError::frontmatter(path, e))?;

    let current = tags_of(&mapping);
    if current.is_empty() && plan.add.is_empty() {
        tracing::debug!(path = %path.display(), "no tags, skipping");
        return Ok(TagFileReport {
            path: path.to_path_buf(),
            outcome: Outcome::Skipped,
            changes: None,
            warnings: Vec::new(),
        });
    }

    let changes = apply_plan(path, &current, plan, decider);
    let warnings = validate(&changes.tags, limits);

    let updated = rewrite_document(&content, &changes.tags)
        .map_err(|e| FolioError::frontmatter(path, e))?;
    let outcome = if updated == content {
        Outcome::Unchanged
    } else {
        if !dry_run {
            fs::write(path, &updated).map_err(|e| FolioError::io(path, e))?;
        }
        Outcome::Updated
    };
    tracing::debug!(path = %path.display(), ?outcome, tags = ?changes.tags, "tags processed");

    Ok(TagFileReport {
        path: path.to_path_buf(),
        outcome,
        changes: Some(changes),
        warnings,
    })
}

/// Replace (or insert) the `tags:` block of `content`
pub fn rewrite_document(content: &str, tags: &[String]) -> Result<String, FrontmatterError> {
    let parts = frontmatter::split_document(content)?;
    // The yaml starts right after the opening delimiter line
    let yaml_start = content.split_inclusive('\n').next().map_or(0, str::len);
    let yaml_end = yaml_start + parts.yaml.len();

    let mut out = String::with_capacity(content.len() + 32);
    out.push_str(&content[..yaml_start]);
    out.push_str(&rewrite_tags_block(parts.yaml, tags));
    out.push_str(&content[yaml_end..]);
    Ok(out)
}

/// Rewrite the YAML text so its `tags` entry holds exactly `tags`
pub fn rewrite_tags_block(yaml: &str, tags: &[String]) -> String {
    let lines: Vec<&str> = yaml.split_inclusive('\n').collect();
    let block = render_block(tags);

    if let Some(start) = find_key(&lines, "tags") {
        let end = block_end(&lines, start);
        let mut out: String = lines[..start].concat();
        out.push_str(&block);
        out.push_str(&lines[end..].concat());
        return out;
    }

    let anchor = INSERT_AFTER_KEYS
        .iter()
        .find_map(|key| find_key(&lines, key))
        .map(|start| block_end(&lines, start));

    let mut out = match anchor {
        Some(end) => lines[..end].concat(),
        None => yaml.to_string(),
    };
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&block);
    if let Some(end) = anchor {
        out.push_str(&lines[end..].concat());
    }
    out
}

fn render_block(tags: &[String]) -> String {
    if tags.is_empty() {
        return "tags: []\n".to_string();
    }
    let mut block = String::from("tags:\n");
    for tag in tags {
        block.push_str("  - ");
        block.push_str(&yaml_scalar(tag));
        block.push('\n');
    }
    block
}

/// Quote tags YAML would otherwise read as numbers, booleans or null
fn yaml_scalar(tag: &str) -> String {
    match serde_yaml::from_str::<Value>(tag) {
        Ok(Value::String(s)) if s == tag => tag.to_string(),
        _ => format!("'{}'", tag.replace('\'', "''")),
    }
}

/// Index of the top-level line defining `key`
fn find_key(lines: &[&str], key: &str) -> Option<usize> {
    lines.iter().position(|line| {
        line.strip_prefix(key)
            .is_some_and(|rest| rest.trim_start_matches([' ', '\t']).starts_with(':'))
    })
}

/// One past the last line belonging to the entry that starts at `start`
///
/// Blank lines inside the entry (paragraph breaks of a block scalar, gaps
/// between list items) belong to it when the next non-blank line is still a
/// continuation. Trailing blank lines before the next key do not.
fn block_end(lines: &[&str], start: usize) -> usize {
    let mut end = start + 1;
    let mut cursor = end;
    while cursor < lines.len() {
        let line = lines[cursor];
        if is_blank(line) {
            cursor += 1;
            continue;
        }
        if !is_continuation(line) {
            break;
        }
        cursor += 1;
        end = cursor;
    }
    end
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_continuation(line: &str) -> bool {
    let text = line.trim_end_matches(['\n', '\r']);
    text.starts_with([' ', '\t']) || text == "-" || text.starts_with("- ")
}
