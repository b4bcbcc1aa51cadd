//! Frontmatter delimiter repair.
//!
//! Two malformations are fixed: a `---` delimiter glued to the end of the
//! preceding line (`draft: false---`) and a missing blank line between the
//! closing delimiter and the body. The canonical layout is:
//!
//! ```text
//! ---
//! <frontmatter>
//! ---
//!
//! <body>
//! ```
//!
//! Repairing already-canonical text returns it unchanged.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{FolioError, FolioResult};

static GLUED_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*[^\s-])---\s*$").expect("valid regex"));

static FRONTMATTER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*(.*)\z").expect("valid regex"));

/// Result of repairing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairStatus {
    /// The file was (or, in dry-run mode, would be) rewritten
    Fixed { body_preview: String },
    /// The file already had the canonical layout
    AlreadyCorrect,
    /// No frontmatter block could be located
    NoFrontmatter,
}

/// Return the canonical form of `content`, or `None` without a frontmatter block
pub fn repair_frontmatter(content: &str) -> Option<String> {
    let normalized = split_glued_closing(content)?;
    let captures = FRONTMATTER_BLOCK.captures(&normalized)?;

    let frontmatter = captures.get(1).map_or("", |m| m.as_str());
    let body = captures
        .get(2)
        .map_or("", |m| m.as_str())
        .trim_start_matches(['\n', '\r', '\t', ' ']);

    if body.is_empty() {
        Some(format!("---\n{frontmatter}\n---\n"))
    } else {
        Some(format!("---\n{frontmatter}\n---\n\n{body}"))
    }
}

/// Move a glued closing delimiter onto its own line
///
/// Only the header is inspected: scanning stops at the first line that closes
/// the block, so `---` sequences in the body are never touched.
fn split_glued_closing(content: &str) -> Option<String> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim() != "---" {
        return None;
    }

    let mut out = String::with_capacity(content.len() + 1);
    out.push_str(first);
    let mut consumed = first.len();

    for line in lines {
        consumed += line.len();
        let text = line.trim_end_matches(['\n', '\r']);

        if text.trim() == "---" {
            out.push_str(line);
            break;
        }
        if let Some(captures) = GLUED_DELIMITER.captures(text) {
            out.push_str(&captures[1]);
            out.push_str("\n---\n");
            break;
        }
        out.push_str(line);
    }

    out.push_str(&content[consumed..]);
    Some(out)
}

/// Repair one file in place (unless `dry_run`)
pub fn repair_file(path: &Path, dry_run: bool) -> FolioResult<RepairStatus> {
    let content = fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;

    let Some(repaired) = repair_frontmatter(&content) else {
        return Ok(RepairStatus::NoFrontmatter);
    };
    if repaired == content {
        return Ok(RepairStatus::AlreadyCorrect);
    }

    if !dry_run {
        fs::write(path, &repaired).map_err(|e| FolioError::io(path, e))?;
    }

    Ok(RepairStatus::Fixed {
        body_preview: body_preview(&repaired),
    })
}

fn body_preview(repaired: &str) -> String {
    let body = repaired
        .split_once("\n---\n")
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or_default();
    body.chars().take(60).collect::<String>().replace('\n', "\\n")
}
