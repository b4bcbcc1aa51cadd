use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::edit::tags_from;
use crate::error::FolioError;
use crate::parser::frontmatter;

/// How often each stored tag appears across a set of documents
#[derive(Debug, Default)]
pub struct TagUsage {
    pub counts: BTreeMap<String, usize>,
    pub documents: usize,
    pub untagged: usize,
    pub errors: Vec<FolioError>,
}

impl TagUsage {
    /// Tags sorted by descending use, then by name
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.counts.iter().map(|(t, n)| (t.as_str(), *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked
    }

    /// Stored tags that normalization would change
    pub fn non_canonical(&self) -> Vec<&str> {
        self.counts
            .keys()
            .filter(|tag| super::normalize_tag(tag) != **tag)
            .map(String::as_str)
            .collect()
    }
}

/// Count tags as they are currently stored, without modifying anything
pub fn collect_usage(files: impl IntoIterator<Item = PathBuf>) -> TagUsage {
    let mut usage = TagUsage::default();

    for path in files {
        let parsed = fs::read_to_string(&path)
            .map_err(|e| FolioError::io(&path, e))
            .and_then(|content| {
                frontmatter::extract_yaml_frontmatter(&content).map_err(|e| FolioError::frontmatter(&path, e))
            });

        let yaml = match parsed {
            Ok(yaml) => yaml,
            Err(e) => {
                tracing::warn!(error = %e, "skipping document");
                usage.errors.push(e);
                continue;
            }
        };

        usage.documents += 1;
        let tags = tags_from(yaml.get("tags"));
        if tags.is_empty() {
            usage.untagged += 1;
        }
        for tag in tags {
            *usage.counts.entry(tag).or_default() += 1;
        }
    }

    usage
}
