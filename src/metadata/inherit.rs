use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::frontmatter::{merge_mappings, parse_mapping};

pub const INHERITED_FILE: &str = "_metadata.yml";

/// Nearest `_metadata.yml` from `dir` upward, stopping at `root`
pub fn find_inherited(dir: &Path, root: &Path) -> Option<PathBuf> {
    for ancestor in dir.ancestors() {
        let candidate = ancestor.join(INHERITED_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if ancestor == root || !ancestor.starts_with(root) {
            break;
        }
    }
    None
}

/// Defaults inherited by the document at `document`, empty when none apply
///
/// A malformed metadata file is reported and treated as absent.
pub fn inherited_defaults(document: &Path, root: &Path) -> Mapping {
    let Some(dir) = document.parent() else {
        return Mapping::new();
    };
    let Some(path) = find_inherited(dir, root) else {
        return Mapping::new();
    };

    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| parse_mapping(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(mapping) => {
            tracing::debug!(path = %path.display(), "using inherited metadata");
            mapping
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "ignoring unreadable metadata file");
            Mapping::new()
        }
    }
}

/// The document's own fields on top of its inherited defaults
pub fn effective_mapping(own: &Mapping, document: &Path, root: &Path, inherit: bool) -> Mapping {
    if !inherit {
        return own.clone();
    }
    merge_mappings(&inherited_defaults(document, root), own)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_nearest_file_wins() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "blog/_metadata.yml", "author: Blog\n");
        write(root, "blog/posts/_metadata.yml", "author: Posts\n");
        let doc = write(root, "blog/posts/2024-01-01-a/index.qmd", "");

        let found = find_inherited(doc.parent().unwrap(), root).unwrap();
        assert_eq!(found, root.join("blog/posts/_metadata.yml"));
    }

    #[test]
    fn test_search_stops_at_root() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path();
        write(outer, "_metadata.yml", "author: Outside\n");
        let root = outer.join("base");
        let doc = write(&root, "blog/2024-01-01-a/index.qmd", "");

        assert!(find_inherited(doc.parent().unwrap(), &root).is_none());
    }

    #[test]
    fn test_document_fields_override_defaults() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "blog/_metadata.yml", "author: Blog\nlicense: CC BY\n");
        let doc = write(root, "blog/2024-01-01-a/index.qmd", "");

        let own: Mapping = serde_yaml::from_str("title: T\nauthor: Me\n").unwrap();
        let merged = effective_mapping(&own, &doc, root, true);
        assert_eq!(merged.get("author").and_then(|v| v.as_str()), Some("Me"));
        assert_eq!(merged.get("license").and_then(|v| v.as_str()), Some("CC BY"));

        let plain = effective_mapping(&own, &doc, root, false);
        assert!(plain.get("license").is_none());
    }

    #[test]
    fn test_malformed_metadata_is_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "blog/_metadata.yml", "- not\n- a mapping\n");
        let doc = write(root, "blog/2024-01-01-a/index.qmd", "");

        assert!(inherited_defaults(&doc, root).is_empty());
    }
}
