//! Finding the article documents of one or more blogs.

use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use super::MetadataConfig;
use crate::fs::walk::TreeWalker;

static DATED_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid regex"));

/// An article document found under a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub path: PathBuf,
    /// Path relative to the base, `/`-separated; the row identity
    pub relative: String,
    pub blog: String,
    /// Creation time, or modification time where creation is not recorded
    pub created: SystemTime,
}

/// Blog directories to scan under `base`
///
/// An explicit `filter` wins; otherwise the configured blogs are used, and
/// with none configured every visible top-level directory is a blog.
pub fn blog_dirs(base: &Path, filter: Option<&str>, config: &MetadataConfig) -> Vec<PathBuf> {
    if let Some(blog) = filter {
        let dir = base.join(blog);
        if !dir.is_dir() {
            tracing::warn!(blog, "blog directory does not exist");
            return Vec::new();
        }
        return vec![dir];
    }

    if !config.blogs.is_empty() {
        return config
            .blogs
            .iter()
            .map(|blog| base.join(blog))
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    tracing::warn!(path = %dir.display(), "configured blog not found");
                }
                exists
            })
            .collect();
    }

    let Ok(entries) = fs::read_dir(base) else {
        tracing::warn!(path = %base.display(), "cannot list base directory");
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            !name.starts_with('.') && !config.walk.is_excluded(&name)
        })
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

/// Whether `path` is an article document under the configured rules
pub fn is_article(path: &Path, config: &MetadataConfig) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if !config.document_names.iter().any(|doc| *doc == name) || config.excluded_files.contains(&*name) {
        return false;
    }
    if !config.require_dated_dir {
        return true;
    }
    path.parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| DATED_DIR.is_match(&dir.to_string_lossy()))
}

/// Every article under the selected blogs, in traversal order
pub fn discover_documents(base: &Path, filter: Option<&str>, config: &MetadataConfig) -> Vec<DocumentEntry> {
    let mut found = Vec::new();

    for blog_dir in blog_dirs(base, filter, config) {
        let blog = blog_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::debug!(blog = %blog, "scanning blog");

        for path in TreeWalker::new(&blog_dir, config.walk.clone()) {
            if !is_article(&path, config) {
                continue;
            }
            found.push(DocumentEntry {
                relative: relative_path(base, &path),
                created: created_time(&path),
                blog: blog.clone(),
                path,
            });
        }
    }

    found
}

/// `/`-joined path of `path` relative to `base`
pub fn relative_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn created_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.created().or_else(|_| m.modified()))
        .unwrap_or(UNIX_EPOCH)
}
