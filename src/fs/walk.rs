//! Directory traversal with pruning.
//!
//! `TreeWalker` keeps an explicit stack of directories. Child directories are
//! checked against the exclusion list before they are pushed, so an excluded
//! subtree is never opened. Within a directory, files are yielded in name
//! order before any subdirectory is visited.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory names skipped by every walk unless the caller opts out
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "_extensions",
    "_freeze",
    "_partials",
    ".idea",
    ".github",
    ".obsidian",
    ".git",
    ".vscode",
    ".quarto",
    "_site",
    "site_libs",
    "node_modules",
    "__pycache__",
];

/// How a walk descends and what it prunes
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub recursive: bool,
    pub excluded_dirs: BTreeSet<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WalkOptions {
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Add more directory names to prune
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_dirs.contains(dir_name)
    }
}

/// Depth-first iterator over the regular files under a root directory
#[derive(Debug)]
pub struct TreeWalker {
    options: WalkOptions,
    dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Self {
        Self {
            options,
            dirs: vec![root.into()],
            files: VecDeque::new(),
        }
    }

    fn expand(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
                return;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_file() {
                files.push(path);
            } else if file_type.is_dir() && self.options.recursive {
                let name = entry.file_name();
                if self.options.is_excluded(&name.to_string_lossy()) {
                    tracing::debug!(path = %path.display(), "pruned excluded directory");
                    continue;
                }
                subdirs.push(path);
            }
        }

        files.sort();
        subdirs.sort();
        self.files.extend(files);
        // Reverse so the alphabetically first directory is popped first
        self.dirs.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for TreeWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if let Some(file) = self.files.pop_front() {
                return Some(file);
            }
            let dir = self.dirs.pop()?;
            self.expand(&dir);
        }
    }
}

/// Collect files under `root` whose extension matches `extension` (without dot)
pub fn files_with_extension(root: &Path, extension: &str, options: WalkOptions) -> Vec<PathBuf> {
    TreeWalker::new(root, options)
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect()
}

/// Collect files under `root` whose file name is exactly `file_name`
pub fn files_named(root: &Path, file_name: &str, options: WalkOptions) -> Vec<PathBuf> {
    TreeWalker::new(root, options)
        .filter(|path| path.file_name().is_some_and(|name| name == file_name))
        .collect()
}
