//! `folio.yml` loading and the per-command settings derived from it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fs::walk::WalkOptions;
use crate::metadata::{MetadataConfig, DocType, DEFAULT_EXCLUDED_FILES};
use crate::tags::TagProfile;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "folio.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Blog directories under a base (empty means every visible directory)
    pub blogs: Vec<String>,
    /// Extra directory names to prune, on top of the built-in list
    pub excluded_dirs: Vec<String>,
    pub output_dir: PathBuf,
    pub document_names: Vec<String>,
    /// Extension of the files visited by `repair` and `tags`
    pub document_extension: String,
    pub excluded_files: Vec<String>,
    pub default_doc_type: DocType,
    pub inherit_metadata: bool,
    pub require_dated_dir: bool,
    pub tags: TagProfile,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            blogs: Vec::new(),
            excluded_dirs: Vec::new(),
            output_dir: PathBuf::from("."),
            document_names: vec!["index.qmd".to_string()],
            document_extension: "qmd".to_string(),
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            default_doc_type: DocType::Document,
            inherit_metadata: true,
            require_dated_dir: true,
            tags: TagProfile::default(),
        }
    }
}

impl FolioConfig {
    /// Load the config named on the command line, else `./folio.yml`, else
    /// the defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::from_file(path)
            }
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse config YAML; an empty document yields the defaults
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Walk settings with the configured and extra exclusions applied
    pub fn walk_options(&self, recursive: bool, extra_excludes: &[String]) -> WalkOptions {
        WalkOptions::default()
            .recursive(recursive)
            .exclude(self.excluded_dirs.iter().cloned())
            .exclude(extra_excludes.iter().cloned())
    }

    pub fn metadata_config(&self, inherit: bool) -> MetadataConfig {
        MetadataConfig {
            blogs: self.blogs.clone(),
            walk: self.walk_options(true, &[]),
            document_names: self.document_names.clone(),
            excluded_files: self.excluded_files.iter().cloned().collect(),
            default_doc_type: self.default_doc_type.clone(),
            inherit: inherit && self.inherit_metadata,
            require_dated_dir: self.require_dated_dir,
        }
    }

    /// The tag profile in effect: a profile file replaces the config's `tags:`
    pub fn tag_profile(&self, profile: Option<&Path>) -> Result<TagProfile> {
        let Some(path) = profile else {
            return Ok(self.tags.clone());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tag profile: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(TagProfile::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse tag profile: {}", path.display()))
    }

    /// Default spreadsheet path for an export of `blog` (or every blog)
    pub fn export_path(&self, blog: Option<&str>) -> PathBuf {
        let name = match blog {
            Some(blog) => format!("metadata_{blog}.csv"),
            None => "metadata.csv".to_string(),
        };
        self.output_dir.join(name)
    }
}
