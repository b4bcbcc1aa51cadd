//! Item-level failures shared by every utility.
//!
//! A `FolioError` always describes a single file or spreadsheet row. Batch
//! drivers record it in the summary and move on to the next item.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parser::frontmatter::FrontmatterError;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid frontmatter in {}: {source}", path.display())]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error(
        "content of {} differs from {}, refusing to link",
        candidate.display(),
        source_path.display()
    )]
    ContentConflict {
        candidate: PathBuf,
        source_path: PathBuf,
    },

    #[error("document not found: {}", path.display())]
    MissingDocument { path: PathBuf },

    #[error("cannot read spreadsheet {}: {source}", path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid spreadsheet {}: {reason}", path.display())]
    InvalidSheet { path: PathBuf, reason: String },

    #[error("cannot serialize frontmatter for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl FolioError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        FolioError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn frontmatter(path: &Path, source: FrontmatterError) -> Self {
        FolioError::Frontmatter {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Warnings are reported but never counted as batch errors
    pub fn is_warning(&self) -> bool {
        matches!(self, FolioError::ContentConflict { .. })
    }
}

pub type FolioResult<T> = std::result::Result<T, FolioError>;
