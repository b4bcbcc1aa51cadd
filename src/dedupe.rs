//! Hard-link deduplication of identically named, identically filled files.
//!
//! The first file with the target name found in traversal order becomes the
//! source. Every later match with the same SHA-256 digest is replaced by a hard
//! link to the source. Matches with different content are never touched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FolioError, FolioResult};
use crate::fs::digest::{file_identity, sha256_file, FileIdentity};
use crate::fs::walk::{files_named, WalkOptions};
use crate::report::{BatchSummary, Outcome};

#[derive(Debug, Clone)]
pub struct DedupeOptions {
    /// Exact file name to look for
    pub file_name: String,
    pub walk: WalkOptions,
    pub dry_run: bool,
}

/// The file every duplicate gets linked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub digest: String,
    pub identity: Option<FileIdentity>,
}

#[derive(Debug)]
pub enum LinkOutcome {
    /// Replaced by a hard link to the source
    Linked,
    /// Would be replaced (dry run)
    WouldLink,
    /// Already shares storage with the source
    AlreadyLinked,
    /// Left untouched because its content differs from the source
    ContentConflict(FolioError),
    /// Left untouched because of an I/O failure
    Failed(FolioError),
}

#[derive(Debug)]
pub struct Candidate {
    pub path: PathBuf,
    pub outcome: LinkOutcome,
}

#[derive(Debug, Default)]
pub struct DedupeReport {
    pub source: Option<SourceFile>,
    pub candidates: Vec<Candidate>,
    pub summary: BatchSummary,
}

impl DedupeReport {
    fn push(&mut self, path: PathBuf, outcome: LinkOutcome) {
        match &outcome {
            LinkOutcome::Linked | LinkOutcome::WouldLink => self.summary.record(Outcome::Updated),
            LinkOutcome::AlreadyLinked => self.summary.record(Outcome::Unchanged),
            LinkOutcome::ContentConflict(err) | LinkOutcome::Failed(err) => self.summary.record_error(err),
        }
        self.candidates.push(Candidate { path, outcome });
    }
}

/// Replace duplicates of `options.file_name` under `root` with hard links
///
/// # Errors
///
/// Fails only when the source file itself cannot be hashed or inspected.
/// Problems with individual candidates are recorded in the report.
pub fn deduplicate(root: &Path, options: &DedupeOptions) -> FolioResult<DedupeReport> {
    let mut report = DedupeReport::default();

    let matches = files_named(root, &options.file_name, options.walk.clone());

    let mut source: Option<SourceFile> = None;
    for path in matches {
        if source.is_none() {
            let loaded = load_source(&path)?;
            tracing::info!(path = %loaded.path.display(), digest = %loaded.digest, "selected link source");
            source = Some(loaded);
            continue;
        }
        let Some(src) = source.as_ref() else {
            continue;
        };

        let outcome = process_candidate(src, &path, options.dry_run);
        match &outcome {
            LinkOutcome::ContentConflict(_) => {
                tracing::warn!(path = %path.display(), "content differs from source, skipping")
            }
            LinkOutcome::Failed(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to link candidate")
            }
            other => tracing::debug!(path = %path.display(), outcome = ?other, "candidate processed"),
        }
        report.push(path, outcome);
    }

    report.source = source;
    Ok(report)
}

fn load_source(path: &Path) -> FolioResult<SourceFile> {
    let digest = sha256_file(path).map_err(|e| FolioError::io(path, e))?;
    let identity = file_identity(path).map_err(|e| FolioError::io(path, e))?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        digest,
        identity,
    })
}

fn process_candidate(source: &SourceFile, candidate: &Path, dry_run: bool) -> LinkOutcome {
    let identity = match file_identity(candidate) {
        Ok(identity) => identity,
        Err(e) => return LinkOutcome::Failed(FolioError::io(candidate, e)),
    };
    if identity.is_some() && identity == source.identity {
        return LinkOutcome::AlreadyLinked;
    }

    let digest = match sha256_file(candidate) {
        Ok(digest) => digest,
        Err(e) => return LinkOutcome::Failed(FolioError::io(candidate, e)),
    };
    if digest != source.digest {
        return LinkOutcome::ContentConflict(FolioError::ContentConflict {
            candidate: candidate.to_path_buf(),
            source_path: source.path.clone(),
        });
    }

    if dry_run {
        return LinkOutcome::WouldLink;
    }

    match replace_with_link(&source.path, candidate) {
        Ok(()) => LinkOutcome::Linked,
        Err(e) => LinkOutcome::Failed(FolioError::io(candidate, e)),
    }
}

/// Swap `candidate` for a hard link to `source`
///
/// The link is created under a temporary sibling name and renamed over the
/// candidate, so the candidate path always resolves to one of the two files.
fn replace_with_link(source: &Path, candidate: &Path) -> std::io::Result<()> {
    let name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let staging = candidate.with_file_name(format!(".{name}.folio-link"));

    if staging.exists() {
        fs::remove_file(&staging)?;
    }
    fs::hard_link(source, &staging)?;
    if let Err(e) = fs::rename(&staging, candidate) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}
