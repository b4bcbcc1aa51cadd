//! Filesystem helpers shared by the utilities.

pub mod digest;
pub mod walk;

pub use digest::{file_identity, sha256_file, FileIdentity};
pub use walk::{files_named, files_with_extension, TreeWalker, WalkOptions, DEFAULT_EXCLUDED_DIRS};
