//! Command implementations behind the `folio` binary.

pub mod common;
pub mod hardlink;
pub mod metadata;
pub mod repair;
pub mod tags;
