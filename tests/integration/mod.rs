//! Integration tests for folio's maintenance utilities
//!
//! These tests drive the library API against temporary content trees laid
//! out like a multi-blog site.

pub mod hardlink;
pub mod helpers;
pub mod metadata_round_trip;
pub mod repair_and_tags;
