//! Tag maintenance for frontmatter `tags` lists.
//!
//! Every run normalizes tags; replacements, removals and additions are layered
//! on top in that order, and the result is deduplicated.

pub mod edit;
pub mod normalize;
pub mod profile;
pub mod usage;

pub use edit::{apply_plan, process_file, ConfirmAll, RemovalDecider, TagChanges, TagFileReport};
pub use normalize::{dedupe_tags, normalize_tag};
pub use profile::{parse_replacement, TagLimits, TagPlan, TagProfile};
pub use usage::{collect_usage, TagUsage};
