//! `folio repair`: restore the canonical frontmatter layout.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::common::{finish, print_header, print_mode, print_section, print_summary, resolve_targets};
use crate::config::FolioConfig;
use crate::repair::{repair_file, RepairStatus};
use crate::report::{BatchSummary, Outcome};

pub fn execute(
    config: &FolioConfig,
    directory: Option<&Path>,
    file: Option<&Path>,
    recursive: bool,
    dry_run: bool,
) -> Result<()> {
    let files = resolve_targets(config, directory, file, recursive)?;

    print_header("Folio Frontmatter Repair");
    print_mode(dry_run);

    if files.is_empty() {
        println!("{} No .{} files found", "!".yellow().bold(), config.document_extension);
        return Ok(());
    }

    print_section("Files");
    let mut summary = BatchSummary::default();
    for path in &files {
        let shown = path.display();
        match repair_file(path, dry_run) {
            Ok(RepairStatus::Fixed { body_preview }) => {
                summary.record(Outcome::Updated);
                let verb = if dry_run { "would fix" } else { "fixed" };
                println!("  {} {} {}", "✓".green().bold(), shown, format!("({verb})").dimmed());
                if !body_preview.is_empty() {
                    println!("    {} {}", "body:".dimmed(), body_preview.dimmed());
                }
            }
            Ok(RepairStatus::AlreadyCorrect) => {
                summary.record(Outcome::Unchanged);
                println!("  {} {} {}", "·".dimmed(), shown, "(ok)".dimmed());
            }
            Ok(RepairStatus::NoFrontmatter) => {
                summary.record(Outcome::Skipped);
                println!("  {} {} {}", "!".yellow().bold(), shown, "(no frontmatter)".yellow());
            }
            Err(err) => {
                tracing::error!(error = %err, "repair failed");
                summary.record_error(&err);
                println!("  {} {}", "✗".red().bold(), err);
            }
        }
    }

    print_summary(&summary, dry_run);
    finish(&summary)
}
