//! Helpers shared by the command implementations.
//!
//! This module provides:
//! - Target resolution for `--directory` / `--file` arguments
//! - Section headers and mode banners
//! - Batch summary printing

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::FolioConfig;
use crate::fs::walk::files_with_extension;
use crate::report::BatchSummary;

/// Resolve the files a command works on.
///
/// A `--file` wins over a directory; without either, the current directory is
/// scanned. Directory scans select files by the configured extension and
/// honour the configured exclusions.
pub fn resolve_targets(
    config: &FolioConfig,
    directory: Option<&Path>,
    file: Option<&Path>,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    if let Some(file) = file {
        if !file.is_file() {
            bail!("File not found: {}", file.display());
        }
        return Ok(vec![file.to_path_buf()]);
    }

    let dir = directory.unwrap_or_else(|| Path::new("."));
    if !dir.is_dir() {
        bail!("Directory not found: {}", dir.display());
    }
    let options = config.walk_options(recursive, &[]);
    let files = files_with_extension(dir, &config.document_extension, options);
    tracing::debug!(dir = %dir.display(), count = files.len(), "resolved targets");
    Ok(files)
}

/// Boxed title printed at the top of a command's output
pub fn print_header(title: &str) {
    let width = 38;
    println!();
    println!("{}", format!("╭{}╮", "─".repeat(width)).cyan());
    println!("{}", format!("│{title:^width$}│").cyan().bold());
    println!("{}", format!("╰{}╯", "─".repeat(width)).cyan());
    println!();
}

pub fn print_mode(dry_run: bool) {
    if dry_run {
        println!(
            "{} Running in {} mode - no changes will be made",
            "→".blue().bold(),
            "DRY-RUN".yellow().bold()
        );
        println!();
    }
}

pub fn print_section(title: &str) {
    println!("{}", title.bold());
    println!("{}", "─".repeat(40).dimmed());
}

/// Print the closing tally of a batch run
pub fn print_summary(summary: &BatchSummary, dry_run: bool) {
    let updated_label = if dry_run { "Would update:" } else { "Updated:    " };

    println!();
    print_section("Summary");
    println!("  Processed:   {}", summary.total().to_string().bold());
    println!("  {} {}", updated_label, summary.updated.to_string().green().bold());
    println!("  Unchanged:   {}", summary.unchanged.to_string().dimmed());
    if summary.skipped > 0 {
        println!("  Skipped:     {}", summary.skipped.to_string().yellow());
    }
    if summary.warnings > 0 {
        println!("  Warnings:    {}", summary.warnings.to_string().yellow().bold());
    }
    if summary.errors > 0 {
        println!("  Errors:      {}", summary.errors.to_string().red().bold());
    }
    println!();
}

/// Fail the command when any item failed
pub fn finish(summary: &BatchSummary) -> Result<()> {
    if summary.has_errors() {
        bail!("{} item(s) failed", summary.errors);
    }
    Ok(())
}

/// `path` relative to `base` when possible, for display
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

/// Truncate a string for display, collapsing it to one line first
pub fn truncate_for_display(s: &str, max_len: usize) -> String {
    let single_line: String = s.lines().collect::<Vec<_>>().join(" ");

    if single_line.chars().count() <= max_len {
        single_line
    } else {
        let truncated: String = single_line.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
