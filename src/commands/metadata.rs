//! `folio metadata export|import`: spreadsheet round trip of article metadata.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{finish, print_header, print_mode, print_section, print_summary, truncate_for_display};
use crate::config::FolioConfig;
use crate::metadata::{export_metadata, import_metadata, ExportOptions, ImportOptions};
use crate::report::Outcome;

/// Widest change line printed by an import
const CHANGE_WIDTH: usize = 100;

fn check_base(base: &Path) -> Result<()> {
    if !base.is_dir() {
        bail!("Base directory not found: {}", base.display());
    }
    Ok(())
}

pub fn export(
    config: &FolioConfig,
    base: &Path,
    blog: Option<String>,
    output: Option<PathBuf>,
    incremental: bool,
    inherit: bool,
) -> Result<()> {
    check_base(base)?;
    let output = output.unwrap_or_else(|| config.export_path(blog.as_deref()));
    let options = ExportOptions {
        blog,
        output,
        incremental,
    };

    print_header("Folio Metadata Export");

    let report = export_metadata(base, &options, &config.metadata_config(inherit))
        .with_context(|| format!("Failed to export metadata to {}", options.output.display()))?;

    for err in &report.errors {
        println!("  {} {}", "✗".red().bold(), err);
    }

    if report.appended {
        println!(
            "{} Appended {} new row(s) to {} ({} already listed)",
            "✓".green().bold(),
            report.rows_written.to_string().bold(),
            report.output.display(),
            report.already_present
        );
    } else {
        println!(
            "{} Wrote {} row(s) to {}",
            "✓".green().bold(),
            report.rows_written.to_string().bold(),
            report.output.display()
        );
    }

    if !report.by_type.is_empty() {
        println!();
        print_section("By document type");
        for (label, count) in &report.by_type {
            println!("  {label:<5} {}", count.to_string().cyan());
        }
    }

    print_summary(&report.summary, false);
    finish(&report.summary)
}

pub fn import(
    config: &FolioConfig,
    base: &Path,
    sheet: &Path,
    blog: Option<String>,
    path_prefix: Option<String>,
    dry_run: bool,
    inherit: bool,
) -> Result<()> {
    check_base(base)?;
    if !sheet.is_file() {
        bail!("Sheet not found: {}", sheet.display());
    }
    let options = ImportOptions {
        blog,
        path_prefix,
        dry_run,
    };

    print_header("Folio Metadata Import");
    print_mode(dry_run);

    let report = import_metadata(base, sheet, &options, &config.metadata_config(inherit))
        .with_context(|| format!("Failed to import {}", sheet.display()))?;

    print_section("Documents");
    let mut shown = 0;
    for row in report.rows.iter().filter(|r| r.outcome == Outcome::Updated) {
        shown += 1;
        let verb = if dry_run { "would update" } else { "updated" };
        println!("  {} {} {}", "✓".green().bold(), row.relative, format!("({verb})").dimmed());
        for change in &row.changes {
            println!("    {}", truncate_for_display(&change.to_string(), CHANGE_WIDTH).dimmed());
        }
    }
    if shown == 0 {
        println!("  {} Every document already matches the sheet", "·".dimmed());
    }
    for err in &report.errors {
        println!("  {} {}", "✗".red().bold(), err);
    }

    print_summary(&report.summary, dry_run);
    finish(&report.summary)
}
