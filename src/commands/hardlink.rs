//! `folio hardlink`: link identical copies of a shared file to one source.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use super::common::{display_path, finish, print_header, print_mode, print_section, print_summary};
use crate::config::FolioConfig;
use crate::dedupe::{deduplicate, DedupeOptions, LinkOutcome};

pub fn execute(
    config: &FolioConfig,
    root: &Path,
    file_name: String,
    exclude: &[String],
    dry_run: bool,
) -> Result<()> {
    if !root.is_dir() {
        bail!("Directory not found: {}", root.display());
    }

    print_header("Folio Hardlink");
    print_mode(dry_run);

    let options = DedupeOptions {
        file_name,
        walk: config.walk_options(true, exclude),
        dry_run,
    };
    let report = deduplicate(root, &options)
        .with_context(|| format!("Failed to hash the first '{}'", options.file_name))?;

    let Some(source) = &report.source else {
        println!(
            "{} No file named {} under {}",
            "!".yellow().bold(),
            options.file_name.cyan(),
            root.display()
        );
        return Ok(());
    };

    println!(
        "{} Source: {} {}",
        "→".blue().bold(),
        display_path(&source.path, root),
        format!("(sha256 {})", &source.digest[..12.min(source.digest.len())]).dimmed()
    );
    println!();

    if report.candidates.is_empty() {
        println!("{} No other copies found", "✓".green().bold());
        return Ok(());
    }

    print_section("Copies");
    for candidate in &report.candidates {
        let shown = display_path(&candidate.path, root);
        match &candidate.outcome {
            LinkOutcome::Linked => println!("  {} {}", "✓".green().bold(), shown),
            LinkOutcome::WouldLink => println!("  {} {} {}", "→".blue(), shown, "(would link)".dimmed()),
            LinkOutcome::AlreadyLinked => {
                println!("  {} {} {}", "·".dimmed(), shown, "(already linked)".dimmed())
            }
            LinkOutcome::ContentConflict(_) => {
                println!("  {} {} {}", "!".yellow().bold(), shown, "(content differs)".yellow())
            }
            LinkOutcome::Failed(err) => println!("  {} {}: {}", "✗".red().bold(), shown, err),
        }
    }

    print_summary(&report.summary, dry_run);
    finish(&report.summary)
}
