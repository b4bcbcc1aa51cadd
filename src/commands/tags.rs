//! `folio tags`: batch tag maintenance and usage listing.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{finish, print_header, print_mode, print_section, print_summary, resolve_targets};
use crate::config::FolioConfig;
use crate::report::{BatchSummary, Outcome};
use crate::tags::{collect_usage, parse_replacement, process_file, ConfirmAll, TagChanges, TagPlan};

/// Files selected on the command line
#[derive(Debug, Clone, Default)]
pub struct TagTarget {
    pub directory: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub recursive: bool,
}

/// Raw tag operations from the command line
#[derive(Debug, Clone, Default)]
pub struct TagArgs {
    pub normalize: bool,
    pub replace: Vec<String>,
    pub remove: Vec<String>,
    pub add: Vec<String>,
    pub profile: Option<PathBuf>,
}

/// Turn command-line operations into a plan; malformed replacements are
/// reported and dropped
pub fn plan_from_args(args: &TagArgs) -> TagPlan {
    let replacements = args
        .replace
        .iter()
        .filter_map(|item| match parse_replacement(item) {
            Ok(pair) => Some(pair),
            Err(message) => {
                tracing::warn!(item = %item, "ignoring replacement");
                eprintln!("{} {}", "!".yellow().bold(), message);
                None
            }
        })
        .collect();

    TagPlan {
        normalize: args.normalize,
        replacements,
        remove: args.remove.clone(),
        add: args.add.clone(),
    }
}

pub fn execute(config: &FolioConfig, target: TagTarget, args: TagArgs, dry_run: bool) -> Result<()> {
    let profile = config.tag_profile(args.profile.as_deref())?;
    let plan = profile.plan(plan_from_args(&args));
    if plan.is_empty() {
        bail!("No tag operation given. Use --normalize, --replace, --remove, --add or --profile");
    }
    let limits = profile.limits();

    let files = resolve_targets(config, target.directory.as_deref(), target.file.as_deref(), target.recursive)?;

    print_header("Folio Tag Manager");
    print_mode(dry_run);

    if files.is_empty() {
        println!("{} No .{} files found", "!".yellow().bold(), config.document_extension);
        return Ok(());
    }

    print_section("Files");
    let mut summary = BatchSummary::default();
    let mut decider = ConfirmAll;
    let mut limit_warnings = 0;
    for path in &files {
        match process_file(path, &plan, limits, &mut decider, dry_run) {
            Ok(report) => {
                summary.record(report.outcome);
                print_file(&report.path, report.outcome, report.changes.as_ref(), dry_run);
                for warning in &report.warnings {
                    limit_warnings += 1;
                    println!("    {} {}", "!".yellow().bold(), warning.yellow());
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "tag update failed");
                summary.record_error(&err);
                println!("  {} {}", "✗".red().bold(), err);
            }
        }
    }

    print_summary(&summary, dry_run);
    if limit_warnings > 0 {
        println!(
            "{} {} tag limit warning(s); see max_tag_length and max_tags_per_file",
            "!".yellow().bold(),
            limit_warnings
        );
        println!();
    }
    finish(&summary)
}

fn print_file(path: &Path, outcome: Outcome, changes: Option<&TagChanges>, dry_run: bool) {
    let shown = path.display();
    let Some(changes) = changes else {
        println!("  {} {} {}", "·".dimmed(), shown, "(no tags)".dimmed());
        return;
    };

    match outcome {
        Outcome::Updated => {
            let verb = if dry_run { "would update" } else { "updated" };
            println!("  {} {} {}", "✓".green().bold(), shown, format!("({verb})").dimmed());
        }
        Outcome::Unchanged => println!("  {} {} {}", "·".dimmed(), shown, "(unchanged)".dimmed()),
        Outcome::Skipped => println!("  {} {} {}", "·".dimmed(), shown, "(skipped)".dimmed()),
    }
    if outcome != Outcome::Updated {
        return;
    }

    for (old, new) in &changes.replaced {
        println!("    {} {} → {}", "replaced".dimmed(), old, new.cyan());
    }
    if !changes.removed.is_empty() {
        println!("    {} {}", "removed".dimmed(), changes.removed.join(", ").red());
    }
    if !changes.declined.is_empty() {
        println!("    {} {}", "kept".dimmed(), changes.declined.join(", "));
    }
    if !changes.added.is_empty() {
        println!("    {} {}", "added".dimmed(), changes.added.join(", ").green());
    }
    if !changes.skipped_additions.is_empty() {
        println!("    {} {}", "already present".dimmed(), changes.skipped_additions.join(", "));
    }
    println!("    {} [{}]", "tags".dimmed(), changes.tags.join(", "));
}

/// Print how often each tag is used under a directory
pub fn list(config: &FolioConfig, directory: Option<&Path>, recursive: bool) -> Result<()> {
    let files = resolve_targets(config, directory, None, recursive)?;
    let usage = collect_usage(files);

    print_header("Folio Tag Usage");
    println!(
        "{} {} documents, {} without tags",
        "→".blue().bold(),
        usage.documents.to_string().bold(),
        usage.untagged
    );
    println!();

    if usage.counts.is_empty() {
        println!("{} No tags found", "!".yellow().bold());
    } else {
        print_section("Tags");
        let width = usage.counts.keys().map(|t| t.chars().count()).max().unwrap_or(0);
        for (tag, count) in usage.ranked() {
            println!("  {tag:<width$}  {}", count.to_string().cyan());
        }
    }

    let non_canonical = usage.non_canonical();
    if !non_canonical.is_empty() {
        println!();
        print_section("Not normalized");
        for tag in non_canonical {
            println!("  {} {}", "!".yellow().bold(), tag);
        }
    }

    for err in &usage.errors {
        println!("  {} {}", "✗".red().bold(), err);
    }
    println!();
    Ok(())
}
