use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "
   ┌─┐┌─┐┬  ┬┌─┐
   ├┤ │ ││  ││ │
   └  └─┘┴─┘┴└─┘

{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Maintenance utilities for multi-blog markdown sites", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Config file (defaults to ./folio.yml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace identical copies of a shared file with hard links
    Hardlink {
        /// Exact file name to deduplicate (e.g. _contenido-final.qmd)
        file_name: String,

        /// Directory to search
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Additional directory names to skip
        #[arg(long, value_name = "NAME", num_args = 1..)]
        exclude: Vec<String>,

        /// Report what would be linked without touching files
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore the canonical layout of frontmatter blocks
    Repair {
        #[command(flatten)]
        target: TargetArgs,

        /// Report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Normalize, replace, remove and add frontmatter tags
    #[command(args_conflicts_with_subcommands = true)]
    Tags {
        #[command(subcommand)]
        command: Option<TagsCommands>,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        ops: TagOpsArgs,

        /// Report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Export and import article metadata through a CSV sheet
    Metadata {
        #[command(subcommand)]
        command: MetadataCommands,
    },
}

/// A single file, or the files of a directory
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Directory to process
    #[arg(short = 'd', long = "directory", value_name = "DIR", conflicts_with = "file")]
    pub directory: Option<PathBuf>,

    /// Single file to process
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(long)]
    pub recursive: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TagOpsArgs {
    /// Normalize every tag (lowercase, no accents, underscores)
    #[arg(short = 'n', long)]
    pub normalize: bool,

    /// Replace tags, as OLD:NEW
    #[arg(short = 'r', long, value_name = "OLD:NEW", num_args = 1..)]
    pub replace: Vec<String>,

    /// Tags to remove
    #[arg(long, value_name = "TAG", num_args = 1..)]
    pub remove: Vec<String>,

    /// Tags to add
    #[arg(short = 'a', long, value_name = "TAG", num_args = 1..)]
    pub add: Vec<String>,

    /// YAML file with replacements, removals and additions
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum TagsCommands {
    /// Count tag usage without modifying anything
    List {
        /// Directory to scan
        #[arg(short = 'd', long = "directory", value_name = "DIR")]
        directory: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
    },
}

#[derive(Subcommand)]
pub enum MetadataCommands {
    /// Write the metadata of every article to a CSV sheet
    Export {
        /// Directory holding the blogs
        base: PathBuf,

        /// Only export this blog
        #[arg(short, long)]
        blog: Option<String>,

        /// Output file (defaults to metadata.csv or metadata_<blog>.csv)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Append only articles missing from an existing sheet
        #[arg(long)]
        incremental: bool,

        /// Ignore _metadata.yml defaults
        #[arg(long)]
        no_inherit: bool,
    },

    /// Apply an edited CSV sheet back to the articles
    Import {
        /// Directory holding the blogs
        base: PathBuf,

        /// Edited sheet
        sheet: PathBuf,

        /// Only apply rows of this blog
        #[arg(short, long)]
        blog: Option<String>,

        /// Only apply rows whose path starts with this prefix
        #[arg(long, value_name = "PREFIX")]
        path: Option<String>,

        /// Report changes without writing
        #[arg(long)]
        dry_run: bool,

        /// Ignore _metadata.yml defaults when comparing
        #[arg(long)]
        no_inherit: bool,
    },
}
