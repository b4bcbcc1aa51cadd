use anyhow::Result;
use folio::commands::{hardlink, metadata, repair, tags};
use folio::config::FolioConfig;

use super::types::{Commands, MetadataCommands, TagsCommands};

pub fn dispatch(command: Commands, config: &FolioConfig) -> Result<()> {
    match command {
        Commands::Hardlink {
            file_name,
            root,
            exclude,
            dry_run,
        } => hardlink::execute(config, &root, file_name, &exclude, dry_run),
        Commands::Repair { target, dry_run } => repair::execute(
            config,
            target.directory.as_deref(),
            target.file.as_deref(),
            target.recursive,
            dry_run,
        ),
        Commands::Tags {
            command,
            target,
            ops,
            dry_run,
        } => match command {
            Some(TagsCommands::List {
                directory,
                recursive,
            }) => tags::list(config, directory.as_deref(), recursive),
            None => tags::execute(
                config,
                tags::TagTarget {
                    directory: target.directory,
                    file: target.file,
                    recursive: target.recursive,
                },
                tags::TagArgs {
                    normalize: ops.normalize,
                    replace: ops.replace,
                    remove: ops.remove,
                    add: ops.add,
                    profile: ops.profile,
                },
                dry_run,
            ),
        },
        Commands::Metadata { command } => match command {
            MetadataCommands::Export {
                base,
                blog,
                output,
                incremental,
                no_inherit,
            } => metadata::export(config, &base, blog, output, incremental, !no_inherit),
            MetadataCommands::Import {
                base,
                sheet,
                blog,
                path,
                dry_run,
                no_inherit,
            } => metadata::import(config, &base, &sheet, blog, path, dry_run, !no_inherit),
        },
    }
}
