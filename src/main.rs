use anyhow::Result;
use clap::Parser;
use folio::config::FolioConfig;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{dispatch, Cli};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "folio=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = FolioConfig::load(cli.config.as_deref())?;
    dispatch(cli.command, &config)
}
