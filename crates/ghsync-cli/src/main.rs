mod commands;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use ghsync_core::config::GhSyncConfig;

#[derive(Parser)]
#[command(name = "ghsync", version, about = "Mirror GitHub repositories and wikis into GitLab")]
struct Cli {
    /// Config file to use instead of ./gh_sync.toml, ./gh_sync.conf or ~/.ghsyncrc
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if cli.command.reads_config() {
        GhSyncConfig::load(cli.config.as_deref())?
    } else {
        GhSyncConfig::default()
    };
    let log_dir = config.log_dir();
    logging::init(&log_dir, logging::level_for(cli.verbose, cli.quiet))?;
    tracing::debug!("logging to {}", log_dir.join(logging::LOG_FILE).display());

    let ctx = commands::Context {
        config,
        config_path: cli.config,
        quiet: cli.quiet,
    };
    commands::run(cli.command, ctx).await
}
