use clap::Subcommand;
use ghsync_core::config::GhSyncConfig;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file (./gh_sync.toml unless --config is given)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the effective configuration, tokens redacted
    Show,
}

pub fn run(action: ConfigAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { force } => {
            let path = match &ctx.config_path {
                Some(p) => p.clone(),
                None => GhSyncConfig::local_config_path()?,
            };
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            GhSyncConfig::default().save_to(&path)?;
            println!("Wrote default configuration to {}", path.display());
            println!("Set github.org, gitlab.url and gitlab.group, then store tokens with `ghsync auth set`.");
            Ok(())
        }
        ConfigAction::Show => {
            let source = match &ctx.config_path {
                Some(p) => Some(p.clone()),
                None => GhSyncConfig::discover()?,
            };
            match source {
                Some(p) => println!("# loaded from {}", p.display()),
                None => println!("# no config file found, showing defaults"),
            }
            let toml_str = toml::to_string_pretty(&redacted(&ctx.config))?;
            println!("{toml_str}");
            Ok(())
        }
    }
}

fn redacted(config: &GhSyncConfig) -> GhSyncConfig {
    let mut shown = config.clone();
    let hide = |t: &mut Option<String>| {
        if t.is_some() {
            *t = Some("********".into());
        }
    };
    hide(&mut shown.github.token);
    hide(&mut shown.gitlab.token);
    shown
}
