use std::time::Duration;

use clap::Args;
use console::style;
use ghsync_core::models::dest::{GroupRef, ProjectRef};
use ghsync_core::models::import::ImportOutcome;
use ghsync_core::models::source::{split_full_name, SourceRepoRef};
use ghsync_sync::{wait_for_import, PollSettings};
use indicatif::{ProgressBar, ProgressStyle};

use super::Context;

#[derive(Args)]
pub struct ImportArgs {
    /// GitHub repository as OWNER/NAME
    repo: String,
    /// Target GitLab group (defaults to gitlab.group)
    #[arg(long)]
    group: Option<String>,
    /// Wait for the import to finish
    #[arg(long)]
    wait: bool,
}

pub async fn run(args: ImportArgs, ctx: &Context) -> anyhow::Result<()> {
    split_full_name(&args.repo)?;
    let group = match &args.group {
        Some(g) => g.clone(),
        None => ctx.config.gitlab_group()?.to_string(),
    };

    let github = ctx.github().await?;
    let gitlab = ctx.gitlab().await?;

    let outcome = gitlab
        .import_from_source(
            &github,
            SourceRepoRef::from(args.repo.as_str()),
            &GroupRef::from(group.as_str()),
        )
        .await?;

    let project = match outcome {
        ImportOutcome::AlreadyExists(project) => {
            println!("{} already exists at {}", project.path_with_namespace, project.web_url);
            return Ok(());
        }
        ImportOutcome::Started(project) => project,
    };
    println!("Import started: {} -> {}", args.repo, project.web_url);
    if !args.wait {
        return Ok(());
    }

    let pb = if ctx.show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    } else {
        ProgressBar::hidden()
    };

    let poll = PollSettings::from(&ctx.config.sync);
    let result = wait_for_import(&gitlab, &ProjectRef::Resolved(project), &poll, &pb).await;
    pb.finish_and_clear();
    let status = result?;
    println!("Import {}", style(status).green().bold());
    Ok(())
}
