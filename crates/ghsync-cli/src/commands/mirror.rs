use clap::Args;
use console::style;
use ghsync_core::models::dest::ProjectRef;
use ghsync_core::models::mirror::MirrorChange;

use super::Context;

#[derive(Args)]
pub struct MirrorArgs {
    /// GitLab project as GROUP/PROJECT
    project: String,
    /// Repository URL the project should pull from
    source_url: String,
}

pub async fn run(args: MirrorArgs, ctx: &Context) -> anyhow::Result<()> {
    ProjectRef::split_path(&args.project)?;
    let gitlab = ctx.gitlab().await?;
    let change = gitlab
        .set_pull_mirror(&ProjectRef::from(args.project.as_str()), &args.source_url)
        .await?;

    match change {
        MirrorChange::Configured => println!(
            "{} {} now mirrors {}",
            style("configured").green().bold(),
            args.project,
            args.source_url
        ),
        MirrorChange::Unchanged => println!(
            "{} {} already mirrors {}",
            style("unchanged").dim(),
            args.project,
            args.source_url
        ),
    }
    Ok(())
}
