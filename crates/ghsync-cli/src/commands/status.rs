use clap::Args;
use comfy_table::{Cell, Color, Table};
use ghsync_core::models::dest::ProjectRef;
use ghsync_core::models::import::ImportStatus;

use super::Context;

#[derive(Args)]
pub struct StatusArgs {
    /// GitLab project as GROUP/PROJECT
    project: String,
}

pub async fn run(args: StatusArgs, ctx: &Context) -> anyhow::Result<()> {
    ProjectRef::split_path(&args.project)?;
    let gitlab = ctx.gitlab().await?;
    let project = gitlab
        .resolve_project(&ProjectRef::from(args.project.as_str()))
        .await?;

    let import = gitlab
        .import_status(&ProjectRef::Resolved(project.clone()))
        .await?;
    let mirror = gitlab.get_pull_mirror(&project).await?;

    let import_cell = match &import {
        Some(s @ (ImportStatus::Finished | ImportStatus::None)) => {
            Cell::new(s.to_string()).fg(Color::Green)
        }
        Some(ImportStatus::Failed) => Cell::new("failed").fg(Color::Red),
        Some(other) => Cell::new(other.to_string()).fg(Color::Yellow),
        None => Cell::new("unavailable"),
    };
    let mirror_cell = match &mirror {
        Some(m) if m.enabled => Cell::new(&m.source_url).fg(Color::Green),
        Some(m) => Cell::new(format!("{} (disabled)", m.source_url)).fg(Color::Yellow),
        None => Cell::new("not configured"),
    };

    let mut table = Table::new();
    table.set_header(vec!["PROJECT", "ID", "IMPORT", "PULL MIRROR", "WIKI"]);
    table.add_row(vec![
        Cell::new(&project.path_with_namespace),
        Cell::new(project.id.to_string()),
        import_cell,
        mirror_cell,
        Cell::new(project.wiki_path().unwrap_or_else(|| "disabled".into())),
    ]);
    println!("{table}");
    Ok(())
}
