use clap::Args;
use comfy_table::{Cell, Color, Table};
use console::style;
use ghsync_core::models::source::OwnerKind;
use ghsync_core::models::sync_state::{SyncReport, SyncStage};
use ghsync_sync::{SyncDriver, SyncOptions};

use super::Context;

#[derive(Args)]
pub struct SyncArgs {
    /// GitHub user or organization (defaults to github.org)
    #[arg(long)]
    owner: Option<String>,
    /// Owner type: user or organization
    #[arg(long)]
    kind: Option<OwnerKind>,
    /// Target GitLab group (defaults to gitlab.group)
    #[arg(long)]
    group: Option<String>,
    /// Do not wait for fresh imports to finish
    #[arg(long)]
    no_wait: bool,
    /// Do not configure pull mirrors
    #[arg(long)]
    no_mirror: bool,
    /// Stop at the first repository that fails
    #[arg(long)]
    fail_fast: bool,
}

impl SyncArgs {
    fn options(&self, ctx: &Context) -> SyncOptions {
        let mut options = SyncOptions::from(&ctx.config.sync);
        if self.no_wait {
            options.wait_for_import = false;
        }
        if self.no_mirror {
            options.configure_mirror = false;
        }
        if self.fail_fast {
            options.keep_going = false;
        }
        options.show_progress = ctx.show_progress();
        options
    }
}

pub async fn run(args: SyncArgs, ctx: &Context) -> anyhow::Result<()> {
    let owner = match &args.owner {
        Some(o) => o.clone(),
        None => ctx.config.github_org()?.to_string(),
    };
    let group = match &args.group {
        Some(g) => g.clone(),
        None => ctx.config.gitlab_group()?.to_string(),
    };
    let kind = args.kind.unwrap_or(ctx.config.github.owner_kind);

    let github = ctx.github().await?;
    let gitlab = ctx.gitlab().await?;

    println!("Syncing {kind} {owner} into GitLab group {group}...");
    let driver = SyncDriver::new(&github, &gitlab, args.options(ctx));
    let report = driver.sync_owner(&owner, kind, &group).await?;

    print_report(&report);
    if !report.is_success() {
        anyhow::bail!("{} of {} repositories failed", report.failed_count(), report.records.len());
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    let mut table = Table::new();
    table.set_header(vec!["REPOSITORY", "PROJECT", "STAGE", "IMPORT", "MIRROR"]);
    for record in &report.records {
        let (stage, color) = if record.failed() {
            ("failed".to_string(), Color::Red)
        } else {
            match record.stage {
                SyncStage::Mirrored => (record.stage.to_string(), Color::Green),
                SyncStage::Unsynced => (record.stage.to_string(), Color::Yellow),
                _ => (record.stage.to_string(), Color::White),
            }
        };
        table.add_row(vec![
            Cell::new(&record.repo_full_name),
            Cell::new(record.project_path.as_deref().unwrap_or("—")),
            Cell::new(stage).fg(color),
            Cell::new(
                record
                    .import_status
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "—".into()),
            ),
            Cell::new(
                record
                    .mirror
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "—".into()),
            ),
        ]);
    }
    println!("{table}");

    println!(
        "\nSync complete: {} mirrored | {} already present | {} failed | {} not attempted",
        style(report.mirrored_count()).green(),
        report.pre_existing_count(),
        style(report.failed_count()).red(),
        report.not_attempted.len()
    );

    for record in report.records.iter().filter(|r| r.failed()) {
        println!("\nErrors for {}:", style(&record.repo_full_name).bold());
        for err in &record.errors {
            println!("  {err}");
        }
    }
    if !report.not_attempted.is_empty() {
        println!("\nNot attempted: {}", report.not_attempted.join(", "));
    }
}
