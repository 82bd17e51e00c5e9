use clap::Args;
use comfy_table::{Cell, Color, Table};
use ghsync_core::models::source::{OwnerKind, SourceRepository};

use super::Context;

#[derive(Args)]
pub struct ReposArgs {
    /// GitHub user or organization (defaults to github.org)
    #[arg(long)]
    owner: Option<String>,
    /// Owner type: user or organization
    #[arg(long)]
    kind: Option<OwnerKind>,
}

pub async fn run(args: ReposArgs, ctx: &Context) -> anyhow::Result<()> {
    let owner = match args.owner {
        Some(o) => o,
        None => ctx.config.github_org()?.to_string(),
    };
    let kind = args.kind.unwrap_or(ctx.config.github.owner_kind);

    let github = ctx.github().await?;
    let repos = github.list_repositories(&owner, kind).await?;
    if repos.is_empty() {
        println!("{kind} {owner} has no repositories.");
        return Ok(());
    }

    println!("{}", table(&repos));
    let wikis = repos.iter().filter(|r| r.has_wiki).count();
    println!("{} repositories, {wikis} with a wiki", repos.len());
    Ok(())
}

fn table(repos: &[SourceRepository]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "REPOSITORY", "CLONE URL", "WIKI"]);
    for repo in repos {
        let wiki = if repo.has_wiki {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("—")
        };
        table.add_row(vec![
            Cell::new(repo.id.to_string()),
            Cell::new(&repo.full_name),
            Cell::new(&repo.clone_url),
            wiki,
        ]);
    }
    table
}
