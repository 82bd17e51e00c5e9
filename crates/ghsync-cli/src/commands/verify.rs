use console::style;

use super::Context;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let github = ctx.github().await;
    report("GitHub", ctx.config.github.api_url.as_str(), &github);

    let gitlab = ctx.gitlab().await;
    let gitlab_url = ctx
        .config
        .gitlab
        .url
        .as_ref()
        .map(|u| u.as_str())
        .unwrap_or("(not configured)");
    report("GitLab", gitlab_url, &gitlab);

    if github.is_err() || gitlab.is_err() {
        anyhow::bail!("credential check failed");
    }
    Ok(())
}

fn report<T>(label: &str, url: &str, result: &anyhow::Result<T>) {
    match result {
        Ok(_) => println!("{} {label} ({url})", style("ok").green().bold()),
        Err(e) => println!("{} {label} ({url}): {e}", style("FAILED").red().bold()),
    }
}
