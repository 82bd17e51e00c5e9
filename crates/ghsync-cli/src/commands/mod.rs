pub mod auth;
pub mod config;
pub mod import;
pub mod mirror;
pub mod repos;
pub mod status;
pub mod sync;
pub mod verify;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use ghsync_auth::{resolve_token, CredentialStore, KeyringStore};
use ghsync_core::config::GhSyncConfig;
use ghsync_core::models::service::Service;
use ghsync_host::{GitHubClient, GitLabClient, ReqwestTransport, Transport};

#[derive(Subcommand)]
pub enum Command {
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
    /// Store or remove API tokens in the OS keychain
    Auth {
        #[command(subcommand)]
        action: auth::AuthAction,
    },
    /// Check that both API tokens are accepted
    Verify,
    /// List the repositories of a GitHub owner
    Repos(repos::ReposArgs),
    /// Mirror every repository of a GitHub owner into a GitLab group
    Sync(sync::SyncArgs),
    /// Import a single GitHub repository into GitLab
    Import(import::ImportArgs),
    /// Show import and mirror state of a GitLab project
    Status(status::StatusArgs),
    /// Point a GitLab project's pull mirror at a source URL
    Mirror(mirror::MirrorArgs),
}

impl Command {
    /// `config init` must work before any config file exists.
    pub fn reads_config(&self) -> bool {
        !matches!(
            self,
            Command::Config {
                action: config::ConfigAction::Init { .. }
            }
        )
    }
}

/// Everything a subcommand needs besides its own arguments.
pub struct Context {
    pub config: GhSyncConfig,
    pub config_path: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    /// Progress bars only on an interactive terminal.
    pub fn show_progress(&self) -> bool {
        !self.quiet && console::Term::stderr().is_term()
    }

    fn transport(&self) -> anyhow::Result<Arc<dyn Transport>> {
        Ok(Arc::new(ReqwestTransport::new()?))
    }

    pub async fn github(&self) -> anyhow::Result<GitHubClient> {
        self.github_with(self.transport()?, &KeyringStore::new()).await
    }

    pub async fn gitlab(&self) -> anyhow::Result<GitLabClient> {
        self.gitlab_with(self.transport()?, &KeyringStore::new()).await
    }

    pub async fn github_with(
        &self,
        transport: Arc<dyn Transport>,
        store: &dyn CredentialStore,
    ) -> anyhow::Result<GitHubClient> {
        let settings = &self.config.github;
        let token = resolve_token(settings.token.as_deref(), store, Service::GitHub)?;
        let client = GitHubClient::connect(&settings.api_url, &token, transport)
            .await?
            .with_wiki_detection(settings.wiki_detection);
        Ok(client)
    }

    pub async fn gitlab_with(
        &self,
        transport: Arc<dyn Transport>,
        store: &dyn CredentialStore,
    ) -> anyhow::Result<GitLabClient> {
        let url = self.config.gitlab_url()?;
        let token = resolve_token(self.config.gitlab.token.as_deref(), store, Service::GitLab)?;
        Ok(GitLabClient::connect(url, &token, transport).await?)
    }
}

pub async fn run(cmd: Command, ctx: Context) -> anyhow::Result<()> {
    match cmd {
        Command::Config { action } => config::run(action, &ctx),
        Command::Auth { action } => auth::run(action),
        Command::Verify => verify::run(&ctx).await,
        Command::Repos(args) => repos::run(args, &ctx).await,
        Command::Sync(args) => sync::run(args, &ctx).await,
        Command::Import(args) => import::run(args, &ctx).await,
        Command::Status(args) => status::run(args, &ctx).await,
        Command::Mirror(args) => mirror::run(args, &ctx).await,
    }
}
