use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};

use ghsync_core::config::SyncSettings;
use ghsync_core::error::GhSyncError;
use ghsync_core::models::dest::{GroupRef, ProjectRef};
use ghsync_core::models::import::ImportOutcome;
use ghsync_core::models::source::{OwnerKind, SourceRepoRef, SourceRepository};
use ghsync_core::models::sync_state::{RepoSyncRecord, SyncReport, SyncStage};
use ghsync_host::{GitHubClient, GitLabClient};

use crate::poll::{wait_for_import, PollSettings};

/// What a sync run does besides ensuring each project exists.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub wait_for_import: bool,
    pub poll: PollSettings,
    pub configure_mirror: bool,
    pub touch_wikis: bool,
    pub keep_going: bool,
    pub webhook_url: Option<String>,
    pub show_progress: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncSettings::default())
    }
}

impl From<&SyncSettings> for SyncOptions {
    fn from(s: &SyncSettings) -> Self {
        Self {
            wait_for_import: s.wait_for_import,
            poll: PollSettings::from(s),
            configure_mirror: s.configure_mirror,
            touch_wikis: s.touch_wikis,
            keep_going: s.keep_going,
            webhook_url: s.webhook_url.clone(),
            show_progress: false,
        }
    }
}

/// Mirrors a GitHub owner's repositories into a GitLab group, one
/// repository at a time in listing order.
pub struct SyncDriver<'a> {
    source: &'a GitHubClient,
    dest: &'a GitLabClient,
    options: SyncOptions,
}

impl<'a> SyncDriver<'a> {
    pub fn new(source: &'a GitHubClient, dest: &'a GitLabClient, options: SyncOptions) -> Self {
        Self {
            source,
            dest,
            options,
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template("{spinner:.green} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let pb = ProgressBar::new(len);
        pb.set_style(style);
        pb
    }

    /// List every repository of `owner` and sync each into `namespace`.
    ///
    /// Listing or namespace failures abort the run. Per-repository failures
    /// are recorded; without `keep_going` the run stops at the first one.
    pub async fn sync_owner(
        &self,
        owner: &str,
        kind: OwnerKind,
        namespace: &str,
    ) -> Result<SyncReport, GhSyncError> {
        let repos = self.source.list_repositories(owner, kind).await?;
        let group = GroupRef::Resolved(self.dest.create_group(namespace).await?);
        tracing::info!(
            "syncing {} repositories from {kind} {owner} into {namespace}",
            repos.len()
        );

        let pb = self.progress_bar(repos.len() as u64);
        let mut report = SyncReport::default();
        let mut remaining = repos.iter();

        for repo in remaining.by_ref() {
            pb.set_message(repo.full_name.clone());
            let record = self.sync_repo_with_progress(repo, &group, &pb).await;
            pb.inc(1);
            let failed = record.failed();
            report.records.push(record);
            if failed && !self.options.keep_going {
                tracing::warn!("stopping after failure on {}", repo.full_name);
                break;
            }
        }
        report.not_attempted = remaining.map(|r| r.full_name.clone()).collect();

        pb.finish_with_message(format!(
            "{} mirrored, {} failed",
            report.mirrored_count(),
            report.failed_count()
        ));
        Ok(report)
    }

    /// Sync a single repository into `group`. Errors end up in the record.
    pub async fn sync_repository(&self, repo: &SourceRepository, group: &GroupRef) -> RepoSyncRecord {
        self.sync_repo_with_progress(repo, group, &ProgressBar::hidden())
            .await
    }

    async fn sync_repo_with_progress(
        &self,
        repo: &SourceRepository,
        group: &GroupRef,
        pb: &ProgressBar,
    ) -> RepoSyncRecord {
        let mut record = RepoSyncRecord::new(repo.full_name.clone());
        record.started_at = Utc::now();

        if let Err(e) = self.sync_repository_inner(repo, group, pb, &mut record).await {
            tracing::warn!("{}: {e}", repo.full_name);
            record.errors.push(e.to_string());
        }

        record.finished_at = Utc::now();
        record
    }

    async fn sync_repository_inner(
        &self,
        repo: &SourceRepository,
        group: &GroupRef,
        pb: &ProgressBar,
        record: &mut RepoSyncRecord,
    ) -> Result<(), GhSyncError> {
        // 1. Find or import the project
        let outcome = self
            .dest
            .import_from_source(self.source, SourceRepoRef::Resolved(repo.clone()), group)
            .await?;
        let project = match outcome {
            ImportOutcome::AlreadyExists(project) => {
                record.stage = SyncStage::AlreadyExists;
                record.pre_existing = true;
                project
            }
            ImportOutcome::Started(project) => {
                record.stage = SyncStage::Imported;
                project
            }
        };
        record.project_path = Some(project.path_with_namespace.clone());
        let project_ref = ProjectRef::Resolved(project.clone());

        // 2. Wait for a fresh import to settle
        if record.stage == SyncStage::Imported && self.options.wait_for_import {
            let status = wait_for_import(self.dest, &project_ref, &self.options.poll, pb).await?;
            record.import_status = Some(status);
        }

        // 3. Continuous pull mirroring
        if self.options.configure_mirror {
            let change = self.dest.set_pull_mirror(&project_ref, &repo.clone_url).await?;
            record.mirror = Some(change);
            record.stage = SyncStage::Mirrored;
        }

        // 4. Wiki
        if self.options.touch_wikis && repo.has_wiki {
            self.dest.touch_project_wiki(&project).await?;
        }

        // 5. Webhook
        if let Some(hook) = &self.options.webhook_url {
            self.source.add_webhook(&repo.full_name, hook).await?;
        }

        tracing::info!("{} -> {} ({})", repo.full_name, project.path_with_namespace, record.stage);
        Ok(())
    }
}
