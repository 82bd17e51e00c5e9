use std::time::Duration;

use indicatif::ProgressBar;

use ghsync_core::config::SyncSettings;
use ghsync_core::error::GhSyncError;
use ghsync_core::models::dest::ProjectRef;
use ghsync_core::models::import::ImportStatus;
use ghsync_host::GitLabClient;

/// How often and how long to poll an import.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

impl From<&SyncSettings> for PollSettings {
    fn from(s: &SyncSettings) -> Self {
        Self {
            interval: s.poll_interval(),
            max_attempts: s.max_poll_attempts.max(1),
        }
    }
}

/// Poll the import status of `project` until GitLab reports a terminal
/// state.
///
/// A status that could not be fetched counts as "still running". `failed`
/// is raised as [`GhSyncError::ImportFailed`]; running out of attempts as
/// [`GhSyncError::ImportTimedOut`]. The status is checked at least once.
pub async fn wait_for_import(
    dest: &GitLabClient,
    project: &ProjectRef,
    poll: &PollSettings,
    progress: &ProgressBar,
) -> Result<ImportStatus, GhSyncError> {
    let max_attempts = poll.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        let status = dest.import_status(project).await?;
        match status {
            Some(ImportStatus::Failed) => {
                return Err(GhSyncError::ImportFailed {
                    project: project.label().to_string(),
                    status: ImportStatus::Failed.to_string(),
                })
            }
            Some(s) if s.is_terminal() => {
                tracing::info!("import of {} is {s}", project.label());
                return Ok(s);
            }
            Some(s) => {
                progress.set_message(format!("{}: import {s}", project.label()));
                tracing::debug!("import of {} is {s} (check {attempt})", project.label());
            }
            None => {
                progress.set_message(format!("{}: import status unknown", project.label()));
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(poll.interval).await;
        }
    }

    Err(GhSyncError::ImportTimedOut {
        project: project.label().to_string(),
        attempts: max_attempts,
    })
}
