use serde::{Deserialize, Serialize};

/// Pull-mirror relationship of a GitLab project. Reconciled, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub source_url: String,
    pub project_id: u64,
    pub enabled: bool,
}

impl MirrorConfig {
    /// True if this mirror already pulls from `source_url`.
    pub fn points_at(&self, source_url: &str) -> bool {
        self.enabled && normalize_mirror_url(&self.source_url) == normalize_mirror_url(source_url)
    }
}

/// Result of `set_pull_mirror`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorChange {
    /// A configuration write was issued.
    Configured,
    /// The mirror already pointed at the URL; nothing was written.
    Unchanged,
}

impl std::fmt::Display for MirrorChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorChange::Configured => write!(f, "configured"),
            MirrorChange::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Mirror sources always end in `.git`.
pub fn normalize_mirror_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(".git") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.git")
    }
}
