use serde::{Deserialize, Serialize};

use crate::error::GhSyncError;

/// Whether a GitHub namespace is a user account or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    User,
    Organization,
}

impl OwnerKind {
    /// Path segment used by the GitHub REST API for this kind of owner.
    pub fn api_segment(&self) -> &'static str {
        match self {
            OwnerKind::User => "users",
            OwnerKind::Organization => "orgs",
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKind::User => write!(f, "user"),
            OwnerKind::Organization => write!(f, "organization"),
        }
    }
}

impl std::str::FromStr for OwnerKind {
    type Err = GhSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "users" => Ok(OwnerKind::User),
            "organization" | "org" | "orgs" => Ok(OwnerKind::Organization),
            other => Err(GhSyncError::InvalidOwnerKind(other.to_string())),
        }
    }
}

/// Rule used to decide whether a listed repository has a wiki worth syncing.
///
/// The listing payload carries both `has_wiki` and `has_pages`. Historically
/// both had to be set; `Wiki` looks at `has_wiki` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiDetection {
    Wiki,
    #[default]
    WikiAndPages,
}

impl WikiDetection {
    pub fn has_wiki(&self, has_wiki: bool, has_pages: bool) -> bool {
        match self {
            WikiDetection::Wiki => has_wiki,
            WikiDetection::WikiAndPages => has_wiki && has_pages,
        }
    }
}

/// A repository as listed by GitHub. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub clone_url: String,
    pub ssh_url: String,
    pub has_wiki: bool,
    pub wiki_url: Option<String>,
    pub wiki_ssh_url: Option<String>,
}

impl SourceRepository {
    pub fn new(
        id: u64,
        name: String,
        full_name: String,
        clone_url: String,
        ssh_url: String,
        has_wiki: bool,
    ) -> Self {
        let (wiki_url, wiki_ssh_url) = if has_wiki {
            (Some(wiki_clone_url(&clone_url)), Some(wiki_clone_url(&ssh_url)))
        } else {
            (None, None)
        };
        Self {
            id,
            name,
            full_name,
            clone_url,
            ssh_url,
            has_wiki,
            wiki_url,
            wiki_ssh_url,
        }
    }
}

/// GitHub serves a repository's wiki at the clone URL with `.git`
/// swapped for `.wiki.git`. This says nothing about whether the wiki has pages.
pub fn wiki_clone_url(clone_url: &str) -> String {
    match clone_url.strip_suffix(".git") {
        Some(base) => format!("{base}.wiki.git"),
        None => clone_url.to_string(),
    }
}

/// Split an `OWNER/REPO` name into its two parts.
pub fn split_full_name(full_name: &str) -> Result<(&str, &str), GhSyncError> {
    match full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(GhSyncError::InvalidRepoName {
            name: full_name.to_string(),
        }),
    }
}

/// A source repository given either by `OWNER/REPO` name or already resolved.
#[derive(Debug, Clone)]
pub enum SourceRepoRef {
    ByName(String),
    Resolved(SourceRepository),
}

impl From<&str> for SourceRepoRef {
    fn from(name: &str) -> Self {
        SourceRepoRef::ByName(name.to_string())
    }
}

impl From<SourceRepository> for SourceRepoRef {
    fn from(repo: SourceRepository) -> Self {
        SourceRepoRef::Resolved(repo)
    }
}
