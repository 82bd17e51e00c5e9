use serde::{Deserialize, Serialize};

use crate::error::GhSyncError;

/// A GitLab group (namespace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestGroup {
    pub id: u64,
    pub name: String,
    pub path: String,
    /// Full namespace path, equal to `path` for top-level groups.
    #[serde(default)]
    pub full_path: Option<String>,
}

impl DestGroup {
    /// Namespace path to use when placing projects under this group.
    pub fn namespace_path(&self) -> &str {
        self.full_path.as_deref().unwrap_or(&self.path)
    }
}

/// A group given either by name or as an already resolved handle.
#[derive(Debug, Clone)]
pub enum GroupRef {
    ByName(String),
    Resolved(DestGroup),
}

impl GroupRef {
    /// The name used for lookups against the API.
    pub fn name(&self) -> &str {
        match self {
            GroupRef::ByName(name) => name,
            GroupRef::Resolved(group) => &group.name,
        }
    }

    /// Leading segment of a project path under this group.
    pub fn namespace(&self) -> &str {
        match self {
            GroupRef::ByName(name) => name,
            GroupRef::Resolved(group) => group.namespace_path(),
        }
    }
}

impl From<&str> for GroupRef {
    fn from(name: &str) -> Self {
        GroupRef::ByName(name.to_string())
    }
}

impl From<DestGroup> for GroupRef {
    fn from(group: DestGroup) -> Self {
        GroupRef::Resolved(group)
    }
}

/// A GitLab project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestProject {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
    pub web_url: String,
    #[serde(default)]
    pub wiki_enabled: bool,
}

impl DestProject {
    /// Landing page of the project wiki. Requesting it makes GitLab create
    /// the otherwise lazily provisioned wiki repository.
    pub fn wiki_url(&self) -> Option<String> {
        self.wiki_enabled
            .then(|| format!("{}/wikis/home", self.web_url.trim_end_matches('/')))
    }

    /// Repository path of the project wiki.
    pub fn wiki_path(&self) -> Option<String> {
        self.wiki_enabled
            .then(|| format!("{}.wiki.git", self.path_with_namespace))
    }
}

/// A project given either by `GROUP/PROJECT` path or as a resolved handle.
#[derive(Debug, Clone)]
pub enum ProjectRef {
    ByPath(String),
    Resolved(DestProject),
}

impl ProjectRef {
    /// Split a `GROUP/PROJECT` path. Exactly one separator is accepted.
    pub fn split_path(path: &str) -> Result<(&str, &str), GhSyncError> {
        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(project), None) if !group.is_empty() && !project.is_empty() => {
                Ok((group, project))
            }
            _ => Err(GhSyncError::InvalidProjectPath {
                path: path.to_string(),
            }),
        }
    }

    /// Human readable label for logs and errors.
    pub fn label(&self) -> &str {
        match self {
            ProjectRef::ByPath(path) => path,
            ProjectRef::Resolved(project) => &project.path_with_namespace,
        }
    }
}

impl From<&str> for ProjectRef {
    fn from(path: &str) -> Self {
        ProjectRef::ByPath(path.to_string())
    }
}

impl From<DestProject> for ProjectRef {
    fn from(project: DestProject) -> Self {
        ProjectRef::Resolved(project)
    }
}
