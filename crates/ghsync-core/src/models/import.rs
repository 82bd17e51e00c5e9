use serde::{Deserialize, Serialize};

use super::dest::DestProject;

/// Import status as reported by GitLab. Never cached; always re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImportStatus {
    None,
    Scheduled,
    Started,
    Finished,
    Failed,
    /// Anything GitLab reports that ghsync does not know about.
    Other(String),
}

impl ImportStatus {
    /// True once GitLab will not change the status on its own anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportStatus::None | ImportStatus::Finished | ImportStatus::Failed
        )
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportStatus::None => write!(f, "none"),
            ImportStatus::Scheduled => write!(f, "scheduled"),
            ImportStatus::Started => write!(f, "started"),
            ImportStatus::Finished => write!(f, "finished"),
            ImportStatus::Failed => write!(f, "failed"),
            ImportStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for ImportStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => ImportStatus::None,
            "scheduled" => ImportStatus::Scheduled,
            "started" => ImportStatus::Started,
            "finished" => ImportStatus::Finished,
            "failed" => ImportStatus::Failed,
            _ => ImportStatus::Other(s),
        }
    }
}

impl From<ImportStatus> for String {
    fn from(status: ImportStatus) -> Self {
        status.to_string()
    }
}

/// What `import_from_source` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// GitLab accepted a new import job for this project.
    Started(DestProject),
    /// The project was already present; nothing was requested.
    AlreadyExists(DestProject),
}

impl ImportOutcome {
    pub fn project(&self) -> &DestProject {
        match self {
            ImportOutcome::Started(p) | ImportOutcome::AlreadyExists(p) => p,
        }
    }

    pub fn into_project(self) -> DestProject {
        match self {
            ImportOutcome::Started(p) | ImportOutcome::AlreadyExists(p) => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire() {
        assert_eq!(ImportStatus::from("finished".to_string()), ImportStatus::Finished);
        assert_eq!(
            ImportStatus::from("regeneration_in_progress".to_string()),
            ImportStatus::Other("regeneration_in_progress".into())
        );
        let parsed: ImportStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(parsed, ImportStatus::Scheduled);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ImportStatus::Finished.is_terminal());
        assert!(ImportStatus::Failed.is_terminal());
        assert!(ImportStatus::None.is_terminal());
        assert!(!ImportStatus::Started.is_terminal());
        assert!(!ImportStatus::Other("x".into()).is_terminal());
    }
}
