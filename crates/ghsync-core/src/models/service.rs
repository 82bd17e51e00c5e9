use serde::{Deserialize, Serialize};

/// One of the two hosting services ghsync talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// The source side, repositories are read from here.
    GitHub,
    /// The destination side, groups/projects/mirrors are written here.
    GitLab,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::GitHub => write!(f, "github"),
            Service::GitLab => write!(f, "gitlab"),
        }
    }
}

impl std::str::FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" | "gh" => Ok(Service::GitHub),
            "gitlab" | "gl" => Ok(Service::GitLab),
            _ => Err(format!("unknown service: {s}")),
        }
    }
}

impl Service {
    /// Key used to look up this service's token in the OS keychain.
    pub fn credential_key(&self) -> String {
        format!("ghsync:{self}")
    }
}
