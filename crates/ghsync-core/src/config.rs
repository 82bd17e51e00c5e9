use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::GhSyncError;
use crate::models::source::{OwnerKind, WikiDetection};

/// Config file looked up in the current directory first.
pub const LOCAL_CONFIG_FILE: &str = "gh_sync.toml";

/// Older INI-style local file, read when no `gh_sync.toml` exists.
pub const LEGACY_LOCAL_CONFIG_FILE: &str = "gh_sync.conf";

/// Config file looked up in the home directory when no local file exists.
/// May be TOML or the older INI layout with a `[global]` section.
pub const USER_CONFIG_FILE: &str = ".ghsyncrc";

const LEGACY_SECTION: &str = "global";

pub const ENV_GITLAB_URL: &str = "GHSYNC_GITLAB_URL";
pub const ENV_GITLAB_TOKEN: &str = "GHSYNC_GITLAB_TOKEN";
pub const ENV_GITLAB_GROUP: &str = "GHSYNC_GITLAB_GROUP";
pub const ENV_GITHUB_ORG: &str = "GHSYNC_GITHUB_ORG";
pub const ENV_GITHUB_TOKEN: &str = "GHSYNC_GITHUB_TOKEN";
pub const ENV_LOG_DIR: &str = "GHSYNC_LOGDIR";

const GITHUB_API_URL: &str = "https://api.github.com";

/// Top-level ghsync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhSyncConfig {
    /// Directory receiving `ghsync.log`. Unset means the working directory
    /// at run time; see [`GhSyncConfig::log_dir`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub gitlab: GitLabSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

/// Source side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// Owner whose repositories are mirrored.
    pub org: Option<String>,

    #[serde(default = "default_owner_kind")]
    pub owner_kind: OwnerKind,

    pub token: Option<String>,

    #[serde(default = "default_github_api_url")]
    pub api_url: Url,

    #[serde(default)]
    pub wiki_detection: WikiDetection,
}

/// Destination side settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitLabSettings {
    /// Instance root, e.g. `https://gitlab.example.com`.
    pub url: Option<Url>,
    pub token: Option<String>,
    /// Namespace the mirrored projects live in.
    pub group: Option<String>,
}

/// Knobs for the sync driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_true")]
    pub wait_for_import: bool,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    #[serde(default = "default_true")]
    pub configure_mirror: bool,

    #[serde(default = "default_true")]
    pub touch_wikis: bool,

    /// Record a failing repository and carry on with the next one.
    #[serde(default = "default_true")]
    pub keep_going: bool,

    /// Push webhook registered on each source repository, if set.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_owner_kind() -> OwnerKind {
    OwnerKind::Organization
}

fn default_github_api_url() -> Url {
    Url::parse(GITHUB_API_URL).expect("static GitHub API URL is valid")
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_poll_attempts() -> u32 {
    120
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            org: None,
            owner_kind: default_owner_kind(),
            token: None,
            api_url: default_github_api_url(),
            wiki_detection: WikiDetection::default(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            wait_for_import: true,
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            configure_mirror: true,
            touch_wikis: true,
            keep_going: true,
            webhook_url: None,
        }
    }
}

impl Default for GhSyncConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            github: GitHubSettings::default(),
            gitlab: GitLabSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl GhSyncConfig {
    /// `./gh_sync.toml`.
    pub fn local_config_path() -> Result<PathBuf, GhSyncError> {
        Ok(std::env::current_dir()?.join(LOCAL_CONFIG_FILE))
    }

    /// `./gh_sync.conf`.
    pub fn legacy_local_config_path() -> Result<PathBuf, GhSyncError> {
        Ok(std::env::current_dir()?.join(LEGACY_LOCAL_CONFIG_FILE))
    }

    /// `~/.ghsyncrc`.
    pub fn user_config_path() -> Result<PathBuf, GhSyncError> {
        let home = dirs::home_dir().ok_or_else(|| GhSyncError::Config {
            message: "could not determine home directory".into(),
        })?;
        Ok(home.join(USER_CONFIG_FILE))
    }

    /// First existing config file: `./gh_sync.toml`, `./gh_sync.conf`,
    /// then `~/.ghsyncrc`.
    pub fn discover() -> Result<Option<PathBuf>, GhSyncError> {
        let candidates = [
            Self::local_config_path()?,
            Self::legacy_local_config_path()?,
            Self::user_config_path()?,
        ];
        Ok(candidates.into_iter().find(|p| p.exists()))
    }

    /// Directory receiving `ghsync.log`: the configured one, else the
    /// current working directory.
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Load from `path` (or the discovered file, or defaults) and apply
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self, GhSyncError> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(GhSyncError::PathNotFound {
                        path: p.to_path_buf(),
                    });
                }
                Self::load_from(p)?
            }
            None => match Self::discover()? {
                Some(found) => Self::load_from(&found)?,
                None => Self::default(),
            },
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from a specific path, without environment overrides.
    ///
    /// Files with a `[global]` section are read as the older INI layout.
    pub fn load_from(path: &Path) -> Result<Self, GhSyncError> {
        tracing::debug!("reading configuration file {}", path.display());
        let content = std::fs::read_to_string(path)?;
        if is_legacy(&content) {
            tracing::debug!("{} uses the [{LEGACY_SECTION}] layout", path.display());
            return Self::from_legacy(&content);
        }
        toml::from_str(&content).map_err(|e| GhSyncError::Serialization(e.to_string()))
    }

    /// Map an INI file with a `[global]` section onto the sectioned layout.
    pub fn from_legacy(content: &str) -> Result<Self, GhSyncError> {
        let file: LegacyFile = toml::from_str(&legacy_to_toml(content)?)
            .map_err(|e| GhSyncError::Serialization(e.to_string()))?;
        let global = file.global;

        let mut config = Self::default();
        config.github.org = global.github_org;
        config.github.token = global.github_token;
        config.gitlab.group = global.gitlab_namespace;
        config.gitlab.token = global.gitlab_token;
        if let Some(raw) = global.gitlab_url {
            let url = Url::parse(&raw).map_err(|e| GhSyncError::Config {
                message: format!("gitLabUrl: {e}"),
            })?;
            config.gitlab.url = Some(url);
        }
        config.log_dir = global.log_dir.map(PathBuf::from);
        if let Some(repos) = global.gitlab_repos {
            tracing::debug!("ignoring gitLabRepos = {repos}");
        }
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), GhSyncError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GhSyncError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override file values with whatever `lookup` returns for the
    /// `GHSYNC_*` variables. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), GhSyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(raw) = get(ENV_GITLAB_URL) {
            let url = Url::parse(&raw).map_err(|e| GhSyncError::Config {
                message: format!("{ENV_GITLAB_URL}: {e}"),
            })?;
            self.gitlab.url = Some(url);
        }
        if let Some(token) = get(ENV_GITLAB_TOKEN) {
            self.gitlab.token = Some(token);
        }
        if let Some(group) = get(ENV_GITLAB_GROUP) {
            self.gitlab.group = Some(group);
        }
        if let Some(org) = get(ENV_GITHUB_ORG) {
            self.github.org = Some(org);
        }
        if let Some(token) = get(ENV_GITHUB_TOKEN) {
            self.github.token = Some(token);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn gitlab_url(&self) -> Result<&Url, GhSyncError> {
        self.gitlab.url.as_ref().ok_or_else(|| missing("gitlab.url", ENV_GITLAB_URL))
    }

    pub fn gitlab_group(&self) -> Result<&str, GhSyncError> {
        self.gitlab
            .group
            .as_deref()
            .ok_or_else(|| missing("gitlab.group", ENV_GITLAB_GROUP))
    }

    pub fn github_org(&self) -> Result<&str, GhSyncError> {
        self.github
            .org
            .as_deref()
            .ok_or_else(|| missing("github.org", ENV_GITHUB_ORG))
    }
}

#[derive(Deserialize)]
struct LegacyFile {
    global: LegacyGlobal,
}

/// Keys of the `[global]` section, lowercased as INI readers compare them.
#[derive(Deserialize)]
struct LegacyGlobal {
    #[serde(rename = "githuborgname")]
    github_org: Option<String>,
    #[serde(rename = "githubtoken")]
    github_token: Option<String>,
    #[serde(rename = "gitlabnspace")]
    gitlab_namespace: Option<String>,
    #[serde(rename = "gitlabrepos")]
    gitlab_repos: Option<String>,
    #[serde(rename = "gitlabtoken")]
    gitlab_token: Option<String>,
    #[serde(rename = "gitlaburl")]
    gitlab_url: Option<String>,
    #[serde(rename = "logdir")]
    log_dir: Option<String>,
}

fn is_legacy(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim() == format!("[{LEGACY_SECTION}]"))
}

/// Rewrite INI `key = value` / `key: value` lines as TOML string entries.
/// Keys are lowercased, empty values dropped, `#` and `;` lines are comments.
fn legacy_to_toml(content: &str) -> Result<String, GhSyncError> {
    let mut out = String::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        let Some(split) = line.find(['=', ':']) else {
            return Err(GhSyncError::Config {
                message: format!("line {}: expected `key = value`, got `{line}`", n + 1),
            });
        };
        let key = line[..split].trim().to_lowercase();
        let value = line[split + 1..].trim();
        if value.is_empty() {
            continue;
        }
        let quoted = toml::Value::String(value.to_string());
        out.push_str(&format!("\"{key}\" = {quoted}\n"));
    }
    Ok(out)
}

fn missing(key: &str, env: &str) -> GhSyncError {
    GhSyncError::Config {
        message: format!("`{key}` is not set (config file or {env})"),
    }
}
