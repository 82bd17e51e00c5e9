use std::path::PathBuf;

/// Central error type for ghsync.
#[derive(Debug, thiserror::Error)]
pub enum GhSyncError {
    #[error(": Unable to authenticate to {service} API: {message}")]
    AuthFailed { service: String, message: String },

    #[error("connection error: {message}")]
    Connection { message: String },

    #[error(": Unable to find {what}")]
    ResourceNotFound { what: String },

    #[error(": Unknown GitHub owner type: '{0}'")]
    InvalidOwnerKind(String),

    #[error("invalid project path '{path}': expected GROUP/PROJECT")]
    InvalidProjectPath { path: String },

    #[error("invalid repository name '{name}': expected OWNER/REPO")]
    InvalidRepoName { name: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("pull mirror for project {project_id} is in an unexpected state (status {status})")]
    MirrorState { project_id: u64, status: u16 },

    #[error("import of {project} failed with status '{status}'")]
    ImportFailed { project: String, status: String },

    #[error("import of {project} did not finish after {attempts} status checks")]
    ImportTimedOut { project: String, attempts: u32 },

    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("credential error: {message}")]
    Credential { message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GhSyncError {
    /// Wrap a transport-level failure.
    pub fn connection(message: impl Into<String>) -> Self {
        GhSyncError::Connection {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        GhSyncError::ResourceNotFound { what: what.into() }
    }
}
