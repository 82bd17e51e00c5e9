use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::import::ImportStatus;
use super::mirror::MirrorChange;

/// How far a single repository got through a sync.
///
/// `Unsynced -> Imported | AlreadyExists -> Mirrored`. There is no failed
/// stage: a failure leaves the stage where it was and records an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Unsynced,
    Imported,
    AlreadyExists,
    Mirrored,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStage::Unsynced => write!(f, "unsynced"),
            SyncStage::Imported => write!(f, "imported"),
            SyncStage::AlreadyExists => write!(f, "already_exists"),
            SyncStage::Mirrored => write!(f, "mirrored"),
        }
    }
}

impl std::str::FromStr for SyncStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsynced" => Ok(SyncStage::Unsynced),
            "imported" => Ok(SyncStage::Imported),
            "already_exists" => Ok(SyncStage::AlreadyExists),
            "mirrored" => Ok(SyncStage::Mirrored),
            _ => Err(format!("unknown sync stage: {s}")),
        }
    }
}

/// Record of syncing one source repository.
#[derive(Debug, Clone)]
pub struct RepoSyncRecord {
    pub repo_full_name: String,
    pub project_path: Option<String>,
    pub stage: SyncStage,
    /// Set when the destination project was found before any import.
    pub pre_existing: bool,
    pub import_status: Option<ImportStatus>,
    pub mirror: Option<MirrorChange>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RepoSyncRecord {
    pub fn new(repo_full_name: String) -> Self {
        let now = Utc::now();
        Self {
            repo_full_name,
            project_path: None,
            stage: SyncStage::Unsynced,
            pre_existing: false,
            import_status: None,
            mirror: None,
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of a whole owner sync, in listing order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub records: Vec<RepoSyncRecord>,
    /// Repositories left untouched because the run stopped early.
    pub not_attempted: Vec<String>,
}

impl SyncReport {
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.failed()).count()
    }

    pub fn mirrored_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.failed() && r.stage == SyncStage::Mirrored)
            .count()
    }

    pub fn pre_existing_count(&self) -> usize {
        self.records.iter().filter(|r| r.pre_existing).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0 && self.not_attempted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in [
            SyncStage::Unsynced,
            SyncStage::Imported,
            SyncStage::AlreadyExists,
            SyncStage::Mirrored,
        ] {
            assert_eq!(stage.to_string().parse::<SyncStage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_report_counts() {
        let mut ok = RepoSyncRecord::new("o/a".into());
        ok.stage = SyncStage::Mirrored;
        ok.pre_existing = true;
        let mut bad = RepoSyncRecord::new("o/b".into());
        bad.errors.push("boom".into());

        let report = SyncReport {
            records: vec![ok, bad],
            not_attempted: Vec::new(),
        };
        assert_eq!(report.mirrored_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.pre_existing_count(), 1);
        assert!(!report.is_success());
    }
}
