//! Run report: what each pipeline did, serialized for `--json`.

use std::path::{Path, PathBuf};

use katilim_io::{PersistError, WriteOutcome};
use katilim_recon::summary::ReconSummary;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    /// `written`, `unchanged` or `failed`
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactReport {
    pub fn from_result(path: &Path, result: &Result<WriteOutcome, PersistError>) -> Self {
        match result {
            Ok(outcome) => Self {
                path: path.to_path_buf(),
                outcome: outcome.as_str(),
                error: None,
            },
            Err(e) => Self {
                path: path.to_path_buf(),
                outcome: "failed",
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Completed,
    /// A source could not be fetched; nothing was written.
    SourceFailed,
    /// The engine rejected the scraped tables; nothing was written.
    ReconFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalReport {
    pub status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_seed: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReconSummary>,
    pub artifacts: Vec<ArtifactReport>,
    pub errors: Vec<String>,
}

impl ApprovalReport {
    pub fn failed(status: ApprovalStatus, error: String) -> Self {
        Self {
            status,
            metadata_seed: None,
            summary: None,
            artifacts: Vec::new(),
            errors: vec![error],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_at: String,
    pub data_dir: PathBuf,
    pub approval: ApprovalReport,
    pub snapshots: Vec<SnapshotReport>,
}

impl RunReport {
    /// Count of source, engine and artifact failures across the run.
    pub fn failures(&self) -> usize {
        let approval = self.approval.errors.len()
            + self.approval.artifacts.iter().filter(|a| a.is_failure()).count();
        let snapshots = self
            .snapshots
            .iter()
            .filter(|s| s.error.is_some() || s.artifact.as_ref().is_some_and(ArtifactReport::is_failure))
            .count();
        approval + snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_report_json_shape() {
        let ok = ArtifactReport::from_result(Path::new("data/a.csv"), &Ok(WriteOutcome::Unchanged));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, serde_json::json!({"path": "data/a.csv", "outcome": "unchanged"}));

        let err = PersistError::Write {
            path: PathBuf::from("data/b.csv"),
            message: "denied".into(),
        };
        let failed = ArtifactReport::from_result(Path::new("data/b.csv"), &Err(err));
        assert_eq!(failed.outcome, "failed");
        assert!(failed.error.unwrap().contains("denied"));
    }

    #[test]
    fn failures_counted_across_pipelines() {
        let report = RunReport {
            run_at: "2026-01-01T00:00:00Z".into(),
            data_dir: PathBuf::from("data"),
            approval: ApprovalReport::failed(ApprovalStatus::SourceFailed, "boom".into()),
            snapshots: vec![
                SnapshotReport {
                    url: "http://a".into(),
                    rows: Some(3),
                    artifact: Some(ArtifactReport::from_result(
                        Path::new("x.csv"),
                        &Ok(WriteOutcome::Written),
                    )),
                    error: None,
                },
                SnapshotReport {
                    url: "http://b".into(),
                    rows: None,
                    artifact: None,
                    error: Some("HTTP 500".into()),
                },
            ],
        };
        assert_eq!(report.failures(), 2);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["approval"]["status"], "source_failed");
    }
}
