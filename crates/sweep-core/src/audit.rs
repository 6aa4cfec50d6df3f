use crate::config::project_dirs;
use crate::sync_engine::{RepoReport, RunSummary, SyncOutcome};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

const MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Append-only JSON-lines record of sync runs, one file per UTC day.
#[derive(Clone)]
pub struct AuditLogger {
    session_id: String,
    base_dir: PathBuf,
    max_bytes: u64,
}

impl AuditLogger {
    pub fn new() -> anyhow::Result<Self> {
        let base_dir = project_dirs()?.data_local_dir().join("audit");
        Self::new_with_dir(base_dir, MAX_BYTES)
    }

    pub fn new_with_dir(base_dir: PathBuf, max_bytes: u64) -> anyhow::Result<Self> {
        fs::create_dir_all(&base_dir).context("create audit dir")?;
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            base_dir,
            max_bytes,
        })
    }

    pub fn record(
        &self,
        event: &str,
        status: AuditStatus,
        path: Option<&Path>,
        details: Option<Value>,
        error: Option<&str>,
    ) -> anyhow::Result<String> {
        let ts = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("format timestamp")?;
        let audit_id = Uuid::new_v4().to_string();
        let entry = AuditEvent {
            ts,
            level: status.level(),
            event: event.to_string(),
            audit_id: audit_id.clone(),
            session_id: self.session_id.clone(),
            status: status.as_str(),
            path: path.map(|value| value.display().to_string()),
            error: error.map(|value| value.to_string()),
            details,
        };
        self.write_entry(&entry)?;
        Ok(audit_id)
    }

    /// Records one `sync.repo` line per repository and a closing `sync.run`.
    pub fn record_run(&self, root: &Path, summary: &RunSummary) -> anyhow::Result<String> {
        for report in &summary.reports {
            self.record_repo(report)?;
        }
        let status = if summary.failed > 0 {
            AuditStatus::Failed
        } else {
            AuditStatus::Ok
        };
        let details = serde_json::json!({
            "found": summary.found,
            "processed": summary.processed,
            "fetched": summary.fetched,
            "pulled": summary.pulled,
            "skipped": summary.skipped,
            "failed": summary.failed,
        });
        self.record("sync.run", status, Some(root), Some(details), None)
    }

    fn record_repo(&self, report: &RepoReport) -> anyhow::Result<String> {
        let status = if report.outcome.is_failure() {
            AuditStatus::Failed
        } else if report.outcome.is_skip() {
            AuditStatus::Skipped
        } else {
            AuditStatus::Ok
        };
        let error = match &report.outcome {
            SyncOutcome::FetchFailed { error } | SyncOutcome::PullFailed { error } => {
                Some(error.as_str())
            }
            _ => None,
        };
        self.record(
            "sync.repo",
            status,
            Some(&report.path),
            Some(serde_json::json!({ "outcome": report.outcome.as_str() })),
            error,
        )
    }

    fn write_entry(&self, entry: &AuditEvent) -> anyhow::Result<()> {
        let date = OffsetDateTime::now_utc()
            .format(&time::format_description::parse("[year][month][day]")?)
            .context("format date")?;
        let path = next_audit_path(&self.base_dir, &date, self.max_bytes);
        let line = serde_json::to_string(entry).context("serialize audit entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open audit log {}", path.display()))?;
        writeln!(file, "{line}").context("write audit entry")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AuditStatus {
    Ok,
    Failed,
    Skipped,
}

impl AuditStatus {
    fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Ok => "ok",
            AuditStatus::Failed => "failed",
            AuditStatus::Skipped => "skipped",
        }
    }

    fn level(&self) -> &'static str {
        match self {
            AuditStatus::Ok => "INFO",
            AuditStatus::Failed => "ERROR",
            AuditStatus::Skipped => "WARN",
        }
    }
}

#[derive(Serialize)]
struct AuditEvent {
    ts: String,
    level: &'static str,
    event: String,
    audit_id: String,
    session_id: String,
    status: &'static str,
    path: Option<String>,
    error: Option<String>,
    details: Option<Value>,
}

fn next_audit_path(base_dir: &Path, date: &str, max_bytes: u64) -> PathBuf {
    let mut suffix = 0;
    loop {
        let name = if suffix == 0 {
            format!("audit-{date}.jsonl")
        } else {
            format!("audit-{date}-{suffix}.jsonl")
        };
        let path = base_dir.join(name);
        if let Ok(metadata) = fs::metadata(&path)
            && metadata.len() >= max_bytes
        {
            suffix += 1;
            continue;
        }
        return path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_all(dir: &Path) -> String {
        let mut contents = String::new();
        for entry in fs::read_dir(dir).unwrap() {
            contents.push_str(&fs::read_to_string(entry.unwrap().path()).unwrap());
        }
        contents
    }

    #[test]
    fn audit_writes_jsonl() {
        let tmp = TempDir::new().unwrap();
        let logger = AuditLogger::new_with_dir(tmp.path().to_path_buf(), 1024).unwrap();
        logger
            .record("test.event", AuditStatus::Ok, None, None, None)
            .unwrap();
        let contents = read_all(tmp.path());
        assert!(contents.contains("\"event\":\"test.event\""));
        assert!(contents.contains("\"status\":\"ok\""));
    }

    #[test]
    fn audit_rotates_when_max_reached() {
        let tmp = TempDir::new().unwrap();
        let logger = AuditLogger::new_with_dir(tmp.path().to_path_buf(), 1).unwrap();
        logger
            .record("test.event", AuditStatus::Ok, None, None, None)
            .unwrap();
        logger
            .record("test.event", AuditStatus::Ok, None, None, None)
            .unwrap();
        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert!(entries.len() >= 2);
    }

    #[test]
    fn run_records_each_repo_and_totals() {
        let tmp = TempDir::new().unwrap();
        let logger = AuditLogger::new_with_dir(tmp.path().to_path_buf(), 1024 * 1024).unwrap();
        let summary = RunSummary {
            found: 2,
            processed: 2,
            fetched: 1,
            pulled: 1,
            skipped: 0,
            failed: 1,
            reports: vec![
                RepoReport {
                    path: PathBuf::from("/w/a"),
                    outcome: SyncOutcome::Pulled,
                },
                RepoReport {
                    path: PathBuf::from("/w/b"),
                    outcome: SyncOutcome::FetchFailed {
                        error: "offline".to_string(),
                    },
                },
            ],
        };
        logger.record_run(Path::new("/w"), &summary).unwrap();

        let contents = read_all(tmp.path());
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"outcome\":\"pulled\""));
        assert!(lines[1].contains("\"error\":\"offline\""));
        assert!(lines[2].contains("\"event\":\"sync.run\""));
        assert!(lines[2].contains("\"status\":\"failed\""));
    }
}
