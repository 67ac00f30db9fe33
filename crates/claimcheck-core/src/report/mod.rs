//! Report export.
//!
//! Turns completed task records into JSON or HTML documents and writes them
//! into the report directory. No network access.

pub mod html;
pub mod json;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{ClientError, TaskRecord, TaskStatus};
use crate::ports::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" | "htm" => Ok(ReportFormat::Html),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// `report_<stem>_<YYYYmmdd_HHMMSS>.<ext>` for one task,
/// `batch_report_<YYYYmmdd_HHMMSS>.<ext>` for all.
pub fn report_file_name(file_name: Option<&str>, at: DateTime<Utc>, format: ReportFormat) -> String {
    let ts = at.format("%Y%m%d_%H%M%S");
    match file_name {
        Some(name) => format!("report_{}_{ts}.{}", file_stem(name), format.extension()),
        None => format!("batch_report_{ts}.{}", format.extension()),
    }
}

fn file_stem(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let safe: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if safe.is_empty() { "document".to_string() } else { safe }
}

/// Writes reports into a directory.
pub struct Exporter {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Export one completed task. Returns the written path.
    pub async fn export_task(&self, record: &TaskRecord, format: ReportFormat) -> Result<PathBuf, ClientError> {
        if !record.status.is_terminal() {
            return Err(ClientError::TaskInFlight(record.id));
        }
        if record.status != TaskStatus::Completed || record.result.is_none() {
            return Err(ClientError::NoResult(record.id));
        }
        let now = self.clock.now();
        let body = match format {
            ReportFormat::Json => json::single_report(record, now)?,
            ReportFormat::Html => html::single_report(record, now),
        };
        self.write(&report_file_name(Some(&record.name), now, format), body)
            .await
    }

    /// Export every completed task in `records`.
    ///
    /// Returns `Ok(None)` and writes nothing when none are completed.
    pub async fn export_all(
        &self,
        records: &[TaskRecord],
        format: ReportFormat,
    ) -> Result<Option<PathBuf>, ClientError> {
        let completed: Vec<&TaskRecord> = records
            .iter()
            .filter(|r| r.status == TaskStatus::Completed && r.result.is_some())
            .collect();
        if completed.is_empty() {
            info!("no completed tasks to export");
            return Ok(None);
        }
        let now = self.clock.now();
        let body = match format {
            ReportFormat::Json => json::batch_report(&completed, now)?,
            ReportFormat::Html => html::batch_report(&completed, now),
        };
        self.write(&report_file_name(None, now, format), body)
            .await
            .map(Some)
    }

    async fn write(&self, file_name: &str, body: String) -> Result<PathBuf, ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, body).await?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }
}
