//! JSON reports: a direct projection of the stored results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{BackendTaskId, ClientError, Decision, LocalTaskId, TaskRecord};

#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    pub file_name: &'a str,
    pub task_id: LocalTaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_task_id: Option<&'a BackendTaskId>,
    pub mime_type: &'a str,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub decision: Option<&'a str>,
    pub confidence: Option<f64>,
    pub reason: Option<&'a str>,
    pub red_flags: &'a [String],
    pub warnings: Vec<&'a str>,
    /// The backend payload, untouched.
    pub result: &'a Value,
}

impl<'a> ReportEntry<'a> {
    /// `None` for records without a result.
    pub fn from_record(record: &'a TaskRecord) -> Option<Self> {
        let result = record.result.as_ref()?;
        Some(Self {
            file_name: &record.name,
            task_id: record.id,
            backend_task_id: record.backend_id.as_ref(),
            mime_type: &record.mime_type,
            retry_count: record.retry_count,
            completed_at: record.completed_at,
            decision: result.decision.as_ref().map(Decision::as_str),
            confidence: result.confidence,
            reason: result.reason.as_deref(),
            red_flags: &result.red_flags,
            warnings: result.all_warnings(),
            result: result.raw(),
        })
    }
}

#[derive(Debug, Serialize)]
struct SingleReport<'a> {
    exported_at: DateTime<Utc>,
    #[serde(flatten)]
    entry: ReportEntry<'a>,
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    exported_at: DateTime<Utc>,
    total: usize,
    summary: BTreeMap<&'static str, usize>,
    results: Vec<ReportEntry<'a>>,
}

/// Counts per decision for the batch header. Unknown decisions count as REJECT.
pub fn decision_summary<'a>(records: impl IntoIterator<Item = &'a TaskRecord>) -> BTreeMap<&'static str, usize> {
    let mut summary = BTreeMap::from([("ACCEPT", 0), ("REVIEW", 0), ("REJECT", 0)]);
    for record in records {
        let Some(result) = &record.result else { continue };
        let key = match result.decision {
            Some(Decision::Accept) => "ACCEPT",
            Some(Decision::Review) => "REVIEW",
            _ => "REJECT",
        };
        *summary.entry(key).or_default() += 1;
    }
    summary
}

pub fn single_report(record: &TaskRecord, exported_at: DateTime<Utc>) -> Result<String, ClientError> {
    let entry = ReportEntry::from_record(record).ok_or(ClientError::NoResult(record.id))?;
    Ok(serde_json::to_string_pretty(&SingleReport { exported_at, entry })?)
}

/// Batch report over the records that have a result.
pub fn batch_report(records: &[&TaskRecord], exported_at: DateTime<Utc>) -> Result<String, ClientError> {
    let results: Vec<ReportEntry<'_>> = records.iter().filter_map(|r| ReportEntry::from_record(r)).collect();
    let report = BatchReport {
        exported_at,
        total: results.len(),
        summary: decision_summary(records.iter().copied()),
        results,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
