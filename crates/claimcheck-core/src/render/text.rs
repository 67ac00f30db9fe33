//! Plain-text rendering for terminals.

use std::fmt::Write;

use crate::domain::{TaskRecord, TaskStatus};
use crate::store::TaskCounts;

use super::ResultView;
use super::badge::Tone;
use super::fields::{FieldCell, FieldRow};
use super::labels::PLACEHOLDER;

/// One line per task for listings.
pub fn summary_line(record: &TaskRecord) -> String {
    let state = match record.status {
        TaskStatus::Pending | TaskStatus::Processing => {
            let progress = record.progress.map(|p| format!(" {p}%")).unwrap_or_default();
            let stage = record.stage.as_deref().map(|s| format!(" {s}")).unwrap_or_default();
            format!("⏳ {}{progress}{stage}", record.status)
        }
        TaskStatus::Error => format!(
            "{} error: {}",
            Tone::Danger.icon(),
            record.error.as_deref().unwrap_or(PLACEHOLDER)
        ),
        TaskStatus::Completed => match &record.result {
            Some(result) => {
                let view = ResultView::new(result);
                format!(
                    "{} {} {}  {}",
                    view.badge.icon(),
                    view.badge.label,
                    view.badge.percent,
                    view.reason.as_deref().unwrap_or(PLACEHOLDER)
                )
            }
            None => format!("{} completed", Tone::Neutral.icon()),
        },
    };
    format!("{}  {:<28}  {state}", short_id(record), truncate(&record.name, 28))
}

/// Task list with a totals footer.
pub fn task_list(records: &[TaskRecord], selected: Option<&TaskRecord>, counts: &TaskCounts) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No tasks.\n");
        return out;
    }
    for record in records {
        let marker = if selected.is_some_and(|s| s.id == record.id) { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {}", summary_line(record));
    }
    let _ = writeln!(
        out,
        "\n{} tasks: {} in progress, {} completed, {} failed  (ACCEPT {} / REVIEW {} / REJECT {})",
        counts.total(),
        counts.in_flight(),
        counts.completed,
        counts.error,
        counts.accept,
        counts.review,
        counts.reject
    );
    out
}

/// Every panel for one task.
pub fn task_details(record: &TaskRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", record.name, record.id);
    let _ = writeln!(out, "  Status:   {}", record.status);
    if let Some(backend_id) = &record.backend_id {
        let _ = writeln!(out, "  Server id: {backend_id}");
    }
    if record.retry_count > 0 {
        let _ = writeln!(out, "  Retries:  {}", record.retry_count);
    }
    if let Some(error) = &record.error {
        let _ = writeln!(out, "  Error:    {error}");
    }

    let Some(result) = &record.result else {
        if !record.status.is_terminal() {
            let _ = writeln!(
                out,
                "  Progress: {}% {}",
                record.progress.unwrap_or(0),
                record.stage.as_deref().unwrap_or("")
            );
        }
        return out;
    };
    out.push('\n');
    out.push_str(&result_details(&ResultView::new(result)));
    out
}

pub fn result_details(view: &ResultView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  confidence {}",
        view.badge.icon(),
        view.badge.label,
        view.badge.percent
    );
    let _ = writeln!(out, "  {}", view.reason.as_deref().unwrap_or(PLACEHOLDER));
    list(&mut out, "Red flags", &view.red_flags);
    list(&mut out, "Warnings", &view.warnings);
    list(&mut out, "Errors", &view.errors);

    if let Some(analysis) = &view.analysis {
        let _ = writeln!(out, "\nDocument analysis: {}", analysis.document_type);
        for row in &analysis.rows {
            let _ = writeln!(out, "  {:<26} {}", row.label, row.value);
        }
        let badges: Vec<String> = analysis.elements.iter().map(|b| b.text()).collect();
        let _ = writeln!(out, "  {}", badges.join("   "));
        list(&mut out, "Analysis red flags", &analysis.red_flags);
    }

    if !view.fields.is_empty() {
        out.push_str("\nExtracted fields\n");
        field_rows(&mut out, &view.fields, 1);
    }

    if let Some(validation) = &view.validation {
        let _ = writeln!(
            out,
            "\nValidation: {} {}  confidence {}",
            validation.verdict.tone.icon(),
            validation.verdict.text,
            validation.confidence
        );
        for chip in &validation.checks {
            let _ = writeln!(out, "  {} {}", chip.tone.icon(), chip.text);
        }
        list(&mut out, "Errors", &validation.errors);
        list(&mut out, "Warnings", &validation.warnings);
        list(&mut out, "Info", &validation.info);
        if !validation.metadata.is_empty() {
            out.push_str("  Metadata\n");
            field_rows(&mut out, &validation.metadata, 2);
        }
    }
    out
}

fn list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {title}:");
    for item in items {
        let _ = writeln!(out, "    - {item}");
    }
}

fn field_rows(out: &mut String, rows: &[FieldRow], depth: usize) {
    let indent = "  ".repeat(depth);
    for row in rows {
        match &row.value {
            FieldCell::Nested(children) if !children.is_empty() => {
                let _ = writeln!(out, "{indent}{}:", row.label);
                field_rows(out, children, depth + 1);
            }
            cell => {
                let _ = writeln!(out, "{indent}{:<26} {}", row.label, cell.inline());
            }
        }
    }
}

fn short_id(record: &TaskRecord) -> String {
    let id = record.id.to_string();
    id.chars().take("local-".len() + 10).collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BackendTaskId, LocalTaskId, VerificationResult};
    use chrono::Utc;
    use serde_json::json;
    use ulid::Ulid;

    fn record() -> TaskRecord {
        TaskRecord::new(LocalTaskId::from_ulid(Ulid::new()), "claim.pdf", "application/pdf", Utc::now())
    }

    #[test]
    fn summary_for_each_state() {
        let mut r = record();
        assert!(summary_line(&r).contains("⏳ pending 0% Uploading..."));

        r.mark_submitted(BackendTaskId::new("b"), Utc::now());
        r.mark_completed(
            VerificationResult::from_json(json!({
                "decision": "ACCEPT", "confidence": 0.873, "decision_reason": "Looks fine"
            })),
            Utc::now(),
        );
        let line = summary_line(&r);
        assert!(line.contains("✅ ACCEPT 87%  Looks fine"), "{line}");

        let mut failed = record();
        failed.mark_failed("Processing failed", Utc::now());
        assert!(summary_line(&failed).contains("❌ error: Processing failed"));
    }

    #[test]
    fn details_include_every_panel() {
        let mut r = record();
        r.mark_submitted(BackendTaskId::new("b-9"), Utc::now());
        r.mark_completed(
            VerificationResult::from_json(json!({
                "decision": "REVIEW",
                "confidence": 0.61,
                "warnings": ["Photoshop detected in metadata"],
                "analysis": {
                    "document_type": "damage_act",
                    "has_stamp": false,
                    "extracted_data": { "appears_authentic": true, "owner_name": "O. Koval" }
                },
                "validation": { "is_valid": true, "checks_passed": ["pdf_structure"] }
            })),
            Utc::now(),
        );

        let text = task_details(&r);
        assert!(text.contains("⚠️ REVIEW  confidence 61%"));
        assert!(text.contains("Document analysis: Damage act"));
        assert!(text.contains("Questionable"));
        assert!(text.contains("O. Koval"));
        assert!(text.contains("Validation: ✅ Valid"));
        assert!(text.contains("Server id: b-9"));
    }

    #[test]
    fn empty_list() {
        assert_eq!(task_list(&[], None, &TaskCounts::default()), "No tasks.\n");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
