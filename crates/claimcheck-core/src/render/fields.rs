//! Extracted-fields panel.

use serde::Serialize;

use crate::domain::{FieldValue, VerificationResult};

use super::labels::{PLACEHOLDER, field_label};

/// Substrings in a warning that point at an edited image or document.
pub const TAMPER_KEYWORDS: &[&str] = &[
    "edit",
    "photoshop",
    "gimp",
    "tamper",
    "manipulat",
    "altered",
    "modified",
    "retouch",
    "lightroom",
];

pub const QUESTIONABLE: &str = "Questionable";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub key: String,
    pub label: String,
    pub value: FieldCell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldCell {
    Text(String),
    /// A nested object.
    Nested(Vec<FieldRow>),
    /// A list that contains objects.
    Items(Vec<FieldCell>),
}

impl FieldCell {
    /// Single-line form, for terminals and table cells.
    pub fn inline(&self) -> String {
        match self {
            FieldCell::Text(s) => s.clone(),
            FieldCell::Nested(rows) if rows.is_empty() => PLACEHOLDER.to_string(),
            FieldCell::Nested(rows) => rows
                .iter()
                .map(|r| format!("{}: {}", r.label, r.value.inline()))
                .collect::<Vec<_>>()
                .join("; "),
            FieldCell::Items(items) => items
                .iter()
                .map(|i| i.inline())
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// Does any warning suggest the file was edited?
pub fn mentions_tampering<'a>(warnings: impl IntoIterator<Item = &'a str>) -> bool {
    warnings.into_iter().any(|w| {
        let w = w.to_lowercase();
        TAMPER_KEYWORDS.iter().any(|k| w.contains(k))
    })
}

/// Rows for `analysis.extracted_data`, in payload order.
pub fn fields_panel(result: &VerificationResult) -> Vec<FieldRow> {
    let Some(analysis) = &result.analysis else {
        return Vec::new();
    };
    let tampered = mentions_tampering(result.all_warnings());
    analysis
        .extracted_data
        .iter()
        .map(|(key, value)| {
            let cell = match (key.as_str(), value) {
                ("appears_authentic", FieldValue::Bool(true)) if tampered => {
                    FieldCell::Text(QUESTIONABLE.to_string())
                }
                _ => cell(value),
            };
            row(key, cell)
        })
        .collect()
}

/// Rows for an arbitrary key/value map (e.g. validation metadata).
pub fn rows(entries: &[(String, FieldValue)]) -> Vec<FieldRow> {
    entries.iter().map(|(k, v)| row(k, cell(v))).collect()
}

fn row(key: &str, value: FieldCell) -> FieldRow {
    FieldRow {
        key: key.to_string(),
        label: field_label(key),
        value,
    }
}

/// Per-type formatting of one value.
pub fn cell(value: &FieldValue) -> FieldCell {
    match value {
        FieldValue::Map(entries) => FieldCell::Nested(rows(entries)),
        FieldValue::List(items) if items.iter().any(|i| matches!(i, FieldValue::Map(_))) => {
            FieldCell::Items(items.iter().filter(|i| !i.is_empty()).map(cell).collect())
        }
        FieldValue::List(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter(|i| !i.is_empty())
                .map(scalar)
                .collect();
            if parts.is_empty() {
                FieldCell::Text(PLACEHOLDER.to_string())
            } else {
                FieldCell::Text(parts.join(", "))
            }
        }
        other => FieldCell::Text(scalar(other)),
    }
}

fn scalar(value: &FieldValue) -> String {
    match value {
        FieldValue::Absent => PLACEHOLDER.to_string(),
        FieldValue::Bool(true) => "Yes".to_string(),
        FieldValue::Bool(false) => "No".to_string(),
        FieldValue::Number(n) => format!("{n}"),
        FieldValue::Text(s) if s.trim().is_empty() => PLACEHOLDER.to_string(),
        FieldValue::Text(s) => s.trim().to_string(),
        FieldValue::List(_) | FieldValue::Map(_) => cell(value).inline(),
    }
}
