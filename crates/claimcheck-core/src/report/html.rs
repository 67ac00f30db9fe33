//! Self-contained HTML reports.
//!
//! No external assets: styles are embedded, tone colours are inline.

use chrono::{DateTime, Utc};

use crate::domain::TaskRecord;
use crate::render::{FieldCell, FieldRow, PLACEHOLDER, ResultView, Tone};

use super::json::decision_summary;

const CSS: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; color: #222; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
h1 { font-size: 1.5rem; margin-bottom: .25rem; }
.muted { color: #666; font-size: .9rem; }
.summary { display: flex; gap: 1rem; margin: 1rem 0 2rem; }
.summary div { padding: .75rem 1rem; border-radius: 8px; min-width: 7rem; }
.card { border: 1px solid #ddd; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
.badge { display: inline-block; padding: .2rem .6rem; border-radius: 999px; font-weight: 600; }
.chip { display: inline-block; padding: .1rem .5rem; border-radius: 4px; margin: 0 .25rem .25rem 0; font-size: .85rem; }
table { border-collapse: collapse; width: 100%; margin-top: .5rem; }
td, th { text-align: left; border-bottom: 1px solid #eee; padding: .3rem .5rem; vertical-align: top; }
th { width: 35%; color: #555; font-weight: 500; }
ul { margin: .25rem 0 .75rem; }
"#;

/// Escape text for element content and quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn single_report(record: &TaskRecord, exported_at: DateTime<Utc>) -> String {
    page(
        &format!("Verification report: {}", record.name),
        exported_at,
        &card(record),
    )
}

pub fn batch_report(records: &[&TaskRecord], exported_at: DateTime<Utc>) -> String {
    let summary = decision_summary(records.iter().copied());
    let tiles: String = [("ACCEPT", Tone::Success), ("REVIEW", Tone::Warning), ("REJECT", Tone::Danger)]
        .iter()
        .map(|(label, tone)| {
            format!(
                r#"<div style="background:{};color:{}"><strong>{}</strong><br>{} {}</div>"#,
                tone.background(),
                tone.color(),
                summary.get(label).copied().unwrap_or(0),
                tone.icon(),
                label
            )
        })
        .collect();

    let cards: String = records.iter().map(|r| card(r)).collect();
    let body = format!(
        r#"<p class="muted">{} documents</p><div class="summary">{tiles}</div>{cards}"#,
        records.len()
    );
    page("Batch verification report", exported_at, &body)
}

fn page(title: &str, exported_at: DateTime<Utc>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{CSS}</style>
</head>
<body>
<h1>{title}</h1>
<p class="muted">Exported {exported}</p>
{body}
</body>
</html>
"#,
        title = escape(title),
        exported = exported_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn card(record: &TaskRecord) -> String {
    let Some(result) = &record.result else {
        return format!(
            r#"<section class="card"><h2>{}</h2><p class="muted">No result.</p></section>"#,
            escape(&record.name)
        );
    };
    let view = ResultView::new(result);
    let badge = &view.badge;

    let mut html = format!(
        r#"<section class="card"><h2>{name}</h2><p><span class="badge" style="background:{bg};color:{fg}">{icon} {label}</span> <span class="muted">confidence {pct}</span></p><p>{reason}</p>"#,
        name = escape(&record.name),
        bg = badge.tone.background(),
        fg = badge.tone.color(),
        icon = badge.icon(),
        label = escape(&badge.label),
        pct = badge.percent,
        reason = escape(view.reason.as_deref().unwrap_or(PLACEHOLDER)),
    );

    html.push_str(&issues("Red flags", &view.red_flags, Tone::Danger));
    html.push_str(&issues("Warnings", &view.warnings, Tone::Warning));
    html.push_str(&issues("Errors", &view.errors, Tone::Danger));

    if let Some(analysis) = &view.analysis {
        html.push_str(&format!("<h3>Document analysis: {}</h3><table>", escape(&analysis.document_type)));
        for row in &analysis.rows {
            html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                escape(&row.label),
                escape(&row.value)
            ));
        }
        html.push_str("</table><p>");
        for badge in &analysis.elements {
            html.push_str(&chip(&badge.text(), badge.tone));
        }
        html.push_str("</p>");
    }

    if !view.fields.is_empty() {
        html.push_str("<h3>Extracted data</h3>");
        html.push_str(&table(&view.fields));
    }

    if let Some(validation) = &view.validation {
        html.push_str(&format!(
            "<h3>Validation</h3><p>{}</p><p>",
            chip(&validation.verdict.text, validation.verdict.tone)
        ));
        for check in &validation.checks {
            html.push_str(&chip(&check.text, check.tone));
        }
        html.push_str("</p>");
        html.push_str(&issues("Validation errors", &validation.errors, Tone::Danger));
        html.push_str(&issues("Validation warnings", &validation.warnings, Tone::Warning));
        if !validation.metadata.is_empty() {
            html.push_str(&table(&validation.metadata));
        }
    }

    html.push_str("</section>");
    html
}

fn issues(title: &str, items: &[String], tone: Tone) -> String {
    if items.is_empty() {
        return String::new();
    }
    let lis: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape(i)))
        .collect();
    format!(
        r#"<h4 style="color:{}">{} {}</h4><ul>{lis}</ul>"#,
        tone.color(),
        tone.icon(),
        escape(title)
    )
}

fn chip(text: &str, tone: Tone) -> String {
    format!(
        r#"<span class="chip" style="background:{};color:{}">{}</span>"#,
        tone.background(),
        tone.color(),
        escape(text)
    )
}

fn table(rows: &[FieldRow]) -> String {
    let mut html = String::from("<table>");
    for row in rows {
        let value = match &row.value {
            FieldCell::Nested(children) if !children.is_empty() => table(children),
            cell => escape(&cell.inline()),
        };
        html.push_str(&format!("<tr><th>{}</th><td>{value}</td></tr>", escape(&row.label)));
    }
    html.push_str("</table>");
    html
}
