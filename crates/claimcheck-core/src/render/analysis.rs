//! Document-analysis panel.

use serde::Serialize;

use crate::domain::{Analysis, VerificationResult};

use super::badge::{Tone, percent};
use super::labels::{PLACEHOLDER, document_type_label, humanize};

/// Visual elements the backend looks for on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Stamp,
    Signature,
    Letterhead,
}

impl Element {
    pub const ALL: [Element; 3] = [Element::Stamp, Element::Signature, Element::Letterhead];

    pub fn label(self) -> &'static str {
        match self {
            Element::Stamp => "Stamp",
            Element::Signature => "Signature",
            Element::Letterhead => "Letterhead",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Element::Stamp => &["stamp", "seal"],
            Element::Signature => &["signature"],
            Element::Letterhead => &["letterhead"],
        }
    }

    fn present(self, analysis: &Analysis) -> Option<bool> {
        match self {
            Element::Stamp => analysis.has_stamp,
            Element::Signature => analysis.has_signature,
            Element::Letterhead => analysis.has_letterhead,
        }
    }
}

/// Elements a document type is expected to carry.
pub fn required_elements(document_type: &str) -> &'static [Element] {
    match document_type {
        "official_certificate" => &[Element::Stamp, Element::Signature, Element::Letterhead],
        "damage_act" | "court_decision" => &[Element::Stamp, Element::Signature],
        "registration_extract" => &[Element::Stamp],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementBadge {
    pub element: Element,
    pub present: Option<bool>,
    pub tone: Tone,
    /// Why the badge is amber, if it is.
    pub note: Option<String>,
}

impl ElementBadge {
    pub fn text(&self) -> String {
        let state = match self.present {
            Some(true) => "yes",
            Some(false) => "no",
            None => PLACEHOLDER,
        };
        match &self.note {
            Some(note) => format!("{} {}: {state} ({note})", self.tone.icon(), self.element.label()),
            None => format!("{} {}: {state}", self.tone.icon(), self.element.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: String,
}

impl Row {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisPanel {
    pub document_type: String,
    pub is_image: bool,
    pub rows: Vec<Row>,
    pub elements: Vec<ElementBadge>,
    pub red_flags: Vec<String>,
}

/// `None` when the result carries no analysis block.
pub fn analysis_panel(result: &VerificationResult) -> Option<AnalysisPanel> {
    let analysis = result.analysis.as_ref()?;
    let is_image = result.is_image();
    let document_type = analysis
        .document_type
        .as_deref()
        .map(document_type_label)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let mut rows = Vec::new();
    if let Some(local) = &analysis.document_type_ua {
        rows.push(Row::new("Local name", local.as_str()));
    }
    rows.push(Row::new(
        "Classification confidence",
        percent(analysis.classification_confidence.or(analysis.confidence)),
    ));
    rows.push(Row::new("Extraction confidence", percent(analysis.extraction_confidence)));

    if is_image {
        rows.push(Row::new("Shows damage", yes_no(analysis.shows_damage)));
        rows.push(Row::new("Damage severity", opt(analysis.damage_severity.as_deref().map(humanize))));
    } else {
        rows.push(Row::new("Pages", opt(analysis.page_count.map(|n| n.to_string()))));
        rows.push(Row::new(
            "Creation method",
            opt(analysis.creation_method.as_deref().map(humanize)),
        ));
        rows.push(Row::new("Issuing authority", opt(analysis.issuing_authority.clone())));
        rows.push(Row::new("Document date", opt(analysis.document_date.clone())));
        rows.push(Row::new("Images", images(analysis)));
    }

    let summary = analysis
        .brief_description
        .clone()
        .or_else(|| analysis.content_summary.clone());
    rows.push(Row::new("Summary", opt(summary)));

    let warnings = result.all_warnings();
    let required = analysis.document_type.as_deref().map_or(&[][..], required_elements);
    let elements = Element::ALL
        .iter()
        .map(|&element| element_badge(element, analysis, required, &warnings))
        .collect();

    Some(AnalysisPanel {
        document_type,
        is_image,
        rows,
        elements,
        red_flags: analysis.red_flags.clone(),
    })
}

fn element_badge(
    element: Element,
    analysis: &Analysis,
    required: &[Element],
    warnings: &[&str],
) -> ElementBadge {
    let present = element.present(analysis);
    let unexpected = warnings.iter().any(|w| {
        let w = w.to_lowercase();
        w.contains("unexpected") && element.keywords().iter().any(|k| w.contains(k))
    });
    let missing = required.contains(&element) && present != Some(true);

    let (tone, note) = if missing {
        (Tone::Warning, Some("required for this document type".to_string()))
    } else if unexpected {
        (Tone::Warning, Some("unexpected".to_string()))
    } else if present == Some(true) {
        (Tone::Success, None)
    } else {
        (Tone::Neutral, None)
    };
    ElementBadge {
        element,
        present,
        tone,
        note,
    }
}

fn images(analysis: &Analysis) -> String {
    match (analysis.has_images, analysis.images_count) {
        (Some(true), Some(n)) if n > 0 => format!("Yes ({n})"),
        (Some(true), _) => "Yes".to_string(),
        (Some(false), _) => "No".to_string(),
        (None, _) => PLACEHOLDER.to_string(),
    }
}

fn yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes".to_string(),
        Some(false) => "No".to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

fn opt(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
