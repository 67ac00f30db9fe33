//! Validation panel.

use serde::Serialize;

use crate::domain::VerificationResult;

use super::badge::{Tone, percent};
use super::fields::{FieldRow, rows};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationPanel {
    pub verdict: Chip,
    pub confidence: String,
    pub checks: Vec<Chip>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    pub metadata: Vec<FieldRow>,
}

pub fn validation_panel(result: &VerificationResult) -> Option<ValidationPanel> {
    let v = result.validation.as_ref()?;

    let verdict = match v.is_valid {
        Some(true) => Chip {
            text: "Valid".into(),
            tone: Tone::Success,
        },
        Some(false) => Chip {
            text: "Invalid".into(),
            tone: Tone::Danger,
        },
        None => Chip {
            text: "Not checked".into(),
            tone: Tone::Neutral,
        },
    };

    let passed = v.checks_passed.iter().map(|c| Chip {
        text: c.clone(),
        tone: Tone::Success,
    });
    let failed = v.checks_failed.iter().map(|c| Chip {
        text: c.clone(),
        tone: Tone::Danger,
    });

    Some(ValidationPanel {
        verdict,
        confidence: percent(v.confidence),
        checks: passed.chain(failed).collect(),
        errors: v.errors.clone(),
        warnings: v.warnings.clone(),
        info: v.info.clone(),
        metadata: rows(&v.extracted_data),
    })
}
