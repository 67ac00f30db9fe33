//! Decision badge and tones.

use serde::Serialize;

use crate::domain::{Decision, VerificationResult};

use super::labels::PLACEHOLDER;

/// Visual weight of a badge or chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Neutral,
}

impl Tone {
    pub fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✅",
            Tone::Warning => "⚠️",
            Tone::Danger => "❌",
            Tone::Neutral => "·",
        }
    }

    /// Foreground colour used by the HTML report.
    pub fn color(self) -> &'static str {
        match self {
            Tone::Success => "#1e7e34",
            Tone::Warning => "#b26a00",
            Tone::Danger => "#c62828",
            Tone::Neutral => "#555555",
        }
    }

    /// Background colour used by the HTML report.
    pub fn background(self) -> &'static str {
        match self {
            Tone::Success => "#e6f4ea",
            Tone::Warning => "#fff4e0",
            Tone::Danger => "#fdecea",
            Tone::Neutral => "#f1f3f4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionBadge {
    pub label: String,
    pub tone: Tone,
    pub percent: String,
}

impl DecisionBadge {
    pub fn new(decision: Option<&Decision>, confidence: Option<f64>) -> Self {
        let tone = match decision {
            Some(Decision::Accept) => Tone::Success,
            Some(Decision::Review) => Tone::Warning,
            // Anything unrecognised looks like a rejection.
            Some(Decision::Reject) | Some(Decision::Other(_)) | None => Tone::Danger,
        };
        Self {
            label: decision.map_or_else(|| PLACEHOLDER.to_string(), |d| d.to_string()),
            tone,
            percent: percent(confidence),
        }
    }

    pub fn for_result(result: &VerificationResult) -> Self {
        Self::new(result.decision.as_ref(), result.confidence)
    }

    pub fn icon(&self) -> &'static str {
        self.tone.icon()
    }
}

/// `0.873` → `87%`. Values are clamped into `0..=1`.
pub fn percent(confidence: Option<f64>) -> String {
    match confidence.filter(|c| c.is_finite()) {
        Some(c) => format!("{}%", (c.clamp(0.0, 1.0) * 100.0).round() as u32),
        None => PLACEHOLDER.to_string(),
    }
}
