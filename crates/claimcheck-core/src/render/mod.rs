//! Result rendering.
//!
//! Pure functions from a [`VerificationResult`] to view models. The text
//! renderer and the HTML report both consume the same view models, and a
//! missing value always renders as [`PLACEHOLDER`], never as an error.

pub mod analysis;
pub mod badge;
pub mod fields;
pub mod labels;
pub mod text;
pub mod validation;

pub use self::analysis::{AnalysisPanel, Element, ElementBadge, analysis_panel};
pub use self::badge::{DecisionBadge, Tone, percent};
pub use self::fields::{FieldCell, FieldRow, fields_panel};
pub use self::labels::{PLACEHOLDER, document_type_label, field_label};
pub use self::validation::{ValidationPanel, validation_panel};

use serde::Serialize;

use crate::domain::VerificationResult;

/// Everything shown for one completed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub badge: DecisionBadge,
    pub reason: Option<String>,
    pub red_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub analysis: Option<AnalysisPanel>,
    pub fields: Vec<FieldRow>,
    pub validation: Option<ValidationPanel>,
}

impl ResultView {
    pub fn new(result: &VerificationResult) -> Self {
        Self {
            badge: DecisionBadge::for_result(result),
            reason: result.reason.clone(),
            red_flags: result.red_flags.clone(),
            warnings: result.warnings.clone(),
            errors: result.errors.clone(),
            analysis: analysis_panel(result),
            fields: fields_panel(result),
            validation: validation_panel(result),
        }
    }
}
