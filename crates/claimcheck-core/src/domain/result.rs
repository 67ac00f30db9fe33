//! Verification result decoding.
//!
//! The backend result is schema-less: any field may be missing, null, or of an
//! unexpected type. Decoding therefore never fails. Every field is read through
//! [`Obj`], which maps absence and type mismatches to `None` / empty, and the
//! open-ended maps (`extracted_data`) are decoded into the [`FieldValue`]
//! tagged union with an explicit [`FieldValue::Absent`] branch.
//!
//! The raw JSON is kept alongside so exports stay a faithful projection of
//! what the server sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Final decision reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    Accept,
    Review,
    Reject,
    /// A value this client does not know. Styled like `Reject`.
    Other(String),
}

impl Decision {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACCEPT" => Decision::Accept,
            "REVIEW" => Decision::Review,
            "REJECT" => Decision::Reject,
            _ => Decision::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Review => "REVIEW",
            Decision::Reject => "REJECT",
            Decision::Other(s) => s,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value inside an `extracted_data` map.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Missing or `null`.
    Absent,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Absent,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Absent, FieldValue::Number),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from_json).collect()),
            Value::Object(map) => FieldValue::Map(decode_fields(map)),
        }
    }

    /// Absent, blank text, or an empty list/map: nothing worth showing.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }
}

fn decode_fields(map: &Map<String, Value>) -> Vec<(String, FieldValue)> {
    map.iter()
        .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
        .collect()
}

/// Read-only view over an optional JSON object.
#[derive(Clone, Copy)]
struct Obj<'a>(Option<&'a Map<String, Value>>);

impl<'a> Obj<'a> {
    fn of(value: &'a Value) -> Self {
        Self(value.as_object())
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.and_then(|m| m.get(key))
    }

    fn obj(&self, key: &str) -> Option<Obj<'a>> {
        self.get(key).and_then(Value::as_object).map(|m| Obj(Some(m)))
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn u64(&self, key: &str) -> Option<u64> {
        self.f64(key).filter(|n| *n >= 0.0).map(|n| n.round() as u64)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// String list; a lone string counts as a one-element list.
    fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    fn fields(&self, key: &str) -> Vec<(String, FieldValue)> {
        self.get(key)
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_default()
    }
}

/// The `analysis` block: classification + extraction output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub file_type: Option<String>,
    pub page_count: Option<u64>,
    pub document_type: Option<String>,
    pub document_type_ua: Option<String>,
    pub creation_method: Option<String>,
    pub brief_description: Option<String>,
    pub content_summary: Option<String>,
    pub document_date: Option<String>,
    pub issuing_authority: Option<String>,
    pub has_stamp: Option<bool>,
    pub has_signature: Option<bool>,
    pub has_letterhead: Option<bool>,
    pub has_images: Option<bool>,
    pub images_count: Option<u64>,
    pub images_match_claims: Option<bool>,
    pub shows_damage: Option<bool>,
    pub damage_severity: Option<String>,
    pub confidence: Option<f64>,
    pub classification_confidence: Option<f64>,
    pub extraction_confidence: Option<f64>,
    pub red_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub extracted_data: Vec<(String, FieldValue)>,
}

impl Analysis {
    fn decode(o: Obj<'_>) -> Self {
        Self {
            file_type: o.string("file_type"),
            page_count: o.u64("page_count"),
            document_type: o.string("document_type"),
            document_type_ua: o.string("document_type_ua"),
            creation_method: o.string("creation_method"),
            brief_description: o.string("brief_description"),
            content_summary: o.string("content_summary"),
            document_date: o.string("document_date"),
            issuing_authority: o.string("issuing_authority"),
            has_stamp: o.bool("has_stamp"),
            has_signature: o.bool("has_signature"),
            has_letterhead: o.bool("has_letterhead"),
            has_images: o.bool("has_images"),
            images_count: o.u64("images_count"),
            images_match_claims: o.bool("images_match_claims"),
            shows_damage: o.bool("shows_damage"),
            damage_severity: o.string("damage_severity"),
            confidence: o.f64("confidence"),
            classification_confidence: o.f64("classification_confidence"),
            extraction_confidence: o.f64("extraction_confidence"),
            red_flags: o.strings("red_flags"),
            warnings: o.strings("warnings"),
            extracted_data: o.fields("extracted_data"),
        }
    }
}

/// The `validation` block: metadata checks run by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub is_valid: Option<bool>,
    pub confidence: Option<f64>,
    pub checks_passed: Vec<String>,
    pub checks_failed: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    pub extracted_data: Vec<(String, FieldValue)>,
}

impl Validation {
    fn decode(o: Obj<'_>) -> Self {
        Self {
            is_valid: o.bool("is_valid"),
            confidence: o.f64("confidence"),
            checks_passed: o.strings("checks_passed"),
            checks_failed: o.strings("checks_failed"),
            errors: o.strings("errors"),
            warnings: o.strings("warnings"),
            info: o.strings("info"),
            extracted_data: o.fields("extracted_data"),
        }
    }
}

/// Decoded `GET /result/{id}` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct VerificationResult {
    pub decision: Option<Decision>,
    pub confidence: Option<f64>,
    pub reason: Option<String>,
    pub is_acceptable: Option<bool>,
    pub red_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub timestamp: Option<String>,
    pub processing_time_ms: Option<u64>,
    pub analysis: Option<Analysis>,
    pub validation: Option<Validation>,
    raw: Value,
}

impl VerificationResult {
    pub fn from_json(raw: Value) -> Self {
        let o = Obj::of(&raw);
        Self {
            decision: o.string("decision").map(|s| Decision::parse(&s)),
            confidence: o.f64("confidence"),
            reason: o.string("decision_reason").or_else(|| o.string("reason")),
            is_acceptable: o.bool("is_acceptable"),
            red_flags: o.strings("red_flags"),
            warnings: o.strings("warnings"),
            errors: o.strings("errors"),
            file_name: o.string("file_name"),
            file_type: o.string("file_type"),
            timestamp: o.string("timestamp"),
            processing_time_ms: o.u64("processing_time_ms"),
            analysis: o.obj("analysis").map(Analysis::decode),
            validation: o.obj("validation").map(Validation::decode),
            raw,
        }
    }

    /// The payload exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Was the source an image (as opposed to a PDF/document)?
    pub fn is_image(&self) -> bool {
        self.analysis
            .as_ref()
            .and_then(|a| a.file_type.as_deref())
            .or(self.file_type.as_deref())
            .is_some_and(|t| t.eq_ignore_ascii_case("image"))
    }

    /// Every warning the backend produced, top level first, deduplicated.
    pub fn all_warnings(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let nested = self
            .analysis
            .iter()
            .flat_map(|a| a.warnings.iter())
            .chain(self.validation.iter().flat_map(|v| v.warnings.iter()));
        for w in self.warnings.iter().chain(nested) {
            if !out.contains(&w.as_str()) {
                out.push(w);
            }
        }
        out
    }
}

impl From<Value> for VerificationResult {
    fn from(raw: Value) -> Self {
        Self::from_json(raw)
    }
}

impl From<VerificationResult> for Value {
    fn from(result: VerificationResult) -> Self {
        result.raw
    }
}
