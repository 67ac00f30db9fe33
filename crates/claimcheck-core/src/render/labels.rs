//! Display labels for backend keys.

/// Shown wherever a value is missing.
pub const PLACEHOLDER: &str = "—";

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("official_certificate", "Official certificate"),
    ("damage_act", "Damage act"),
    ("photo_collection", "Photo collection"),
    ("identity_document", "Identity document"),
    ("property_document", "Property document"),
    ("financial_statement", "Financial statement"),
    ("court_decision", "Court decision"),
    ("registration_extract", "Registration extract"),
    ("medical_record", "Medical record"),
    ("utility_bill", "Utility bill"),
    ("application_form", "Application form"),
    ("other", "Other document"),
    ("damage_photo", "Damage photo"),
    ("property_exterior", "Property exterior"),
    ("property_interior", "Property interior"),
    ("document_photo", "Photo of a document"),
    ("identity_photo", "Identity photo"),
    ("before_after", "Before/after comparison"),
    ("screenshot", "Screenshot"),
];

const FIELDS: &[(&str, &str)] = &[
    ("document_number", "Document number"),
    ("letterhead_authority", "Letterhead authority"),
    ("stamp_authority", "Stamp authority"),
    ("stamp_location", "Stamp location"),
    ("signatures_count", "Signatures"),
    ("signatures_have_titles", "Signatures have titles"),
    ("signatures_details", "Signature details"),
    ("property_address", "Property address"),
    ("owner_name", "Owner"),
    ("owner_names", "Owners"),
    ("ownership_shares", "Ownership shares"),
    ("damage_date", "Damage date"),
    ("act_date", "Act date"),
    ("damage_description", "Damage description"),
    ("damage_cause", "Damage cause"),
    ("damage_type", "Damage type"),
    ("damage_severity", "Damage severity"),
    ("damaged_objects", "Damaged objects"),
    ("witnesses_count", "Witnesses"),
    ("witnesses_names", "Witness names"),
    ("has_osbb_stamp", "HOA stamp"),
    ("osbb_name", "HOA name"),
    ("has_government_stamp", "Government stamp"),
    ("photo_count", "Photos"),
    ("photos_analysis", "Photo analysis"),
    ("overall_damage_visible", "Damage visible"),
    ("damage_types_found", "Damage types"),
    ("appears_to_be_same_location", "Same location"),
    ("screenshots_detected", "Screenshots detected"),
    ("editing_signs_detected", "Signs of editing"),
    ("document_subtype", "Document subtype"),
    ("country", "Country"),
    ("holder_name", "Holder"),
    ("date_of_birth", "Date of birth"),
    ("issue_date", "Issue date"),
    ("expiry_date", "Expiry date"),
    ("has_photo", "Has photo"),
    ("photo_appears_genuine", "Photo appears genuine"),
    ("data_readable", "Data readable"),
    ("property_type", "Property type"),
    ("property_area", "Property area"),
    ("registry_name", "Registry"),
    ("account_holder", "Account holder"),
    ("account_number", "Account number"),
    ("amount", "Amount"),
    ("currency", "Currency"),
    ("billing_period", "Billing period"),
    ("provider_name", "Provider"),
    ("service_address", "Service address"),
    ("service_type", "Service type"),
    ("appears_authentic", "Appears authentic"),
    ("authenticity_concerns", "Authenticity concerns"),
    ("photo_type", "Photo type"),
    ("photo_quality", "Photo quality"),
    ("visible_damage", "Visible damage"),
    ("visible_address", "Visible address"),
    ("location_description", "Location"),
    ("location_in_building", "Location in building"),
    ("identifiable_features", "Identifiable features"),
    ("condition", "Condition"),
    ("content_shown", "Content shown"),
    ("content_summary", "Summary"),
    ("document_date", "Document date"),
    ("document_type_visible", "Visible document type"),
    ("text_readable", "Text readable"),
    ("readable_data", "Readable data"),
    ("has_qr_code", "QR code"),
    ("visible_stamps", "Visible stamps"),
    ("visible_signatures", "Visible signatures"),
    ("face_visible", "Face visible"),
    ("screenshot_source", "Screenshot source"),
    ("key_information", "Key information"),
    ("contains_relevant_info", "Relevant information"),
    ("perspective_issues", "Perspective issues"),
    // validation metadata
    ("producer", "Producer"),
    ("creator", "Creator"),
    ("author", "Author"),
    ("creation_date", "Created"),
    ("modification_date", "Modified"),
    ("page_count", "Pages"),
    ("software", "Software"),
    ("camera_make", "Camera make"),
    ("camera_model", "Camera model"),
    ("datetime_original", "Taken"),
    ("gps_latitude", "GPS latitude"),
    ("gps_longitude", "GPS longitude"),
];

/// `official_certificate` → `Official certificate`; unknown types are humanized.
pub fn document_type_label(key: &str) -> String {
    lookup(DOCUMENT_TYPES, key).unwrap_or_else(|| humanize(key))
}

/// Label for an extracted-data key.
pub fn field_label(key: &str) -> String {
    lookup(FIELDS, key).unwrap_or_else(|| humanize(key))
}

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    let key = key.trim();
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, label)| (*label).to_string())
}

/// `some_key_name` → `Some key name`.
pub fn humanize(key: &str) -> String {
    let words = key
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("official_certificate", "Official certificate")]
    #[case("DAMAGE_ACT", "Damage act")]
    #[case("before_after", "Before/after comparison")]
    #[case("insurance_policy", "Insurance policy")]
    fn document_types(#[case] key: &str, #[case] label: &str) {
        assert_eq!(document_type_label(key), label);
    }

    #[rstest]
    #[case("owner_names", "Owners")]
    #[case("has_osbb_stamp", "HOA stamp")]
    #[case("policy_holder_id", "Policy holder id")]
    #[case("__", PLACEHOLDER)]
    fn field_labels(#[case] key: &str, #[case] label: &str) {
        assert_eq!(field_label(key), label);
    }
}
