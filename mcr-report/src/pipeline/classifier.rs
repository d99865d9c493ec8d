//! Missing-contact classification

use mcr_common::ClassifiedRecord;

use super::extractor::ExtractedFields;

const PHONE_TOKEN: &str = "Phone";
const EMAIL_TOKEN: &str = "Email";

/// Classify a record; `None` when both phone and email are present
pub fn classify(name: &str, fields: ExtractedFields) -> Option<ClassifiedRecord> {
    let missing = missing_description(&fields.email, &fields.phone)?;

    Some(ClassifiedRecord {
        name: name.to_string(),
        segmentation: fields.segmentation,
        missing,
    })
}

/// Describe which contact fields are empty, phone first
pub fn missing_description(email: &str, phone: &str) -> Option<String> {
    match (phone.is_empty(), email.is_empty()) {
        (false, false) => None,
        (true, false) => Some(PHONE_TOKEN.to_string()),
        (false, true) => Some(EMAIL_TOKEN.to_string()),
        (true, true) => Some(format!("{} {}", PHONE_TOKEN, EMAIL_TOKEN)),
    }
}
