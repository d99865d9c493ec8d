//! Custom field extraction
//!
//! Resolves segmentation, email and phone from a record's custom fields.
//! Field names come from the [`FieldNames`] mapping; the scan is a fold over
//! the field list, so a later duplicate name overwrites an earlier one.

use mcr_common::config::FieldNames;
use mcr_common::CustomField;

/// Segmentation used when the field is missing or blank
pub const UNKNOWN_SEGMENTATION: &str = "Unknown";

/// Contact and segmentation values pulled from one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub segmentation: String,
    pub email: String,
    pub phone: String,
}

/// Extract the three report fields from a record's custom fields
pub fn extract(fields: &[CustomField], names: &FieldNames) -> ExtractedFields {
    let mut segmentation = String::new();
    let mut email = String::new();
    let mut phone = String::new();

    for field in fields {
        let value = field.display_value.as_deref().unwrap_or_default();

        if field.name == names.segmentation {
            segmentation = value.to_string();
        }
        if field.name == names.email {
            email = value.to_string();
        }
        if field.name == names.phone {
            phone = value.to_string();
        }
    }

    if segmentation.is_empty() {
        segmentation = UNKNOWN_SEGMENTATION.to_string();
    }

    ExtractedFields {
        segmentation,
        email,
        phone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: Option<&str>) -> CustomField {
        CustomField::new(name, value)
    }

    #[test]
    fn test_extract_all_present() {
        let fields = vec![
            field("Lead Client Segmentation", Some("B")),
            field("HOH Email", Some("a@example.com")),
            field("Phone Number", Some("555-1234")),
        ];

        let extracted = extract(&fields, &FieldNames::default());
        assert_eq!(extracted.segmentation, "B");
        assert_eq!(extracted.email, "a@example.com");
        assert_eq!(extracted.phone, "555-1234");
    }

    #[test]
    fn test_extract_empty_fields_uses_defaults() {
        let extracted = extract(&[], &FieldNames::default());
        assert_eq!(extracted.segmentation, "Unknown");
        assert_eq!(extracted.email, "");
        assert_eq!(extracted.phone, "");
    }

    #[test]
    fn test_blank_segmentation_becomes_unknown() {
        let fields = vec![field("Lead Client Segmentation", Some(""))];
        assert_eq!(extract(&fields, &FieldNames::default()).segmentation, "Unknown");

        let fields = vec![field("Lead Client Segmentation", None)];
        assert_eq!(extract(&fields, &FieldNames::default()).segmentation, "Unknown");
    }

    #[test]
    fn test_last_duplicate_wins() {
        let fields = vec![
            field("HOH Email", Some("first@example.com")),
            field("Lead Client Segmentation", Some("A")),
            field("HOH Email", Some("second@example.com")),
            field("Lead Client Segmentation", None),
        ];

        let extracted = extract(&fields, &FieldNames::default());
        assert_eq!(extracted.email, "second@example.com");
        assert_eq!(extracted.segmentation, "Unknown");
    }

    #[test]
    fn test_later_empty_duplicate_clears_value() {
        let fields = vec![
            field("Phone Number", Some("555-1234")),
            field("Phone Number", None),
        ];
        assert_eq!(extract(&fields, &FieldNames::default()).phone, "");
    }

    #[test]
    fn test_unrelated_fields_ignored() {
        let fields = vec![
            field("Priority", Some("High")),
            field("hoh email", Some("case@example.com")),
        ];
        let extracted = extract(&fields, &FieldNames::default());
        assert_eq!(extracted.email, "");
    }

    #[test]
    fn test_custom_field_names() {
        let names = FieldNames {
            segmentation: "Tier".to_string(),
            email: "Email".to_string(),
            phone: "Mobile".to_string(),
        };
        let fields = vec![
            field("Tier", Some("Red Flag")),
            field("Mobile", Some("07700 900000")),
            field("HOH Email", Some("ignored@example.com")),
        ];

        let extracted = extract(&fields, &names);
        assert_eq!(extracted.segmentation, "Red Flag");
        assert_eq!(extracted.phone, "07700 900000");
        assert_eq!(extracted.email, "");
    }
}
