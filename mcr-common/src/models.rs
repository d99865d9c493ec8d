//! Data model shared between the upstream client and the report pipeline
//!
//! `Record` and `CustomField` deserialize straight from the task payloads the
//! upstream API returns; `ClassifiedRecord` is the reduced row that ends up in
//! the report.

use serde::{Deserialize, Deserializer, Serialize};

/// Named custom field attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomField {
    #[serde(default)]
    pub name: String,
    /// Rendered value; `None` when the field is unset upstream
    #[serde(default)]
    pub display_value: Option<String>,
}

impl CustomField {
    pub fn new(name: impl Into<String>, display_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            display_value: display_value.map(str::to_string),
        }
    }
}

/// A task representing one client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_fields: Vec<CustomField>,
}

impl Record {
    pub fn new(name: impl Into<String>, custom_fields: Vec<CustomField>) -> Self {
        Self {
            name: name.into(),
            custom_fields,
        }
    }
}

/// Grouping entity (portfolio member or project) that owns records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    /// Workspace scope required by assignee-based task lookups
    pub workspace: Option<String>,
}

impl Container {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workspace: None,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }
}

/// Record reduced to the report columns plus its missing-contact diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassifiedRecord {
    pub name: String,
    pub segmentation: String,
    /// One of "Phone", "Email" or "Phone Email"
    pub missing: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
