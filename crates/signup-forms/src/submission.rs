//! Submitted values and the payload handed to the remote client

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A submitted or coerced field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single string
    Text(String),
    /// Several strings, e.g. a checkbox set
    Multi(Vec<String>),
}

impl FieldValue {
    /// Whether the value carries anything
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Multi(values) => values.iter().all(|v| v.is_empty()),
        }
    }

    /// Single string, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Multi(_) => None,
        }
    }

    /// Non-empty strings in submission order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Text(s) => std::slice::from_ref(s),
            Self::Multi(values) => values,
        };
        slice.iter().map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

/// Raw visitor submission for one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Values keyed by field tag
    #[serde(default, alias = "custom")]
    pub fields: BTreeMap<String, FieldValue>,
    /// Group selections keyed by grouping id
    #[serde(default)]
    pub groups: BTreeMap<String, FieldValue>,
}

impl Submission {
    /// Empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field value
    pub fn field(mut self, tag: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(tag.into(), value.into());
        self
    }

    /// Add a group selection
    pub fn group(mut self, grouping: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.groups.insert(grouping.into(), value.into());
        self
    }

    /// Non-empty value for a tag
    pub fn value(&self, tag: &str) -> Option<&FieldValue> {
        self.fields.get(tag).filter(|v| !v.is_empty())
    }
}

/// Normalized subscriber payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPayload {
    /// Subscriber email
    pub email: String,
    /// Target list
    pub list_id: String,
    /// Tag applied at signup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// Group identifiers
    pub groups: Vec<String>,
    /// Coerced merge fields keyed by tag
    pub custom_fields: BTreeMap<String, FieldValue>,
}
