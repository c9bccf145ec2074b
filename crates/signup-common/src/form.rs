//! Signup form definitions
//!
//! A form is configuration data: what to show, which remote list new
//! subscribers land in, and which fields to collect.

use crate::condition::Condition;
use crate::value_objects::FormId;
use serde::{Deserialize, Serialize};

/// Form color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Red
    Red,
    /// Orange
    Orange,
    /// Yellow
    Yellow,
    /// Green
    Green,
    /// Cyan (default)
    #[default]
    Cyan,
    /// Blue
    Blue,
    /// Purple
    Purple,
    /// Pink
    Pink,
    /// Black
    Black,
}

/// How interest groups are assigned to new subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMethod {
    /// Configured groups are assigned automatically
    #[default]
    Auto,
    /// Visitor may tick any number of groups per grouping
    Multi,
    /// One radio choice per grouping, optional
    Single,
    /// One radio choice per grouping, required
    SingleReq,
    /// One dropdown choice per grouping, optional
    Select,
    /// One dropdown choice per grouping, required
    SelectReq,
}

impl GroupMethod {
    /// Whether the visitor picks groups themselves
    pub fn is_visitor_selected(&self) -> bool {
        !matches!(self, Self::Auto)
    }

    /// Whether every offered grouping needs a selection
    pub fn is_required(&self) -> bool {
        matches!(self, Self::SingleReq | Self::SelectReq)
    }
}

/// Remote merge-field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Subscriber email address
    Email,
    /// Free text
    Text,
    /// Numeric input
    Number,
    /// Dropdown over `choices`
    Dropdown,
    /// Radio buttons over `choices`
    RadioButton,
    /// Checkbox set over `choices`
    Checkbox,
    /// Full date, parsed with the configured date pattern
    Date,
    /// Month and day, parsed with the configured birthday pattern
    Birthday,
    /// Phone number
    Phone,
    /// Web address
    Url,
    /// Postal code
    ZipCode,
    /// Postal address
    Address,
    /// Image address
    ImageUrl,
}

impl FieldType {
    /// Whether the field is backed by `choices`
    pub fn has_choices(&self) -> bool {
        matches!(self, Self::Dropdown | Self::RadioButton | Self::Checkbox)
    }
}

/// One configured option of a choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Submitted key
    pub key: String,
    /// Label forwarded to the remote service
    pub label: String,
}

impl Choice {
    /// Create new choice
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A single form field bound to a remote merge field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Remote merge-field identifier, unique within the form
    pub tag: String,
    /// Display name
    #[serde(default, alias = "name")]
    pub label: String,
    /// Decorative icon identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Submission fails when the value is missing
    #[serde(default, alias = "req")]
    pub required: bool,
    /// Use US phone formatting (phone fields only)
    #[serde(default, alias = "us_phone")]
    pub us_phone_format: bool,
    /// Ordered choices for dropdown/radio/checkbox fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl FieldDefinition {
    /// Create a field with no choices
    pub fn new(tag: impl Into<String>, field_type: FieldType) -> Self {
        let tag = tag.into();
        Self {
            label: tag.clone(),
            tag,
            icon: None,
            field_type,
            required: false,
            us_phone_format: false,
            choices: Vec::new(),
        }
    }

    /// Mark field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set choices
    pub fn with_choices<I, K, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        self.choices = choices.into_iter().map(|(k, l)| Choice::new(k, l)).collect();
        self
    }

    /// Label configured for a submitted choice key
    pub fn choice_label(&self, key: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.label.as_str())
    }
}

/// A configured signup form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Registry id, assigned from position on load
    #[serde(default = "default_form_id")]
    pub id: FormId,
    /// Heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Text above the fields
    #[serde(default, alias = "above", skip_serializing_if = "Option::is_none")]
    pub above_text: Option<String>,
    /// Text below the fields
    #[serde(default, alias = "below", skip_serializing_if = "Option::is_none")]
    pub below_text: Option<String>,
    /// Submit button label
    #[serde(default, alias = "button", skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
    /// Where to send the visitor after subscribing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Palette
    #[serde(default)]
    pub color_scheme: ColorScheme,
    /// Target mailing list; a form without one is inert
    #[serde(default, alias = "list", skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    /// Tag applied at signup
    #[serde(default, alias = "tag", skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// Group identifiers, `grouping%%%grouping name%%%group`
    #[serde(default)]
    pub groups: Vec<String>,
    /// Group assignment method
    #[serde(default)]
    pub group_method: GroupMethod,
    /// Fields in display order
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Display condition
    #[serde(default)]
    pub condition: Condition,
}

fn default_form_id() -> FormId {
    FormId::from_position(0)
}

impl FormDefinition {
    /// Create an unconditional form targeting `list_id`
    pub fn new(id: FormId, list_id: impl Into<String>) -> Self {
        Self {
            id,
            title: None,
            above_text: None,
            below_text: None,
            button_label: None,
            redirect_url: None,
            color_scheme: ColorScheme::default(),
            list_id: Some(list_id.into()),
            tag_id: None,
            groups: Vec::new(),
            group_method: GroupMethod::default(),
            fields: Vec::new(),
            condition: Condition::Always,
        }
    }

    /// Add field
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Set display condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Target list if one is configured
    pub fn list(&self) -> Option<&str> {
        self.list_id.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Tag if one is configured
    pub fn tag(&self) -> Option<&str> {
        self.tag_id.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether the form may be shown or submitted at all
    pub fn is_active(&self) -> bool {
        !self.condition.is_disabled() && self.list().is_some()
    }

    /// Exactly one email field present
    pub fn is_complete(&self) -> bool {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Email)
            .count()
            == 1
    }

    /// Look up a field by tag
    pub fn field(&self, tag: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inert_without_list() {
        let mut form = FormDefinition::new(FormId::new(1).unwrap(), "list-1");
        assert!(form.is_active());

        form.list_id = Some("  ".into());
        assert!(!form.is_active());

        form.list_id = None;
        assert!(!form.is_active());
    }

    #[test]
    fn test_disabled_is_inactive() {
        let form = FormDefinition::new(FormId::new(1).unwrap(), "list-1")
            .with_condition(Condition::Disabled);
        assert!(!form.is_active());
    }

    #[test]
    fn test_completeness() {
        let form = FormDefinition::new(FormId::new(1).unwrap(), "list-1")
            .with_field(FieldDefinition::new("EMAIL", FieldType::Email).required());
        assert!(form.is_complete());

        let doubled = form.clone().with_field(FieldDefinition::new("ALT", FieldType::Email));
        assert!(!doubled.is_complete());
    }

    #[test]
    fn test_choice_label() {
        let field = FieldDefinition::new("FRUIT", FieldType::Dropdown)
            .with_choices([("a", "Apple"), ("b", "Banana")]);
        assert_eq!(field.choice_label("b"), Some("Banana"));
        assert_eq!(field.choice_label("z"), None);
    }

    #[test]
    fn test_group_method_flags() {
        assert!(!GroupMethod::Auto.is_visitor_selected());
        assert!(GroupMethod::Multi.is_visitor_selected());
        assert!(GroupMethod::SelectReq.is_required());
        assert!(!GroupMethod::Single.is_required());
    }
}
