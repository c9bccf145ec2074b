//! Settings loading and normalization
//!
//! Settings live in a single TOML file. Every key is optional and falls
//! back to the default the admin page ships with:
//!
//! ```toml
//! [integration]
//! api_url = "https://mail.example.com/xml.php"
//! username = "admin"
//! api_key = "secret"
//!
//! [localization]
//! date_format = 7       # yyyy-mm-dd
//! birthday_format = 4   # mm-dd
//!
//! [[forms]]
//! title = "Newsletter"
//! list = "12"
//! condition = { key = "pages_not", value = [42] }
//! fields = [{ tag = "email", type = "email", req = true }]
//! ```

use crate::condition::Condition;
use crate::dates::{BirthdayFormat, DateFormat};
use crate::error::{SettingsError, SettingsResult};
use crate::form::FormDefinition;
use crate::value_objects::{parse_form_id_list, FormId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Remote service credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// XML API endpoint
    pub api_url: Option<String>,
    /// Account username
    pub username: Option<String>,
    /// API token
    pub api_key: Option<String>,
}

/// Subscription behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Send the list welcome email
    pub send_welcome: bool,
    /// Replace groups instead of merging them on update
    pub replace_groups: bool,
    /// Enroll new subscribers into autoresponders
    pub add_to_autoresponders: bool,
    /// Update subscribers that already exist instead of reporting them
    pub update_existing: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            send_welcome: true,
            replace_groups: false,
            add_to_autoresponders: false,
            update_existing: true,
        }
    }
}

/// Presentation options handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingSettings {
    /// Labels rendered inside inputs
    pub labels_inline: bool,
    /// Max form width in pixels
    pub width_limit: Option<u32>,
    /// Custom CSS appended to the page
    pub css_override: String,
}

impl Default for StylingSettings {
    fn default() -> Self {
        Self {
            labels_inline: true,
            width_limit: None,
            css_override: ".pinpointe_custom_css {}".into(),
        }
    }
}

/// Views the popup may open on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupTarget {
    /// Front page
    FrontPage,
    /// Static pages other than the front page
    Pages,
    /// Single posts
    Posts,
    /// Everything else
    Other,
}

/// Popup options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupSettings {
    /// Popup enabled
    pub enabled: bool,
    /// Form shown in the popup
    pub form: Option<FormId>,
    /// Seconds before the popup opens
    pub delay_secs: Option<u32>,
    /// Views the popup opens on
    pub display_on: BTreeSet<PopupTarget>,
    /// Page views to skip after the popup was shown
    pub page_limit: u32,
    /// Minutes to wait before showing the popup again
    pub time_limit_mins: u32,
    /// Offer a "never show again" link
    pub allow_dismissing: bool,
    /// Text of that link
    pub label_dismiss: String,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            form: None,
            delay_secs: Some(5),
            display_on: BTreeSet::from([PopupTarget::FrontPage]),
            page_limit: 1,
            time_limit_mins: 5,
            allow_dismissing: true,
            label_dismiss: "Never display this again".into(),
        }
    }
}

/// Views that get a form appended below the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterContentTarget {
    /// Single posts
    Posts,
    /// Static pages
    Pages,
}

/// Below-content placement options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterPostsSettings {
    /// Views that get the form
    pub post_types: BTreeSet<AfterContentTarget>,
    /// Comma separated form ids, empty for any
    pub allowed_forms: String,
}

/// Content lock options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Content locking enabled
    pub enabled: bool,
    /// Form replacing locked content
    pub form: Option<FormId>,
    /// Lock heading
    pub title: String,
    /// Lock message
    pub message: String,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            form: None,
            title: "Subscribe To Unlock".into(),
            message: "Subscribe now to become a premium member and gain access to premium content."
                .into(),
        }
    }
}

/// Host forms that may carry a signup checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxTarget {
    /// User registration form
    Registration,
    /// Comment form
    Comments,
}

/// Signup checkbox options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckboxSettings {
    /// Host forms carrying the checkbox
    pub add_to: BTreeSet<CheckboxTarget>,
    /// Checkbox label
    pub label: String,
    /// Pre-ticked
    pub checked_by_default: bool,
    /// Target list
    pub list: Option<String>,
}

impl Default for CheckboxSettings {
    fn default() -> Self {
        Self {
            add_to: BTreeSet::new(),
            label: "Subscribe to our newsletter".into(),
            checked_by_default: false,
            list: None,
        }
    }
}

/// Merge-field keys used when pushing user profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncFieldMap {
    /// First name field
    pub first_name: String,
    /// Last name field
    pub last_name: String,
    /// Primary role field
    pub role: String,
    /// Login name field
    pub username: String,
}

impl Default for SyncFieldMap {
    fn default() -> Self {
        Self {
            first_name: "2".into(),
            last_name: "3".into(),
            role: "ROLE".into(),
            username: "USERNAME".into(),
        }
    }
}

/// User sync options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Roles whose users are synced
    pub roles: Vec<String>,
    /// Target list
    pub list: Option<String>,
    /// Merge-field keys
    pub fields: SyncFieldMap,
}

/// Input patterns for date-like fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localization {
    /// Date field pattern
    pub date_format: DateFormat,
    /// Birthday field pattern
    pub birthday_format: BirthdayFormat,
}

/// Visitor-facing messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Subscribed successfully
    pub success: String,
    /// Required field empty
    pub empty_field: String,
    /// Invalid format
    pub invalid_format: String,
    /// Value not a number
    pub not_number: String,
    /// Already subscribed
    pub already_subscribed: String,
    /// Anything else
    pub error: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            success: "Thank you for signing up!".into(),
            empty_field: "Please enter a value".into(),
            invalid_format: "Invalid format".into(),
            not_number: "Please enter a valid number".into(),
            already_subscribed: "You are already subscribed to this list".into(),
            error: "Unknown error. Please try again later.".into(),
        }
    }
}

/// Complete settings snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote credentials
    pub integration: IntegrationSettings,
    /// Subscription behavior
    pub general: GeneralSettings,
    /// Presentation
    pub styling: StylingSettings,
    /// Popup placement
    pub popup: PopupSettings,
    /// Below-content placement
    pub after_posts: AfterPostsSettings,
    /// Content lock
    pub lock: LockSettings,
    /// Signup checkboxes
    pub checkbox: CheckboxSettings,
    /// User sync
    pub sync: SyncSettings,
    /// Date patterns
    pub localization: Localization,
    /// Messages
    pub labels: Labels,
    /// Signup forms in registry order
    pub forms: Vec<FormDefinition>,
}

impl Settings {
    /// Load, normalize and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse, normalize and validate settings text
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        for warning in settings.normalize() {
            warn!("{}", warning);
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Bring forms into canonical shape, returning what was changed
    ///
    /// - forms are renumbered densely from 1 in order
    /// - fields without a tag are dropped
    /// - id-list and URL conditions without a value become `Always`
    pub fn normalize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (position, form) in self.forms.iter_mut().enumerate() {
            let id = FormId::from_position(position);
            // a missing id reads as 1, so only other declared ids are reported
            if form.id != id {
                if form.id != FormId::from_position(0) {
                    warnings.push(format!(
                        "form {}: declared id {} replaced by its position",
                        id, form.id
                    ));
                }
                debug!("Renumbering form {} to {}", form.id, id);
                form.id = id;
            }

            let before = form.fields.len();
            form.fields.retain(|f| !f.tag.trim().is_empty());
            if form.fields.len() != before {
                warnings.push(format!(
                    "form {}: dropped {} field(s) without a tag",
                    id,
                    before - form.fields.len()
                ));
            }

            if form.condition.is_degenerate() {
                warnings.push(format!(
                    "form {}: condition {} has no value, showing always",
                    id,
                    form.condition.key()
                ));
                form.condition = Condition::Always;
            }

            if form.is_active() && !form.is_complete() {
                warnings.push(format!("form {}: expected exactly one email field", id));
            }
        }

        warnings
    }

    /// Check cross-references and formats
    pub fn validate(&self) -> SettingsResult<()> {
        let allowed = self.after_posts.allowed_forms.trim();
        if !allowed.is_empty() {
            let format = Regex::new(r"^([0-9]+,?)+$")
                .map_err(|e| SettingsError::invalid("after_posts.allowed_forms", e.to_string()))?;
            if !format.is_match(allowed) {
                return Err(SettingsError::invalid(
                    "after_posts.allowed_forms",
                    "is not in a valid format",
                ));
            }
        }

        for (key, form) in [("popup.form", self.popup.form), ("lock.form", self.lock.form)] {
            if let Some(id) = form {
                if self.form(id).is_none() {
                    return Err(SettingsError::invalid(key, self.missing_form(id)));
                }
            }
        }

        for form in &self.forms {
            let mut tags = HashSet::new();
            for field in &form.fields {
                if !tags.insert(field.tag.as_str()) {
                    return Err(SettingsError::invalid(
                        format!("forms.{}.fields", form.id),
                        format!("duplicate field tag {}", field.tag),
                    ));
                }
            }
        }

        Ok(())
    }

    fn missing_form(&self, id: FormId) -> String {
        format!(
            "form {} does not exist (forms are numbered by position, 1 to {})",
            id,
            self.forms.len()
        )
    }

    /// Whether the remote integration is configured
    pub fn is_integrated(&self) -> bool {
        self.integration
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Whether placements have anything to work with
    pub fn has_forms(&self) -> bool {
        self.is_integrated() && !self.forms.is_empty()
    }

    /// Form by id
    pub fn form(&self, id: FormId) -> Option<&FormDefinition> {
        self.forms.iter().find(|f| f.id == id)
    }

    /// Allow-list for the below-content placement
    pub fn after_posts_allowed_forms(&self) -> Vec<FormId> {
        parse_form_id_list(&self.after_posts.allowed_forms)
    }

    /// `(id, "#id - title")` pairs for form pickers
    pub fn form_choices(&self) -> Vec<(FormId, String)> {
        if !self.is_integrated() {
            return Vec::new();
        }
        self.forms
            .iter()
            .map(|f| (f.id, format!("#{} - {}", f.id, f.title.as_deref().unwrap_or_default())))
            .collect()
    }
}
