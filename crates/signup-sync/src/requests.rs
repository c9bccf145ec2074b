//! Requests sent to the remote list service

use serde::{Deserialize, Serialize};
use signup_common::settings::GeneralSettings;
use signup_common::{fold_groupings, Grouping};
use signup_forms::{FieldValue, SubscriptionPayload};
use std::collections::BTreeMap;

/// Merge field carrying a changed email address on update
pub const NEW_EMAIL_FIELD: &str = "new-email";

/// Add an address to a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    /// Target list
    pub list_id: String,
    /// Subscriber email
    pub email: String,
    /// Groups folded per grouping
    #[serde(default)]
    pub groupings: Vec<Grouping>,
    /// Merge fields keyed by field id
    #[serde(default)]
    pub merge_fields: BTreeMap<String, FieldValue>,
    /// Tag applied at signup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// Enroll into autoresponders
    #[serde(default)]
    pub add_to_autoresponders: bool,
    /// Update the subscriber instead of failing when already listed
    #[serde(default)]
    pub update_existing: bool,
}

impl SubscribeRequest {
    /// Bare request for `email` on `list_id`
    pub fn new(list_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            email: email.into(),
            groupings: Vec::new(),
            merge_fields: BTreeMap::new(),
            tag_id: None,
            add_to_autoresponders: false,
            update_existing: false,
        }
    }

    /// Request for a coerced form submission
    pub fn from_payload(payload: SubscriptionPayload, general: &GeneralSettings) -> Self {
        Self {
            groupings: fold_groupings(&payload.groups),
            merge_fields: payload.custom_fields,
            tag_id: payload.tag_id,
            ..Self::new(payload.list_id, payload.email)
        }
        .with_options(general)
    }

    /// Apply site-wide subscription options
    pub fn with_options(mut self, general: &GeneralSettings) -> Self {
        self.add_to_autoresponders = general.add_to_autoresponders;
        self.update_existing = general.update_existing;
        self
    }

    /// Set a merge field, skipping empty values
    pub fn with_merge_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.merge_fields.insert(key.into(), value);
        }
        self
    }
}

/// Update an existing subscriber found by sync key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Target list
    pub list_id: String,
    /// Key returned when the subscriber was created
    pub sync_key: String,
    /// Groups folded per grouping
    #[serde(default)]
    pub groupings: Vec<Grouping>,
    /// Changed merge fields; a new address goes under [`NEW_EMAIL_FIELD`]
    #[serde(default)]
    pub merge_fields: BTreeMap<String, FieldValue>,
    /// Replace the subscriber's groups instead of adding to them
    #[serde(default)]
    pub replace_groups: bool,
}

impl UpdateRequest {
    /// Empty update for `sync_key`
    pub fn new(list_id: impl Into<String>, sync_key: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            sync_key: sync_key.into(),
            groupings: Vec::new(),
            merge_fields: BTreeMap::new(),
            replace_groups: false,
        }
    }

    /// Set a merge field; empty values clear it remotely
    pub fn with_merge_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.merge_fields.insert(key.into(), value.into());
        self
    }

    /// Whether there is anything to send
    pub fn is_empty(&self) -> bool {
        self.groupings.is_empty() && self.merge_fields.is_empty()
    }

    /// New address, if the update changes it
    pub fn new_email(&self) -> Option<&str> {
        self.merge_fields.get(NEW_EMAIL_FIELD).and_then(FieldValue::as_text)
    }
}

/// How a subscriber is identified
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberHandle {
    /// By address
    Email(String),
    /// By key returned on subscribe
    SyncKey(String),
}

/// Remove a subscriber from a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    /// Target list
    pub list_id: String,
    /// Subscriber
    pub handle: SubscriberHandle,
}

impl UnsubscribeRequest {
    /// Unsubscribe by sync key
    pub fn by_sync_key(list_id: impl Into<String>, sync_key: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            handle: SubscriberHandle::SyncKey(sync_key.into()),
        }
    }

    /// Unsubscribe by address
    pub fn by_email(list_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            handle: SubscriberHandle::Email(email.into()),
        }
    }
}
