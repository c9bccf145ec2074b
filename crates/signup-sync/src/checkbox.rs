//! Opt-in checkboxes on registration and comment forms

use crate::client::SubscriptionClient;
use crate::error::{ClientError, SyncResult};
use crate::requests::SubscribeRequest;
use crate::sync::SiteUser;
use serde::{Deserialize, Serialize};
use signup_common::settings::CheckboxTarget;
use signup_common::Settings;
use std::sync::Arc;
use tracing::{debug, info};

/// Moderation state of a posted comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentApproval {
    /// Published
    Approved,
    /// Awaiting moderation
    Pending,
    /// Marked as spam; never subscribed
    Spam,
}

/// Subscribes visitors who ticked the signup checkbox
pub struct CheckboxSignup<C> {
    settings: Arc<Settings>,
    client: Arc<C>,
}

impl<C: SubscriptionClient> CheckboxSignup<C> {
    /// Create handler
    pub fn new(settings: Arc<Settings>, client: Arc<C>) -> Self {
        Self { settings, client }
    }

    /// Whether the checkbox is rendered on `target`
    pub fn is_enabled(&self, target: CheckboxTarget) -> bool {
        self.list(target).is_some()
    }

    /// New user registered; returns whether a subscription was made
    pub async fn on_registration(&self, user: &SiteUser, ticked: bool) -> SyncResult<bool> {
        let Some(list_id) = self.list(CheckboxTarget::Registration).filter(|_| ticked) else {
            return Ok(false);
        };
        let fields = &self.settings.sync.fields;

        let request = SubscribeRequest::new(list_id, &user.email)
            .with_options(&self.settings.general)
            .with_merge_field(&fields.first_name, user.first_name())
            .with_merge_field(&fields.last_name, user.last_name())
            .with_merge_field(&fields.role, user.primary_role().unwrap_or_default())
            .with_merge_field(&fields.username, user.login.as_str());

        self.deliver(&request).await
    }

    /// Comment posted; returns whether a subscription was made
    pub async fn on_comment(
        &self,
        email: &str,
        approval: CommentApproval,
        ticked: bool,
    ) -> SyncResult<bool> {
        let Some(list_id) = self.list(CheckboxTarget::Comments).filter(|_| ticked) else {
            return Ok(false);
        };

        if approval == CommentApproval::Spam {
            debug!("Ignoring signup checkbox on spam comment");
            return Ok(false);
        }

        let request = SubscribeRequest::new(list_id, email).with_options(&self.settings.general);
        self.deliver(&request).await
    }

    async fn deliver(&self, request: &SubscribeRequest) -> SyncResult<bool> {
        match self.client.subscribe(request).await {
            Ok(_) => {
                info!("Checkbox signup: {} subscribed to list {}", request.email, request.list_id);
                Ok(true)
            }
            Err(ClientError::AlreadySubscribed { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, target: CheckboxTarget) -> Option<&str> {
        let checkbox = &self.settings.checkbox;
        if !self.settings.is_integrated() || !checkbox.add_to.contains(&target) {
            return None;
        }
        checkbox.list.as_deref().filter(|l| !l.is_empty())
    }
}
