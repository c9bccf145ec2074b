//! Visitor form submissions

use crate::client::SubscriptionClient;
use crate::error::ClientError;
use crate::requests::SubscribeRequest;
use serde::{Deserialize, Serialize};
use signup_common::{FormId, Settings};
use signup_forms::{FieldCoercer, FormRegistry, Submission};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Response returned to the submitting page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// 0 on success, 1 otherwise
    pub error: u8,
    /// Message shown to the visitor
    pub message: String,
    /// Where to send the visitor next
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl SubmissionResponse {
    /// Successful subscription
    pub fn success(message: impl Into<String>, redirect_url: Option<String>) -> Self {
        Self {
            error: 0,
            message: message.into(),
            redirect_url,
        }
    }

    /// Failed subscription
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: 1,
            message: message.into(),
            redirect_url: None,
        }
    }

    /// Whether the submission failed
    pub fn is_error(&self) -> bool {
        self.error != 0
    }
}

/// Handles form submissions against the current settings and forms
pub struct SubmissionService<C> {
    settings: Arc<Settings>,
    registry: Arc<FormRegistry>,
    client: Arc<C>,
}

impl<C: SubscriptionClient> SubmissionService<C> {
    /// Create service
    pub fn new(settings: Arc<Settings>, registry: Arc<FormRegistry>, client: Arc<C>) -> Self {
        Self {
            settings,
            registry,
            client,
        }
    }

    /// Validate and deliver one submission
    pub async fn submit(&self, form_id: FormId, submission: &Submission) -> SubmissionResponse {
        let labels = &self.settings.labels;

        if !self.settings.is_integrated() || self.registry.is_empty() {
            warn!("Submission to form {} while integration is not configured", form_id);
            return SubmissionResponse::failure(&labels.error);
        }

        let Some(form) = self.registry.get(form_id) else {
            debug!("Submission to unknown form {}", form_id);
            return SubmissionResponse::failure(&labels.error);
        };

        let payload = match FieldCoercer::new(self.settings.localization).build(&form, submission) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Submission to form {} rejected: {}", form_id, e);
                return SubmissionResponse::failure(&labels.error);
            }
        };

        let request = SubscribeRequest::from_payload(payload, &self.settings.general);

        match self.client.subscribe(&request).await {
            Ok(_) => {
                info!(
                    "Subscribed {} to list {} via form {}",
                    request.email, request.list_id, form_id
                );
                let redirect = form.redirect_url.clone().filter(|u| !u.is_empty());
                SubmissionResponse::success(&labels.success, redirect)
            }
            Err(ClientError::AlreadySubscribed { .. }) if !request.update_existing => {
                info!("{} already subscribed to list {}", request.email, request.list_id);
                SubmissionResponse::failure(&labels.already_subscribed)
            }
            Err(e) => {
                warn!("Subscribe via form {} failed: {}", form_id, e);
                SubmissionResponse::failure(&labels.error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemorySubscriptionClient;
    use signup_common::{FieldDefinition, FieldType, FormDefinition, GroupMethod};

    fn settings(update_existing: bool) -> Settings {
        let mut settings = Settings::default();
        settings.integration.api_key = Some("key".into());
        settings.general.update_existing = update_existing;

        let mut form = FormDefinition::new(FormId::from_position(0), "L1")
            .with_field(FieldDefinition::new("email", FieldType::Email).required())
            .with_field(FieldDefinition::new("NAME", FieldType::Text).required());
        form.redirect_url = Some("https://example.com/thanks".into());
        form.group_method = GroupMethod::Auto;
        form.groups = vec!["10%%%Topics%%%News".into()];
        settings.forms = vec![form];
        settings
    }

    type Fixture = (SubmissionService<InMemorySubscriptionClient>, Arc<InMemorySubscriptionClient>);

    fn setup(settings: Settings) -> Fixture {
        let registry = Arc::new(FormRegistry::from_settings(&settings));
        let client = Arc::new(InMemorySubscriptionClient::new());
        (SubmissionService::new(Arc::new(settings), registry, client.clone()), client)
    }

    fn valid() -> Submission {
        Submission::new().field("email", "a@b.c").field("NAME", "Ann")
    }

    #[tokio::test]
    async fn test_success() {
        let (service, client) = setup(settings(true));
        let response = service.submit(FormId::from_position(0), &valid()).await;

        assert!(!response.is_error());
        assert_eq!(response.message, "Thank you for signing up!");
        assert_eq!(response.redirect_url.as_deref(), Some("https://example.com/thanks"));

        let subscriber = client.subscriber("L1", "a@b.c").unwrap();
        assert_eq!(subscriber.groupings[0].groups, vec!["News"]);
    }

    #[tokio::test]
    async fn test_already_subscribed_label() {
        let (service, _) = setup(settings(false));
        service.submit(FormId::from_position(0), &valid()).await;
        let response = service.submit(FormId::from_position(0), &valid()).await;

        assert!(response.is_error());
        assert_eq!(response.message, "You are already subscribed to this list");
    }

    #[tokio::test]
    async fn test_update_existing_resubscribes() {
        let (service, client) = setup(settings(true));
        service.submit(FormId::from_position(0), &valid()).await;
        let response = service.submit(FormId::from_position(0), &valid()).await;

        assert!(!response.is_error());
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_is_generic_error() {
        let (service, client) = setup(settings(true));
        let response = service
            .submit(FormId::from_position(0), &Submission::new().field("email", "a@b.c"))
            .await;

        assert!(response.is_error());
        assert_eq!(response.message, "Unknown error. Please try again later.");
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_form_and_missing_integration() {
        let (service, _) = setup(settings(true));
        assert!(service.submit(FormId::from_position(4), &valid()).await.is_error());

        let mut unconfigured = settings(true);
        unconfigured.integration.api_key = None;
        let (service, client) = setup(unconfigured);
        assert!(service.submit(FormId::from_position(0), &valid()).await.is_error());
        assert!(client.is_empty());
    }

    #[test]
    fn test_response_json() {
        let json = serde_json::to_string(&SubmissionResponse::failure("nope")).unwrap();
        assert_eq!(json, r#"{"error":1,"message":"nope"}"#);
    }
}
