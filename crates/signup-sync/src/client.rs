//! Remote list service seam

use crate::error::{ClientError, ClientResult};
use crate::requests::{
    SubscribeRequest, SubscriberHandle, UnsubscribeRequest, UpdateRequest, NEW_EMAIL_FIELD,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use signup_common::Grouping;
use signup_forms::FieldValue;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Subscribe call result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeReceipt {
    /// Key identifying the subscriber in later updates
    pub sync_key: String,
}

/// Remote list service
#[async_trait]
pub trait SubscriptionClient: Send + Sync {
    /// Add an address to a list
    async fn subscribe(&self, request: &SubscribeRequest) -> ClientResult<SubscribeReceipt>;

    /// Update a subscriber by sync key
    async fn update(&self, request: &UpdateRequest) -> ClientResult<()>;

    /// Remove a subscriber
    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> ClientResult<()>;
}

/// Subscriber record held by [`InMemorySubscriptionClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    /// Key issued on subscribe
    pub sync_key: String,
    /// List the address is on
    pub list_id: String,
    /// Current address
    pub email: String,
    /// Merge field values by key
    pub merge_fields: BTreeMap<String, FieldValue>,
    /// Interest group selections
    pub groupings: Vec<Grouping>,
    /// Tag applied on subscribe
    pub tag_id: Option<String>,
}

/// In-memory list service (for testing and dry runs)
pub struct InMemorySubscriptionClient {
    subscribers: RwLock<Vec<Subscriber>>,
    next_key: AtomicU64,
}

impl InMemorySubscriptionClient {
    /// Empty list service
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_key: AtomicU64::new(1),
        }
    }

    /// Subscriber on `list_id` with `email`
    pub fn subscriber(&self, list_id: &str, email: &str) -> Option<Subscriber> {
        self.subscribers
            .read()
            .iter()
            .find(|s| s.list_id == list_id && s.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// All subscribers
    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.subscribers.read().clone()
    }

    /// Number of subscribers across lists
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    fn issue_key(&self) -> String {
        format!("sub-{}", self.next_key.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for InMemorySubscriptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionClient for InMemorySubscriptionClient {
    async fn subscribe(&self, request: &SubscribeRequest) -> ClientResult<SubscribeReceipt> {
        if request.list_id.is_empty() || request.email.is_empty() {
            return Err(ClientError::Rejected("list and email are required".into()));
        }

        let mut subscribers = self.subscribers.write();
        let existing = subscribers
            .iter_mut()
            .find(|s| s.list_id == request.list_id && s.email.eq_ignore_ascii_case(&request.email));

        if let Some(subscriber) = existing {
            if !request.update_existing {
                return Err(ClientError::AlreadySubscribed {
                    email: request.email.clone(),
                    list_id: request.list_id.clone(),
                });
            }
            subscriber.merge_fields.extend(request.merge_fields.clone());
            merge_groupings(&mut subscriber.groupings, &request.groupings);
            if request.tag_id.is_some() {
                subscriber.tag_id = request.tag_id.clone();
            }
            return Ok(SubscribeReceipt {
                sync_key: subscriber.sync_key.clone(),
            });
        }

        let sync_key = self.issue_key();
        subscribers.push(Subscriber {
            sync_key: sync_key.clone(),
            list_id: request.list_id.clone(),
            email: request.email.clone(),
            merge_fields: request.merge_fields.clone(),
            groupings: request.groupings.clone(),
            tag_id: request.tag_id.clone(),
        });

        Ok(SubscribeReceipt { sync_key })
    }

    async fn update(&self, request: &UpdateRequest) -> ClientResult<()> {
        let mut subscribers = self.subscribers.write();
        let subscriber = subscribers
            .iter_mut()
            .find(|s| s.list_id == request.list_id && s.sync_key == request.sync_key)
            .ok_or_else(|| ClientError::NotFound(request.sync_key.clone()))?;

        for (key, value) in &request.merge_fields {
            if key == NEW_EMAIL_FIELD {
                if let Some(email) = value.as_text() {
                    subscriber.email = email.to_string();
                }
                continue;
            }
            subscriber.merge_fields.insert(key.clone(), value.clone());
        }

        if request.replace_groups {
            subscriber.groupings = request.groupings.clone();
        } else {
            merge_groupings(&mut subscriber.groupings, &request.groupings);
        }

        Ok(())
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> ClientResult<()> {
        let mut subscribers = self.subscribers.write();
        let position = subscribers.iter().position(|s| {
            s.list_id == request.list_id
                && match &request.handle {
                    SubscriberHandle::Email(email) => s.email.eq_ignore_ascii_case(email),
                    SubscriberHandle::SyncKey(key) => &s.sync_key == key,
                }
        });

        match position {
            Some(index) => {
                subscribers.remove(index);
                Ok(())
            }
            None => Err(ClientError::NotFound(format!("{:?}", request.handle))),
        }
    }
}

fn merge_groupings(current: &mut Vec<Grouping>, added: &[Grouping]) {
    for grouping in added {
        match current.iter_mut().find(|g| g.id == grouping.id) {
            Some(existing) => {
                for group in &grouping.groups {
                    if !existing.groups.contains(group) {
                        existing.groups.push(group.clone());
                    }
                }
            }
            None => current.push(grouping.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouping(id: &str, groups: &[&str]) -> Grouping {
        Grouping {
            id: id.into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_issues_keys() {
        let client = InMemorySubscriptionClient::new();
        let first = client.subscribe(&SubscribeRequest::new("L1", "a@b.c")).await.unwrap();
        let second = client.subscribe(&SubscribeRequest::new("L1", "x@y.z")).await.unwrap();

        assert_ne!(first.sync_key, second.sync_key);
        assert_eq!(client.len(), 2);
    }

    #[tokio::test]
    async fn test_already_subscribed() {
        let client = InMemorySubscriptionClient::new();
        client.subscribe(&SubscribeRequest::new("L1", "a@b.c")).await.unwrap();

        let err = client.subscribe(&SubscribeRequest::new("L1", "A@B.C")).await.unwrap_err();
        assert!(matches!(err, ClientError::AlreadySubscribed { .. }));

        // same address on another list is a new subscriber
        assert!(client.subscribe(&SubscribeRequest::new("L2", "a@b.c")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_existing_merges() {
        let client = InMemorySubscriptionClient::new();
        let receipt = client
            .subscribe(&SubscribeRequest::new("L1", "a@b.c").with_merge_field("2", "Ann"))
            .await
            .unwrap();

        let mut again = SubscribeRequest::new("L1", "a@b.c").with_merge_field("3", "Lee");
        again.update_existing = true;
        let second = client.subscribe(&again).await.unwrap();

        assert_eq!(receipt, second);
        let subscriber = client.subscriber("L1", "a@b.c").unwrap();
        assert_eq!(subscriber.merge_fields.len(), 2);
    }

    #[tokio::test]
    async fn test_update_by_sync_key() {
        let client = InMemorySubscriptionClient::new();
        let mut request = SubscribeRequest::new("L1", "a@b.c");
        request.groupings = vec![grouping("10", &["News"])];
        let receipt = client.subscribe(&request).await.unwrap();

        let mut update = UpdateRequest::new("L1", &receipt.sync_key)
            .with_merge_field(NEW_EMAIL_FIELD, "new@b.c")
            .with_merge_field("ROLE", "editor");
        update.groupings = vec![grouping("10", &["Deals"])];
        client.update(&update).await.unwrap();

        let subscriber = client.subscriber("L1", "new@b.c").unwrap();
        assert!(!subscriber.merge_fields.contains_key(NEW_EMAIL_FIELD));
        assert_eq!(subscriber.groupings, vec![grouping("10", &["News", "Deals"])]);

        update.replace_groups = true;
        client.update(&update).await.unwrap();
        let subscriber = client.subscriber("L1", "new@b.c").unwrap();
        assert_eq!(subscriber.groupings, vec![grouping("10", &["Deals"])]);
    }

    #[tokio::test]
    async fn test_update_unknown_key() {
        let client = InMemorySubscriptionClient::new();
        let result = client.update(&UpdateRequest::new("L1", "missing")).await;
        assert_eq!(result, Err(ClientError::NotFound("missing".into())));
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let client = InMemorySubscriptionClient::new();
        let receipt = client.subscribe(&SubscribeRequest::new("L1", "a@b.c")).await.unwrap();
        client.subscribe(&SubscribeRequest::new("L1", "x@y.z")).await.unwrap();

        client
            .unsubscribe(&UnsubscribeRequest::by_sync_key("L1", receipt.sync_key))
            .await
            .unwrap();
        client.unsubscribe(&UnsubscribeRequest::by_email("L1", "x@y.z")).await.unwrap();

        assert!(client.is_empty());
        assert!(client
            .unsubscribe(&UnsubscribeRequest::by_email("L1", "x@y.z"))
            .await
            .is_err());
    }
}
