//! Site user sync
//!
//! Mirrors user accounts with a synced role into the configured list. The
//! key returned on subscribe is stored per user and used for every later
//! update or removal.

use crate::client::SubscriptionClient;
use crate::error::{ClientError, SyncError, SyncResult};
use crate::requests::{SubscribeRequest, UnsubscribeRequest, UpdateRequest, NEW_EMAIL_FIELD};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use signup_common::Settings;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Site user account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUser {
    /// Account id, keys the stored sync key
    pub id: u64,
    /// Account email
    pub email: String,
    /// Given name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Username
    pub login: String,
    /// Role names, primary first
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SiteUser {
    /// First role, the one reported to the list
    pub fn primary_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }

    /// First name, empty when unset
    pub fn first_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    /// Last name, empty when unset
    pub fn last_name(&self) -> &str {
        self.last_name.as_deref().unwrap_or_default()
    }
}

/// Per-user sync key storage
#[async_trait]
pub trait SyncKeyStore: Send + Sync {
    /// Stored key for a user
    async fn get(&self, user_id: u64) -> SyncResult<Option<String>>;

    /// Store key for a user
    async fn put(&self, user_id: u64, sync_key: &str) -> SyncResult<()>;

    /// Forget a user's key
    async fn remove(&self, user_id: u64) -> SyncResult<()>;
}

/// In-memory sync key store
pub struct InMemorySyncKeyStore {
    keys: RwLock<HashMap<u64, String>>,
}

impl InMemorySyncKeyStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySyncKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncKeyStore for InMemorySyncKeyStore {
    async fn get(&self, user_id: u64) -> SyncResult<Option<String>> {
        Ok(self.keys.read().get(&user_id).cloned())
    }

    async fn put(&self, user_id: u64, sync_key: &str) -> SyncResult<()> {
        if sync_key.is_empty() {
            return Err(SyncError::Store(format!("empty sync key for user {}", user_id)));
        }
        self.keys.write().insert(user_id, sync_key.to_string());
        Ok(())
    }

    async fn remove(&self, user_id: u64) -> SyncResult<()> {
        self.keys.write().remove(&user_id);
        Ok(())
    }
}

/// Why a sync event did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No API key or no sync list
    NotConfigured,
    /// User holds no synced role
    RoleNotSynced,
    /// User was never subscribed
    NotSynced,
}

/// What a sync event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing sent
    Skipped(SkipReason),
    /// New subscriber created
    Subscribed {
        /// Key now stored for the user
        sync_key: String,
    },
    /// Changed fields pushed
    Updated,
    /// Nothing changed
    Unchanged,
    /// Subscriber removed
    Unsubscribed,
}

/// User account sync
pub struct UserSync<C, S> {
    settings: Arc<Settings>,
    client: Arc<C>,
    keys: Arc<S>,
}

impl<C: SubscriptionClient, S: SyncKeyStore> UserSync<C, S> {
    /// Create sync handler
    pub fn new(settings: Arc<Settings>, client: Arc<C>, keys: Arc<S>) -> Self {
        Self { settings, client, keys }
    }

    /// User account created
    pub async fn on_create(&self, user: &SiteUser) -> SyncResult<SyncOutcome> {
        let list_id = match self.gate(user) {
            Ok(list_id) => list_id,
            Err(reason) => return Ok(SyncOutcome::Skipped(reason)),
        };
        let fields = &self.settings.sync.fields;

        let request = SubscribeRequest::new(list_id, &user.email)
            .with_options(&self.settings.general)
            .with_merge_field(&fields.first_name, user.first_name())
            .with_merge_field(&fields.last_name, user.last_name())
            .with_merge_field(&fields.role, user.primary_role().unwrap_or_default())
            .with_merge_field(&fields.username, user.login.as_str());

        let receipt = self.client.subscribe(&request).await?;
        self.keys.put(user.id, &receipt.sync_key).await?;

        info!("Synced user {} to list {}", user.id, request.list_id);
        Ok(SyncOutcome::Subscribed {
            sync_key: receipt.sync_key,
        })
    }

    /// User account changed; `previous` is the account before the change
    pub async fn on_update(&self, user: &SiteUser, previous: &SiteUser) -> SyncResult<SyncOutcome> {
        let list_id = match self.gate(user) {
            Ok(list_id) => list_id,
            Err(reason) => return Ok(SyncOutcome::Skipped(reason)),
        };

        let Some(sync_key) = self.keys.get(user.id).await? else {
            debug!("User {} has no sync key, subscribing", user.id);
            return self.on_create(user).await;
        };

        let fields = &self.settings.sync.fields;
        let mut update = UpdateRequest::new(list_id, sync_key);
        update.replace_groups = self.settings.general.replace_groups;

        if user.email != previous.email {
            update = update.with_merge_field(NEW_EMAIL_FIELD, user.email.as_str());
        }
        if user.first_name() != previous.first_name() {
            update = update.with_merge_field(&fields.first_name, user.first_name());
        }
        if user.last_name() != previous.last_name() {
            update = update.with_merge_field(&fields.last_name, user.last_name());
        }
        if user.primary_role() != previous.primary_role() {
            update = update.with_merge_field(&fields.role, user.primary_role().unwrap_or_default());
        }

        if update.is_empty() {
            return Ok(SyncOutcome::Unchanged);
        }

        self.client.update(&update).await?;
        info!("Updated synced user {} ({} fields)", user.id, update.merge_fields.len());
        Ok(SyncOutcome::Updated)
    }

    /// User account deleted
    pub async fn on_delete(&self, user: &SiteUser) -> SyncResult<SyncOutcome> {
        let list_id = match self.gate(user) {
            Ok(list_id) => list_id,
            Err(reason) => return Ok(SyncOutcome::Skipped(reason)),
        };

        let Some(sync_key) = self.keys.get(user.id).await? else {
            return Ok(SyncOutcome::Skipped(SkipReason::NotSynced));
        };

        match self.client.unsubscribe(&UnsubscribeRequest::by_sync_key(list_id, sync_key)).await {
            Ok(()) | Err(ClientError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        self.keys.remove(user.id).await?;

        info!("Unsubscribed deleted user {}", user.id);
        Ok(SyncOutcome::Unsubscribed)
    }

    fn gate(&self, user: &SiteUser) -> Result<&str, SkipReason> {
        let list_id = self
            .settings
            .sync
            .list
            .as_deref()
            .filter(|l| !l.is_empty() && self.settings.is_integrated())
            .ok_or(SkipReason::NotConfigured)?;

        let synced = user.roles.iter().any(|role| self.settings.sync.roles.contains(role));
        if !synced {
            return Err(SkipReason::RoleNotSynced);
        }
        Ok(list_id)
    }
}
