//! Remote service and sync errors

use thiserror::Error;

/// Result type for remote calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for user sync
pub type SyncResult<T> = Result<T, SyncError>;

/// Remote list service errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Address already on the list and updates are off
    #[error("{email} is already subscribed to list {list_id}")]
    AlreadySubscribed {
        /// Submitted address
        email: String,
        /// Target list
        list_id: String,
    },

    /// Unknown subscriber
    #[error("subscriber not found: {0}")]
    NotFound(String),

    /// Request refused by the service
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Service unreachable or answered garbage
    #[error("transport error: {0}")]
    Transport(String),
}

/// User sync errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Remote call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Sync key storage failed
    #[error("sync key store error: {0}")]
    Store(String),
}
