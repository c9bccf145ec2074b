//! Signup Sync - Everything that talks to the mailing service
//!
//! - [`SubscriptionClient`]: seam to the remote list service, with an
//!   in-memory implementation for tests and dry runs
//! - [`SubmissionService`]: visitor form submissions end to end
//! - [`UserSync`]: mirrors site user accounts into a list
//! - [`CheckboxSignup`]: registration and comment opt-in checkboxes

#![warn(missing_docs)]

pub mod checkbox;
pub mod client;
pub mod error;
pub mod requests;
pub mod service;
pub mod sync;

pub use checkbox::{CheckboxSignup, CommentApproval};
pub use client::{InMemorySubscriptionClient, SubscribeReceipt, Subscriber, SubscriptionClient};
pub use error::{ClientError, ClientResult, SyncError, SyncResult};
pub use requests::{SubscribeRequest, SubscriberHandle, UnsubscribeRequest, UpdateRequest};
pub use service::{SubmissionResponse, SubmissionService};
pub use sync::{InMemorySyncKeyStore, SiteUser, SkipReason, SyncKeyStore, SyncOutcome, UserSync};
