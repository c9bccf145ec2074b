//! Signup form engine
//!
//! Two pure stages run per request:
//!
//! ```text
//!   settings snapshot ──► FormRegistry ──► FormSelector ──► FormDefinition?
//!                                                               │
//!   visitor submission ─────────────────► FieldCoercer ◄────────┘
//!                                              │
//!                                              ▼
//!                                    SubscriptionPayload
//! ```
//!
//! Selection walks forms in registry order and returns the first one whose
//! condition holds for the page. Coercion validates submitted values against
//! the selected form and reshapes them for the remote service. Neither stage
//! performs I/O or keeps state between calls.

#![warn(missing_docs)]

pub mod coerce;
pub mod error;
pub mod groups;
pub mod registry;
pub mod selector;
pub mod submission;

pub use coerce::{build_subscription_payload, FieldCoercer};
pub use error::{ValidationError, ValidationResult};
pub use groups::resolve_groups;
pub use registry::{FormRegistry, RegistryStats};
pub use selector::{select_form, FormSelector};
pub use submission::{FieldValue, Submission, SubscriptionPayload};
