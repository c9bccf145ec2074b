//! Signup Common - Shared types for the newsletter signup engine
//!
//! This crate provides the configuration-side model consumed by the
//! selection and coercion engine:
//! - Form, field and condition definitions
//! - Page context and category taxonomy
//! - Date and birthday input patterns
//! - Settings loading and normalization
//! - Error handling
//!
//! Everything here is plain data. Forms are created and edited by the host's
//! admin surface; the engine only ever reads an already-normalized snapshot.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod condition;
pub mod context;
pub mod dates;
pub mod error;
pub mod form;
pub mod groups;
pub mod settings;
pub mod value_objects;

pub use condition::*;
pub use context::*;
pub use dates::{BirthdayFormat, DateFormat, DateOrder, Separator};
pub use error::*;
pub use form::*;
pub use groups::*;
pub use settings::Settings;
pub use value_objects::*;
