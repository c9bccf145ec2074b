//! Signup Display - Where forms appear
//!
//! Each placement decides whether a form is shown on the current view and,
//! if so, which one. Selection itself is delegated to the form registry;
//! placements only add their own gates (view kind, visitor cookies, the
//! placement's allow-list).

#![warn(missing_docs)]

pub mod cookies;
pub mod placements;
pub mod popup;

pub use cookies::{CookieInstruction, VisitorCookies};
pub use placements::{FormPlacements, ShortcodeAttributes};
pub use popup::{track_page_hit, PageHit, PopupDecision, PopupPlan};
