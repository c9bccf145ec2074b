//! Popup frequency capping
//!
//! Two caps apply. The page cap counts page views in a cookie and keeps the
//! popup hidden until the count reaches `page_limit`; the time cap hides it
//! for `time_limit_mins` after it was shown. Both cookies are (re)started
//! whenever the popup is actually shown.

use crate::cookies::{CookieInstruction, VisitorCookies, DISMISSED, PAGE_HITS, TIME_CAP};
use serde::Serialize;
use signup_common::settings::PopupSettings;
use signup_common::FormDefinition;

const PAGE_HITS_LIFETIME_MINS: i64 = 30 * 24 * 60;
const DISMISS_LIFETIME_MINS: i64 = 5 * 365 * 24 * 60;

/// Result of counting one page view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHit {
    /// Popup must stay hidden on this view
    pub capped: bool,
    /// Counter update to send back
    pub cookie: Option<CookieInstruction>,
}

/// Count a page view against the popup page cap
///
/// Counting only runs once the popup has been shown at least once (the
/// counter cookie exists) and when `page_limit` is above one.
pub fn track_page_hit(cookies: &VisitorCookies, page_limit: u32) -> PageHit {
    match cookies.page_hits {
        Some(hits) if page_limit > 1 && hits < page_limit => PageHit {
            capped: true,
            cookie: Some(CookieInstruction::new(
                PAGE_HITS,
                (hits + 1).to_string(),
                PAGE_HITS_LIFETIME_MINS,
            )),
        },
        _ => PageHit {
            capped: false,
            cookie: None,
        },
    }
}

/// Popup outcome for one page view
#[derive(Debug, Clone, Default, Serialize)]
pub struct PopupDecision {
    /// Popup to open, if any
    pub plan: Option<PopupPlan>,
    /// Cookies to set on this response whether or not the popup opens
    pub cookies: Vec<CookieInstruction>,
}

impl PopupDecision {
    /// Popup stays closed; `cookie` still has to reach the visitor
    pub fn hidden(cookie: Option<CookieInstruction>) -> Self {
        Self {
            plan: None,
            cookies: cookie.into_iter().collect(),
        }
    }

    /// Popup opens with `plan`
    pub fn shown(plan: PopupPlan) -> Self {
        Self {
            plan: Some(plan),
            cookies: Vec::new(),
        }
    }

    /// Whether the popup opens
    pub fn is_shown(&self) -> bool {
        self.plan.is_some()
    }
}

/// Everything the page needs to open the popup
#[derive(Debug, Clone, Serialize)]
pub struct PopupPlan {
    /// Form to show
    pub form: FormDefinition,
    /// Milliseconds before opening
    pub delay_ms: u64,
    /// Offer the "never show again" link
    pub allow_dismissing: bool,
    /// Text of that link
    pub label_dismiss: String,
    /// Cookies to set once the popup opens
    pub on_open: Vec<CookieInstruction>,
}

impl PopupPlan {
    /// Build plan for `form` under `settings`
    pub fn new(form: FormDefinition, settings: &PopupSettings) -> Self {
        let mut on_open = Vec::new();
        if settings.time_limit_mins > 0 {
            let minutes = i64::from(settings.time_limit_mins);
            on_open.push(CookieInstruction::new(TIME_CAP, "1", minutes));
        }
        if settings.page_limit > 1 {
            on_open.push(CookieInstruction::new(PAGE_HITS, "1", PAGE_HITS_LIFETIME_MINS));
        }

        Self {
            form,
            delay_ms: delay_ms(settings.delay_secs),
            allow_dismissing: settings.allow_dismissing,
            label_dismiss: settings.label_dismiss.clone(),
            on_open,
        }
    }

    /// Cookie to set when the visitor dismisses the popup
    pub fn dismiss_cookie(&self) -> CookieInstruction {
        CookieInstruction::new(DISMISSED, "1", DISMISS_LIFETIME_MINS)
    }
}

/// Open delay; unset or zero opens right away
fn delay_ms(delay_secs: Option<u32>) -> u64 {
    delay_secs.map_or(1, |secs| u64::from(secs) * 1000).max(1)
}
