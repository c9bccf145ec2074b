//! Visitor cookies read and written by the placements

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Set when the visitor chose to never see the popup again
pub const DISMISSED: &str = "pinpointe_d";
/// Set while the popup time cap is running
pub const TIME_CAP: &str = "pinpointe_t";
/// Page views since the popup was last shown
pub const PAGE_HITS: &str = "pinpointe_p";
/// Set once the visitor has subscribed
pub const SUBSCRIBED: &str = "pinpointe_s";

/// Cookies relevant to placement decisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorCookies {
    /// Popup dismissed for good
    pub dismissed: bool,
    /// Popup shown recently
    pub time_capped: bool,
    /// Page view counter, if running
    pub page_hits: Option<u32>,
    /// Visitor already subscribed
    pub subscribed: bool,
}

impl VisitorCookies {
    /// Parse a `Cookie` request header
    pub fn from_header(header: &str) -> Self {
        let mut cookies = Self::default();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            match name.trim() {
                DISMISSED => cookies.dismissed = true,
                TIME_CAP => cookies.time_capped = true,
                // a garbled counter restarts the count
                PAGE_HITS => cookies.page_hits = Some(value.trim().parse().unwrap_or(1)),
                SUBSCRIBED => cookies.subscribed = true,
                _ => {}
            }
        }
        cookies
    }

    /// Record a cookie set by a response, as the next request sends it back
    pub fn apply(&mut self, cookie: &CookieInstruction) {
        match cookie.name {
            DISMISSED => self.dismissed = true,
            TIME_CAP => self.time_capped = true,
            PAGE_HITS => self.page_hits = Some(cookie.value.parse().unwrap_or(1)),
            SUBSCRIBED => self.subscribed = true,
            _ => {}
        }
    }
}

/// Cookie the response should set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieInstruction {
    /// Cookie name
    pub name: &'static str,
    /// Cookie value
    pub value: String,
    /// Lifetime in minutes
    pub expires_in_mins: i64,
}

impl CookieInstruction {
    /// Cookie valid for `minutes`
    pub fn new(name: &'static str, value: impl Into<String>, minutes: i64) -> Self {
        Self {
            name,
            value: value.into(),
            expires_in_mins: minutes,
        }
    }

    /// Lifetime
    pub fn max_age(&self) -> Duration {
        Duration::minutes(self.expires_in_mins)
    }

    /// Expiry relative to `now`
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.max_age()
    }

    /// `Set-Cookie` header value, site-wide path
    pub fn to_header(&self) -> String {
        format!(
            "{}={}; Max-Age={}; Path=/",
            self.name,
            self.value,
            self.max_age().num_seconds()
        )
    }
}
