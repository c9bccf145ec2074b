//! Placement gates
//!
//! Every placement needs an API key and at least one configured form before
//! it considers anything else.

use crate::cookies::VisitorCookies;
use crate::popup::{track_page_hit, PopupDecision, PopupPlan};
use serde::Deserialize;
use signup_common::settings::{AfterContentTarget, PopupTarget};
use signup_common::{
    parse_form_id_list, CategoryTree, FormDefinition, FormId, PageContext, PageView, Settings,
};
use signup_forms::FormRegistry;
use tracing::debug;

/// Attributes of the `[pinpointe_form]` shortcode
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShortcodeAttributes {
    /// Comma separated allow-list, e.g. `"1,3"`
    #[serde(default)]
    pub forms: Option<String>,
}

impl ShortcodeAttributes {
    /// Allow-list; empty means any form
    pub fn allowed_forms(&self) -> Vec<FormId> {
        self.forms.as_deref().map(parse_form_id_list).unwrap_or_default()
    }
}

/// Placement decisions for one request
pub struct FormPlacements<'a> {
    settings: &'a Settings,
    registry: &'a FormRegistry,
    categories: &'a CategoryTree,
}

impl<'a> FormPlacements<'a> {
    /// Create for the current settings and forms
    pub fn new(
        settings: &'a Settings,
        registry: &'a FormRegistry,
        categories: &'a CategoryTree,
    ) -> Self {
        Self {
            settings,
            registry,
            categories,
        }
    }

    /// Form appended below post or page content
    pub fn after_content(&self, context: &PageContext) -> Option<FormDefinition> {
        if !self.ready() || Self::is_listing_or_front(context) {
            return None;
        }

        let targets = &self.settings.after_posts.post_types;
        let enabled = match context.view {
            PageView::Post => targets.contains(&AfterContentTarget::Posts),
            PageView::Page => targets.contains(&AfterContentTarget::Pages),
            _ => false,
        };
        if !enabled {
            debug!("Below-content form not enabled for {:?}", context.view);
            return None;
        }

        self.select(context, &self.settings.after_posts_allowed_forms())
    }

    /// Form rendered in place of a shortcode
    pub fn shortcode(
        &self,
        context: &PageContext,
        attributes: &ShortcodeAttributes,
    ) -> Option<FormDefinition> {
        if !self.ready() || context.view == PageView::Listing {
            return None;
        }
        self.select(context, &attributes.allowed_forms())
    }

    /// Popup decision for this view
    ///
    /// A view held back by the page cap still advances the page counter
    /// through the returned cookies.
    pub fn popup(&self, context: &PageContext, cookies: &VisitorCookies) -> PopupDecision {
        let hit = track_page_hit(cookies, self.settings.popup.page_limit);
        if hit.capped {
            debug!("Popup held back by page cap");
            return PopupDecision::hidden(hit.cookie);
        }
        match self.popup_plan(context, cookies) {
            Some(plan) => PopupDecision::shown(plan),
            None => PopupDecision::default(),
        }
    }

    fn popup_plan(&self, context: &PageContext, cookies: &VisitorCookies) -> Option<PopupPlan> {
        let popup = &self.settings.popup;
        if cookies.dismissed {
            return None;
        }

        let form_id = popup.form.filter(|_| popup.enabled)?;
        if !self.ready() || self.registry.get(form_id).is_none() {
            return None;
        }

        if !popup.display_on.contains(&Self::popup_target(context)) {
            return None;
        }

        if cookies.time_capped && popup.time_limit_mins > 0 {
            debug!("Popup held back by time cap");
            return None;
        }

        let form = self.select(context, &[form_id])?;
        Some(PopupPlan::new(form, popup))
    }

    /// Form replacing locked content; `None` leaves the content visible
    pub fn content_lock(
        &self,
        context: &PageContext,
        cookies: &VisitorCookies,
    ) -> Option<FormDefinition> {
        if Self::is_listing_or_front(context) || !self.ready() {
            return None;
        }

        let lock = &self.settings.lock;
        let form_id = lock.form.filter(|_| lock.enabled)?;

        if cookies.subscribed {
            debug!("Content unlocked for subscribed visitor");
            return None;
        }

        self.select(context, &[form_id])
    }

    fn ready(&self) -> bool {
        self.settings.is_integrated() && !self.registry.is_empty()
    }

    fn select(&self, context: &PageContext, allowed: &[FormId]) -> Option<FormDefinition> {
        self.registry.select(context, allowed, self.categories)
    }

    fn is_listing_or_front(context: &PageContext) -> bool {
        context.is_front_page || context.view == PageView::Listing
    }

    fn popup_target(context: &PageContext) -> PopupTarget {
        if context.is_front_page {
            return PopupTarget::FrontPage;
        }
        match context.view {
            PageView::Page => PopupTarget::Pages,
            PageView::Post => PopupTarget::Posts,
            PageView::Listing | PageView::Other => PopupTarget::Other,
        }
    }
}
