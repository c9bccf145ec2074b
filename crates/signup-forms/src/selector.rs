//! Form selection by display condition
//!
//! Forms are evaluated in registry order and the first match wins; later
//! forms are never looked at once one matches.
//!
//! Missing page data is read permissively: an exclusion (`*_not`) that
//! cannot be checked lets the form through, and an id-list condition with
//! no ids behaves like `always` for any page of the right kind.

use signup_common::{CategoryTree, Condition, FormDefinition, FormId, PageContext};
use std::collections::BTreeSet;
use tracing::debug;

/// Condition evaluator for one request
pub struct FormSelector<'a> {
    categories: &'a CategoryTree,
}

impl<'a> FormSelector<'a> {
    /// Create selector over the host's category taxonomy
    pub fn new(categories: &'a CategoryTree) -> Self {
        Self { categories }
    }

    /// Pick the first eligible form whose condition holds
    ///
    /// A form is never eligible when it is disabled, has no list, or is
    /// missing from a non-empty `allowed` list.
    pub fn select<'f>(
        &self,
        forms: &'f [FormDefinition],
        context: &PageContext,
        allowed: &[FormId],
    ) -> Option<&'f FormDefinition> {
        for form in forms {
            if !form.is_active() {
                debug!("Skipping form {}: inactive", form.id);
                continue;
            }

            if !allowed.is_empty() && !allowed.contains(&form.id) {
                debug!("Skipping form {}: not in allow-list", form.id);
                continue;
            }

            if self.matches(&form.condition, context) {
                debug!("Selected form {} ({})", form.id, form.condition.key());
                return Some(form);
            }
        }

        None
    }

    /// Evaluate a single condition against the page
    #[inline]
    pub fn matches(&self, condition: &Condition, context: &PageContext) -> bool {
        match condition {
            Condition::Always => true,
            Condition::Disabled => false,
            Condition::FrontPage => context.is_front_page,

            Condition::Pages(ids) => Self::id_listed(context.page_id, ids),
            Condition::PagesNot(ids) => Self::id_not_listed(context.page_id, ids),
            Condition::Posts(ids) => Self::id_listed(context.post_id, ids),
            Condition::PostsNot(ids) => Self::id_not_listed(context.post_id, ids),

            Condition::Categories(ids) => {
                if context.is_front_page {
                    return false;
                }
                if ids.is_empty() {
                    return true;
                }
                context
                    .categories()
                    .is_some_and(|post_categories| self.in_categories(post_categories, ids))
            }
            Condition::CategoriesNot(ids) => {
                if ids.is_empty() {
                    return true;
                }
                match context.categories() {
                    Some(post_categories) => !self.in_categories(post_categories, ids),
                    None => true,
                }
            }

            Condition::UrlContains(text) => Self::url_contains(&context.url, text),
            Condition::UrlNotContains(text) => !Self::url_contains(&context.url, text),
        }
    }

    #[inline]
    fn id_listed(id: Option<u64>, ids: &BTreeSet<u64>) -> bool {
        match id {
            Some(id) => ids.is_empty() || ids.contains(&id),
            None => false,
        }
    }

    #[inline]
    fn id_not_listed(id: Option<u64>, ids: &BTreeSet<u64>) -> bool {
        match id {
            Some(id) => ids.is_empty() || !ids.contains(&id),
            None => true,
        }
    }

    fn in_categories(&self, post_categories: &BTreeSet<u64>, ids: &BTreeSet<u64>) -> bool {
        let closure = self.categories.with_descendants(ids);
        !closure.is_disjoint(post_categories)
    }

    fn url_contains(url: &str, text: &str) -> bool {
        url.to_lowercase().contains(&text.to_lowercase())
    }
}

/// Select the form to show for `context`
///
/// Convenience wrapper over [`FormSelector`].
pub fn select_form<'f>(
    forms: &'f [FormDefinition],
    context: &PageContext,
    allowed: &[FormId],
    categories: &CategoryTree,
) -> Option<&'f FormDefinition> {
    FormSelector::new(categories).select(forms, context, allowed)
}
