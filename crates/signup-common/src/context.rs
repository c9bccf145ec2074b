//! Request-side context the selector evaluates against

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Kind of view being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageView {
    /// A single static page
    Page,
    /// A single post
    Post,
    /// Archives, search results, blog index, feeds
    Listing,
    /// Anything else
    #[default]
    Other,
}

/// Snapshot of the page being rendered or the page a submission came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageContext {
    /// Current page id, if the view is a page
    #[serde(default)]
    pub page_id: Option<u64>,
    /// Current post id, if the view is a post
    #[serde(default)]
    pub post_id: Option<u64>,
    /// Categories attached to the current post
    #[serde(default)]
    pub category_ids: Option<BTreeSet<u64>>,
    /// Whether this is the site front page
    #[serde(default)]
    pub is_front_page: bool,
    /// Full request URL, scheme through query
    #[serde(default)]
    pub url: String,
    /// View kind, used by placement rules
    #[serde(default)]
    pub view: PageView,
}

impl PageContext {
    /// Context for a static page
    pub fn page(id: u64) -> Self {
        Self {
            page_id: Some(id),
            view: PageView::Page,
            ..Default::default()
        }
    }

    /// Context for a post in the given categories
    pub fn post(id: u64, categories: impl IntoIterator<Item = u64>) -> Self {
        Self {
            post_id: Some(id),
            category_ids: Some(categories.into_iter().collect()),
            view: PageView::Post,
            ..Default::default()
        }
    }

    /// Context for the front page
    pub fn front_page() -> Self {
        Self {
            is_front_page: true,
            ..Default::default()
        }
    }

    /// Set request URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Build the full request URL from its parts
    pub fn request_url(https: bool, host: &str, request_uri: &str) -> String {
        let scheme = if https { "https" } else { "http" };
        format!("{}://{}{}", scheme, host, request_uri)
    }

    /// Post categories, treating an empty set as absent
    pub fn categories(&self) -> Option<&BTreeSet<u64>> {
        self.category_ids.as_ref().filter(|c| !c.is_empty())
    }
}

/// Category taxonomy, child → parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    parents: HashMap<u64, u64>,
}

impl CategoryTree {
    /// Create empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(child, parent)` pairs
    pub fn from_edges(edges: impl IntoIterator<Item = (u64, u64)>) -> Self {
        Self {
            parents: edges.into_iter().collect(),
        }
    }

    /// Record `child` under `parent`
    pub fn insert(&mut self, child: u64, parent: u64) {
        self.parents.insert(child, parent);
    }

    /// Given ids plus every descendant category
    pub fn with_descendants(&self, ids: &BTreeSet<u64>) -> BTreeSet<u64> {
        let mut closure = ids.clone();
        for &child in self.parents.keys() {
            if self.has_ancestor_in(child, ids) {
                closure.insert(child);
            }
        }
        closure
    }

    // Walks up the parent chain; the step bound guards against cyclic data.
    fn has_ancestor_in(&self, id: u64, ids: &BTreeSet<u64>) -> bool {
        let mut current = id;
        for _ in 0..=self.parents.len() {
            match self.parents.get(&current) {
                Some(&parent) if ids.contains(&parent) => return true,
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitive_closure() {
        // A(1) -> B(2) -> C(3), unrelated D(4)
        let tree = CategoryTree::from_edges([(2, 1), (3, 2), (5, 4)]);
        let closure = tree.with_descendants(&BTreeSet::from([1]));
        assert_eq!(closure, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_closure_survives_cycles() {
        let tree = CategoryTree::from_edges([(1, 2), (2, 1)]);
        let closure = tree.with_descendants(&BTreeSet::from([9]));
        assert_eq!(closure, BTreeSet::from([9]));
    }

    #[test]
    fn test_request_url() {
        assert_eq!(
            PageContext::request_url(true, "example.com", "/blog?x=1"),
            "https://example.com/blog?x=1"
        );
    }

    #[test]
    fn test_empty_categories_are_absent() {
        let ctx = PageContext::post(5, []);
        assert!(ctx.categories().is_none());
    }
}
