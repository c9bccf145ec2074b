//! Display conditions attached to forms

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rule controlling on which pages a form is eligible
///
/// Stored as `{ key = "...", value = ... }`, the shape the settings
/// store has always used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// Every page
    #[default]
    Always,
    /// Never shown, never submitted
    #[serde(alias = "disable")]
    Disabled,
    /// Site front page only
    #[serde(alias = "front")]
    FrontPage,
    /// Listed pages
    Pages(BTreeSet<u64>),
    /// All but the listed pages
    PagesNot(BTreeSet<u64>),
    /// Listed posts
    Posts(BTreeSet<u64>),
    /// All but the listed posts
    PostsNot(BTreeSet<u64>),
    /// Posts in the listed categories or their descendants
    Categories(BTreeSet<u64>),
    /// Posts outside the listed categories and their descendants
    CategoriesNot(BTreeSet<u64>),
    /// Request URL contains the text, case-insensitive
    #[serde(alias = "url")]
    UrlContains(String),
    /// Request URL does not contain the text, case-insensitive
    #[serde(alias = "url_not")]
    UrlNotContains(String),
}

impl Condition {
    /// Disabled forms are skipped before evaluation
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Stable key as stored in settings
    pub fn key(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Disabled => "disabled",
            Self::FrontPage => "front_page",
            Self::Pages(_) => "pages",
            Self::PagesNot(_) => "pages_not",
            Self::Posts(_) => "posts",
            Self::PostsNot(_) => "posts_not",
            Self::Categories(_) => "categories",
            Self::CategoriesNot(_) => "categories_not",
            Self::UrlContains(_) => "url_contains",
            Self::UrlNotContains(_) => "url_not_contains",
        }
    }

    /// Whether the condition carries no usable value and therefore
    /// degrades to `Always` when settings are normalized
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Pages(ids)
            | Self::PagesNot(ids)
            | Self::Posts(ids)
            | Self::PostsNot(ids)
            | Self::Categories(ids)
            | Self::CategoriesNot(ids) => ids.is_empty(),
            Self::UrlContains(text) | Self::UrlNotContains(text) => text.trim().is_empty(),
            Self::Always | Self::Disabled | Self::FrontPage => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        condition: Condition,
    }

    #[test]
    fn test_parse_stored_shape() {
        let w: Wrapper = toml::from_str("condition = { key = \"pages\", value = [4, 2] }").unwrap();
        assert_eq!(w.condition, Condition::Pages(BTreeSet::from([2, 4])));

        let w: Wrapper =
            toml::from_str("condition = { key = \"url\", value = \"promo\" }").unwrap();
        assert_eq!(w.condition, Condition::UrlContains("promo".into()));

        let w: Wrapper = toml::from_str("condition = { key = \"front\" }").unwrap();
        assert_eq!(w.condition, Condition::FrontPage);
    }

    #[test]
    fn test_degenerate() {
        assert!(Condition::Pages(BTreeSet::new()).is_degenerate());
        assert!(Condition::UrlNotContains(" ".into()).is_degenerate());
        assert!(!Condition::Posts(BTreeSet::from([1])).is_degenerate());
        assert!(!Condition::FrontPage.is_degenerate());
    }

    #[test]
    fn test_json_round_shape() {
        let json = serde_json::to_string(&Condition::CategoriesNot(BTreeSet::from([7]))).unwrap();
        assert_eq!(json, r#"{"key":"categories_not","value":[7]}"#);
    }
}
