//! Interest group identifiers
//!
//! Groups are stored as a single string per group:
//! `<grouping id>%%%<grouping name>%%%<group name>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GROUP_SEPARATOR: &str = "%%%";

/// Parsed group identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    /// Remote grouping id
    pub grouping_id: String,
    /// Grouping display name
    pub grouping_name: String,
    /// Group name within the grouping
    pub group: String,
}

impl GroupRef {
    /// Parse a stored identifier; anything without exactly three parts is
    /// not a group reference
    pub fn parse(raw: &str) -> Option<Self> {
        let decoded = decode_entities(raw);
        let mut parts = decoded.split(GROUP_SEPARATOR);
        let (grouping_id, grouping_name, group) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            grouping_id: grouping_id.to_string(),
            grouping_name: grouping_name.to_string(),
            group: group.to_string(),
        })
    }

    /// Render back to the stored identifier
    pub fn to_identifier(&self) -> String {
        [self.grouping_id.as_str(), &self.grouping_name, &self.group].join(GROUP_SEPARATOR)
    }
}

/// Groups folded per grouping, the shape the remote service accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    /// Remote grouping id
    pub id: String,
    /// Group names
    pub groups: Vec<String>,
}

/// Fold group identifiers into groupings, ignoring malformed entries
pub fn fold_groupings<S: AsRef<str>>(group_ids: &[S]) -> Vec<Grouping> {
    let mut by_grouping: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for group in group_ids.iter().filter_map(|g| GroupRef::parse(g.as_ref())) {
        by_grouping.entry(group.grouping_id).or_default().push(group.group);
    }
    by_grouping
        .into_iter()
        .map(|(id, groups)| Grouping { id, groups })
        .collect()
}

/// Distinct grouping ids offered by a list of group identifiers, in first
/// appearance order
pub fn offered_groupings<S: AsRef<str>>(group_ids: &[S]) -> Vec<String> {
    let mut seen = Vec::new();
    for group in group_ids.iter().filter_map(|g| GroupRef::parse(g.as_ref())) {
        if !seen.contains(&group.grouping_id) {
            seen.push(group.grouping_id);
        }
    }
    seen
}

// Settings written by the admin page store quotes as HTML entities.
fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_ref() {
        let group = GroupRef::parse("12%%%Interests%%%Cooking").unwrap();
        assert_eq!(group.grouping_id, "12");
        assert_eq!(group.grouping_name, "Interests");
        assert_eq!(group.group, "Cooking");
        assert_eq!(group.to_identifier(), "12%%%Interests%%%Cooking");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(GroupRef::parse("Cooking").is_none());
        assert!(GroupRef::parse("1%%%2").is_none());
        assert!(GroupRef::parse("1%%%2%%%3%%%4").is_none());
    }

    #[test]
    fn test_parse_decodes_entities() {
        let group = GroupRef::parse("3%%%Kids&#039; Corner%%%Tom &amp; Jerry").unwrap();
        assert_eq!(group.grouping_name, "Kids' Corner");
        assert_eq!(group.group, "Tom & Jerry");
    }

    #[test]
    fn test_fold_groupings() {
        let groupings = fold_groupings(&[
            "1%%%Topics%%%Rust",
            "2%%%Frequency%%%Weekly",
            "1%%%Topics%%%Go",
            "garbage",
        ]);
        assert_eq!(
            groupings,
            vec![
                Grouping { id: "1".into(), groups: vec!["Rust".into(), "Go".into()] },
                Grouping { id: "2".into(), groups: vec!["Weekly".into()] },
            ]
        );
    }

    #[test]
    fn test_offered_groupings_order() {
        let offered = offered_groupings(&["2%%%B%%%x", "1%%%A%%%y", "2%%%B%%%z"]);
        assert_eq!(offered, vec!["2".to_string(), "1".to_string()]);
    }
}
