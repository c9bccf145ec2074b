//! Group resolution per form group method

use crate::error::{ValidationError, ValidationResult};
use crate::submission::Submission;
use signup_common::{offered_groupings, FormDefinition, GroupMethod};

/// Resolve the group identifiers a submission subscribes to
///
/// `auto` forms assign their configured groups. For visitor-selected
/// methods the submission's `groups` map (grouping id → identifiers) is
/// used; `multi` keeps every selection, the single-choice methods keep the
/// first one per grouping. Required methods fail on the first offered
/// grouping without a selection.
pub fn resolve_groups(
    form: &FormDefinition,
    submission: &Submission,
) -> ValidationResult<Vec<String>> {
    let method = form.group_method;

    if !method.is_visitor_selected() {
        return Ok(form.groups.clone());
    }

    if method.is_required() {
        for grouping in offered_groupings(&form.groups) {
            let selected = submission
                .groups
                .get(&grouping)
                .is_some_and(|value| value.values().next().is_some());
            if !selected {
                return Err(ValidationError::MissingRequiredGroup(grouping));
            }
        }
    }

    let groups = match method {
        GroupMethod::Multi => submission
            .groups
            .values()
            .flat_map(|value| value.values())
            .map(str::to_string)
            .collect(),
        _ => submission
            .groups
            .values()
            .filter_map(|value| value.values().next())
            .map(str::to_string)
            .collect(),
    };

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::FieldValue;
    use signup_common::FormId;

    fn form(method: GroupMethod) -> FormDefinition {
        let mut form = FormDefinition::new(FormId::from_position(0), "list");
        form.group_method = method;
        form.groups = vec![
            "10%%%Topics%%%News".into(),
            "10%%%Topics%%%Deals".into(),
            "20%%%Region%%%EU".into(),
        ];
        form
    }

    #[test]
    fn test_auto_uses_configured_groups() {
        let submission = Submission::new().group("10", "x");
        let groups = resolve_groups(&form(GroupMethod::Auto), &submission).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], "10%%%Topics%%%News");
    }

    #[test]
    fn test_multi_unions_selections() {
        let submission = Submission::new()
            .group(
                "10",
                FieldValue::Multi(vec!["10%%%Topics%%%News".into(), "10%%%Topics%%%Deals".into()]),
            )
            .group("20", "20%%%Region%%%EU");
        let groups = resolve_groups(&form(GroupMethod::Multi), &submission).unwrap();
        assert_eq!(
            groups,
            vec!["10%%%Topics%%%News", "10%%%Topics%%%Deals", "20%%%Region%%%EU"]
        );
    }

    #[test]
    fn test_single_keeps_one_per_grouping() {
        let submission = Submission::new().group(
            "10",
            FieldValue::Multi(vec![
                "".into(),
                "10%%%Topics%%%Deals".into(),
                "10%%%Topics%%%News".into(),
            ]),
        );
        let groups = resolve_groups(&form(GroupMethod::Select), &submission).unwrap();
        assert_eq!(groups, vec!["10%%%Topics%%%Deals"]);
    }

    #[test]
    fn test_optional_methods_allow_no_selection() {
        for method in [GroupMethod::Multi, GroupMethod::Single, GroupMethod::Select] {
            assert!(resolve_groups(&form(method), &Submission::new()).unwrap().is_empty());
        }
    }

    #[test]
    fn test_required_methods_name_missing_grouping() {
        let submission = Submission::new().group("10", "10%%%Topics%%%News");
        for method in [GroupMethod::SingleReq, GroupMethod::SelectReq] {
            assert_eq!(
                resolve_groups(&form(method), &submission),
                Err(ValidationError::MissingRequiredGroup("20".into()))
            );
        }

        let blank = Submission::new()
            .group("10", "")
            .group("20", "20%%%Region%%%EU");
        assert_eq!(
            resolve_groups(&form(GroupMethod::SingleReq), &blank),
            Err(ValidationError::MissingRequiredGroup("10".into()))
        );
    }

    #[test]
    fn test_required_without_offered_groupings() {
        let mut form = form(GroupMethod::SelectReq);
        form.groups.clear();
        assert!(resolve_groups(&form, &Submission::new()).unwrap().is_empty());
    }
}
