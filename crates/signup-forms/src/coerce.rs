//! Field coercion
//!
//! Turns a visitor submission into a [`SubscriptionPayload`] for one form.
//! Each configured field is looked up by tag and coerced by type; a value
//! that cannot be coerced is treated exactly like a missing one, so it
//! fails a required field and is dropped from an optional one.

use crate::error::{ValidationError, ValidationResult};
use crate::groups::resolve_groups;
use crate::submission::{FieldValue, Submission, SubscriptionPayload};
use signup_common::settings::Localization;
use signup_common::{FieldDefinition, FieldType, FormDefinition};
use std::collections::BTreeMap;
use tracing::debug;

/// Coerces submissions using the site's date patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCoercer {
    localization: Localization,
}

impl FieldCoercer {
    /// Create coercer for the configured date and birthday patterns
    pub fn new(localization: Localization) -> Self {
        Self { localization }
    }

    /// Validate `submission` against `form` and build the payload
    ///
    /// Fields are checked in form order, then the email, then groups; the
    /// first failure is returned.
    pub fn build(
        &self,
        form: &FormDefinition,
        submission: &Submission,
    ) -> ValidationResult<SubscriptionPayload> {
        let list_id = match form.list() {
            Some(list) if form.is_active() => list.to_string(),
            _ => return Err(ValidationError::InactiveForm(form.id)),
        };

        let mut email = None;
        let mut custom_fields = BTreeMap::new();

        for field in &form.fields {
            let coerced = submission
                .value(&field.tag)
                .and_then(|raw| self.coerce(field, raw));

            let Some(value) = coerced else {
                // missing email is reported once, after the loop
                if field.required && field.field_type != FieldType::Email {
                    return Err(ValidationError::MissingRequiredField(field.tag.clone()));
                }
                debug!("Dropping optional field {}", field.tag);
                continue;
            };

            if field.field_type == FieldType::Email {
                if let FieldValue::Text(address) = value {
                    email = Some(address);
                }
            } else {
                custom_fields.insert(field.tag.clone(), value);
            }
        }

        let email = email.ok_or(ValidationError::MissingEmail)?;
        let groups = resolve_groups(form, submission)?;

        Ok(SubscriptionPayload {
            email,
            list_id,
            tag_id: form.tag().map(str::to_string),
            groups,
            custom_fields,
        })
    }

    /// Coerce one non-empty raw value; `None` means unusable
    fn coerce(&self, field: &FieldDefinition, raw: &FieldValue) -> Option<FieldValue> {
        if field.field_type == FieldType::Checkbox {
            return Some(raw.clone());
        }

        // every other type takes a single string
        let text = raw.as_text()?;

        let coerced = match field.field_type {
            FieldType::Email => text.trim().to_string(),
            FieldType::Dropdown | FieldType::RadioButton => field.choice_label(text)?.to_string(),
            FieldType::Date => self.localization.date_format.normalize(text)?,
            FieldType::Birthday => self.localization.birthday_format.normalize(text)?,
            _ => text.to_string(),
        };

        if coerced.is_empty() {
            return None;
        }
        Some(FieldValue::Text(coerced))
    }
}

/// Build the subscription payload for `submission` against `form`
pub fn build_subscription_payload(
    form: &FormDefinition,
    submission: &Submission,
    localization: &Localization,
) -> ValidationResult<SubscriptionPayload> {
    FieldCoercer::new(*localization).build(form, submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signup_common::{BirthdayFormat, Condition, DateFormat, FormId, GroupMethod};

    fn email_form() -> FormDefinition {
        FormDefinition::new(FormId::from_position(0), "list-1")
            .with_field(FieldDefinition::new("email", FieldType::Email).required())
    }

    fn birthdays(index: u8) -> Localization {
        Localization {
            birthday_format: BirthdayFormat::from_index(index).unwrap(),
            ..Default::default()
        }
    }

    fn build(
        form: &FormDefinition,
        submission: &Submission,
    ) -> ValidationResult<SubscriptionPayload> {
        build_subscription_payload(form, submission, &Localization::default())
    }

    #[test]
    fn test_minimal_payload() {
        let mut form = email_form();
        form.tag_id = Some("tag-9".into());
        let payload = build(&form, &Submission::new().field("email", " a@b.c ")).unwrap();

        assert_eq!(payload.email, "a@b.c");
        assert_eq!(payload.list_id, "list-1");
        assert_eq!(payload.tag_id.as_deref(), Some("tag-9"));
        assert!(payload.custom_fields.is_empty());
        assert!(payload.groups.is_empty());
    }

    #[test]
    fn test_required_email_missing() {
        assert_eq!(build(&email_form(), &Submission::new()), Err(ValidationError::MissingEmail));
        assert_eq!(
            build(&email_form(), &Submission::new().field("email", "")),
            Err(ValidationError::MissingEmail)
        );
    }

    #[test]
    fn test_form_without_email_field() {
        let form = FormDefinition::new(FormId::from_position(0), "list-1")
            .with_field(FieldDefinition::new("NAME", FieldType::Text));
        assert_eq!(
            build(&form, &Submission::new().field("NAME", "Ann")),
            Err(ValidationError::MissingEmail)
        );
    }

    #[test]
    fn test_required_and_optional_fields() {
        let form = email_form()
            .with_field(FieldDefinition::new("NAME", FieldType::Text).required())
            .with_field(FieldDefinition::new("CITY", FieldType::Text));

        assert_eq!(
            build(&form, &Submission::new().field("email", "a@b.c")),
            Err(ValidationError::MissingRequiredField("NAME".into()))
        );

        let submission = Submission::new().field("email", "a@b.c").field("NAME", "Ann");
        let payload = build(&form, &submission).unwrap();
        assert_eq!(payload.custom_fields.get("NAME"), Some(&FieldValue::from("Ann")));
        assert!(!payload.custom_fields.contains_key("CITY"));
    }

    #[test]
    fn test_field_errors_follow_form_order() {
        let form = FormDefinition::new(FormId::from_position(0), "list-1")
            .with_field(FieldDefinition::new("A", FieldType::Text).required())
            .with_field(FieldDefinition::new("email", FieldType::Email).required())
            .with_field(FieldDefinition::new("B", FieldType::Text).required());

        assert_eq!(
            build(&form, &Submission::new()),
            Err(ValidationError::MissingRequiredField("A".into()))
        );
        assert_eq!(
            build(&form, &Submission::new().field("A", "x")),
            Err(ValidationError::MissingRequiredField("B".into()))
        );
    }

    #[test]
    fn test_dropdown_key_resolution() {
        let fruit = FieldDefinition::new("FRUIT", FieldType::Dropdown)
            .with_choices([("a", "Apple"), ("b", "Banana")]);
        let optional = email_form().with_field(fruit.clone());
        let required = email_form().with_field(fruit.required());

        let submission = Submission::new().field("email", "a@b.c").field("FRUIT", "b");
        let payload = build(&optional, &submission).unwrap();
        assert_eq!(payload.custom_fields.get("FRUIT"), Some(&FieldValue::from("Banana")));

        let submission = Submission::new().field("email", "a@b.c").field("FRUIT", "z");
        let payload = build(&optional, &submission).unwrap();
        assert!(!payload.custom_fields.contains_key("FRUIT"));

        assert_eq!(
            build(&required, &Submission::new().field("email", "a@b.c").field("FRUIT", "z")),
            Err(ValidationError::MissingRequiredField("FRUIT".into()))
        );
    }

    #[test]
    fn test_radio_uses_choice_label() {
        let form = email_form()
            .with_field(
                FieldDefinition::new("SIZE", FieldType::RadioButton).with_choices([("s", "Small")]),
            );
        let submission = Submission::new().field("email", "a@b.c").field("SIZE", "s");
        let payload = build(&form, &submission).unwrap();
        assert_eq!(payload.custom_fields.get("SIZE"), Some(&FieldValue::from("Small")));
    }

    #[test]
    fn test_checkbox_passthrough() {
        let form = email_form().with_field(FieldDefinition::new("TOPICS", FieldType::Checkbox));
        let topics = FieldValue::Multi(vec!["rust".into(), "".into(), "go".into()]);
        let submission = Submission::new().field("email", "a@b.c").field("TOPICS", topics.clone());
        let payload = build(&form, &submission).unwrap();
        assert_eq!(payload.custom_fields.get("TOPICS"), Some(&topics));
    }

    #[test]
    fn test_multi_value_on_text_field_is_missing() {
        let form =
            email_form().with_field(FieldDefinition::new("NAME", FieldType::Text).required());
        let submission = Submission::new()
            .field("email", "a@b.c")
            .field("NAME", FieldValue::Multi(vec!["a".into(), "b".into()]));
        assert_eq!(
            build(&form, &submission),
            Err(ValidationError::MissingRequiredField("NAME".into()))
        );
    }

    #[test]
    fn test_date_normalized() {
        let form =
            email_form().with_field(FieldDefinition::new("JOINED", FieldType::Date).required());
        let localization = Localization {
            date_format: DateFormat::from_index(4).unwrap(),
            ..Default::default()
        };

        let payload = build_subscription_payload(
            &form,
            &Submission::new().field("email", "a@b.c").field("JOINED", "07-04-2024"),
            &localization,
        )
        .unwrap();
        assert_eq!(payload.custom_fields.get("JOINED"), Some(&FieldValue::from("2024-07-04")));

        assert_eq!(
            build_subscription_payload(
                &form,
                &Submission::new().field("email", "a@b.c").field("JOINED", "2024/07/04"),
                &localization,
            ),
            Err(ValidationError::MissingRequiredField("JOINED".into()))
        );
    }

    #[test]
    fn test_birthday_canonical_regardless_of_order() {
        let form = email_form().with_field(FieldDefinition::new("BDAY", FieldType::Birthday));
        let submit = |raw: &str| Submission::new().field("email", "a@b.c").field("BDAY", raw);

        // mm-dd
        let payload = build_subscription_payload(&form, &submit("03-25"), &birthdays(4)).unwrap();
        assert_eq!(payload.custom_fields.get("BDAY"), Some(&FieldValue::from("03/25")));

        // dd-mm
        let payload = build_subscription_payload(&form, &submit("25-03"), &birthdays(1)).unwrap();
        assert_eq!(payload.custom_fields.get("BDAY"), Some(&FieldValue::from("03/25")));
    }

    #[test]
    fn test_malformed_birthday_follows_required_policy() {
        let optional = email_form().with_field(FieldDefinition::new("BDAY", FieldType::Birthday));
        let required =
            email_form().with_field(FieldDefinition::new("BDAY", FieldType::Birthday).required());

        for raw in ["3-25", "03/25", "0a-25", "03-255"] {
            let submission = Submission::new().field("email", "a@b.c").field("BDAY", raw);
            let payload =
                build_subscription_payload(&optional, &submission, &birthdays(4)).unwrap();
            assert!(!payload.custom_fields.contains_key("BDAY"), "{raw}");
            assert_eq!(
                build_subscription_payload(&required, &submission, &birthdays(4)),
                Err(ValidationError::MissingRequiredField("BDAY".into()))
            );
        }
    }

    #[test]
    fn test_other_types_pass_through() {
        let form = email_form()
            .with_field(FieldDefinition::new("AGE", FieldType::Number))
            .with_field(FieldDefinition::new("SITE", FieldType::Url))
            .with_field(FieldDefinition::new("PHONE", FieldType::Phone));
        let payload = build(
            &form,
            &Submission::new()
                .field("email", "a@b.c")
                .field("AGE", "forty")
                .field("SITE", "example.com")
                .field("PHONE", "555 0100"),
        )
        .unwrap();
        assert_eq!(payload.custom_fields.get("AGE"), Some(&FieldValue::from("forty")));
        assert_eq!(payload.custom_fields.len(), 3);
    }

    #[test]
    fn test_inactive_form_rejected() {
        let disabled = email_form().with_condition(Condition::Disabled);
        assert!(matches!(
            build(&disabled, &Submission::new().field("email", "a@b.c")),
            Err(ValidationError::InactiveForm(_))
        ));

        let mut listless = email_form();
        listless.list_id = Some("  ".into());
        assert!(matches!(
            build(&listless, &Submission::new().field("email", "a@b.c")),
            Err(ValidationError::InactiveForm(_))
        ));
    }

    #[test]
    fn test_groups_checked_after_fields() {
        let mut form =
            email_form().with_field(FieldDefinition::new("NAME", FieldType::Text).required());
        form.group_method = GroupMethod::SingleReq;
        form.groups = vec!["10%%%Topics%%%News".into()];

        assert_eq!(
            build(&form, &Submission::new()),
            Err(ValidationError::MissingRequiredField("NAME".into()))
        );
        assert_eq!(
            build(&form, &Submission::new().field("NAME", "Ann")),
            Err(ValidationError::MissingEmail)
        );
        assert_eq!(
            build(&form, &Submission::new().field("NAME", "Ann").field("email", "a@b.c")),
            Err(ValidationError::MissingRequiredGroup("10".into()))
        );

        let payload = build(
            &form,
            &Submission::new()
                .field("NAME", "Ann")
                .field("email", "a@b.c")
                .group("10", "10%%%Topics%%%News"),
        )
        .unwrap();
        assert_eq!(payload.groups, vec!["10%%%Topics%%%News"]);
    }

    #[test]
    fn test_idempotent() {
        let form = email_form()
            .with_field(FieldDefinition::new("BDAY", FieldType::Birthday))
            .with_field(
                FieldDefinition::new("FRUIT", FieldType::Dropdown).with_choices([("a", "Apple")]),
            );
        let submission = Submission::new()
            .field("email", "a@b.c")
            .field("BDAY", "25/03")
            .field("FRUIT", "a");

        let first = build(&form, &submission);
        let second = build(&form, &submission);
        assert!(first.is_ok());
        assert_eq!(first, second);
    }
}
