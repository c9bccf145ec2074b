//! CLI Commands

pub mod check;
pub mod forms;
pub mod select;
pub mod submit;

use serde::Serialize;
use signup_common::{FormDefinition, FormId};

/// One-line view of a form
#[derive(Debug, Serialize)]
pub struct FormSummary {
    pub id: FormId,
    pub title: Option<String>,
    pub list: Option<String>,
    pub condition: &'static str,
    pub group_method: signup_common::GroupMethod,
    pub fields: usize,
    pub active: bool,
}

impl From<&FormDefinition> for FormSummary {
    fn from(form: &FormDefinition) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
            list: form.list().map(str::to_string),
            condition: form.condition.key(),
            group_method: form.group_method,
            fields: form.fields.len(),
            active: form.is_active(),
        }
    }
}

/// Parse `key=value`
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))
}
