//! Submission dry run

use super::parse_key_val;
use crate::output::OutputFormat;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use signup_common::{FormId, Settings};
use signup_forms::{build_subscription_payload, FieldValue, FormRegistry, Submission};
use signup_sync::{InMemorySubscriptionClient, SubmissionService, Subscriber};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Form id
    form: u32,

    /// Field value TAG=VALUE (repeat a tag for multi-value fields)
    #[arg(long = "field", value_parser = parse_key_val)]
    fields: Vec<(String, String)>,

    /// Group selection GROUPING=IDENTIFIER (repeatable)
    #[arg(long = "group", value_parser = parse_key_val)]
    groups: Vec<(String, String)>,

    /// Submission as a JSON file (`{"custom": {...}, "groups": {...}}`)
    #[arg(long, conflicts_with_all = ["fields", "groups"])]
    data: Option<PathBuf>,

    /// Print the coerced payload instead of subscribing
    #[arg(long)]
    payload_only: bool,
}

impl SubmitArgs {
    fn submission(&self) -> anyhow::Result<Submission> {
        if let Some(path) = &self.data {
            let content = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            return Ok(serde_json::from_str(&content)?);
        }
        Ok(Submission {
            fields: collect(&self.fields),
            groups: collect(&self.groups),
        })
    }
}

/// Repeated keys become multi-value
fn collect(pairs: &[(String, String)]) -> BTreeMap<String, FieldValue> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        values.entry(key.clone()).or_default().push(value.clone());
    }
    values
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                FieldValue::Text(values.remove(0))
            } else {
                FieldValue::Multi(values)
            };
            (key, value)
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct SubmitReport {
    response: signup_sync::SubmissionResponse,
    subscribers: Vec<Subscriber>,
}

pub async fn handle(
    args: SubmitArgs,
    settings: Settings,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let form_id = FormId::new(args.form)?;
    let submission = args.submission()?;

    if args.payload_only {
        let form = settings.form(form_id).with_context(|| format!("no form with id {}", form_id))?;
        let payload = build_subscription_payload(form, &submission, &settings.localization)?;
        return format.print(&payload);
    }

    let registry = Arc::new(FormRegistry::from_settings(&settings));
    let client = Arc::new(InMemorySubscriptionClient::new());
    let service = SubmissionService::new(Arc::new(settings), registry, client.clone());

    let response = service.submit(form_id, &submission).await;
    format.print(&SubmitReport {
        response,
        subscribers: client.subscribers(),
    })
}
