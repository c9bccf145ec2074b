//! Settings check

use crate::output::OutputFormat;
use serde::Serialize;
use signup_common::{FormId, Settings};

#[derive(Debug, Serialize)]
struct CheckReport {
    integrated: bool,
    forms: usize,
    active_forms: usize,
    incomplete_forms: Vec<FormId>,
    popup_form: Option<FormId>,
    lock_form: Option<FormId>,
    sync_list: Option<String>,
}

pub fn handle(settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let report = CheckReport {
        integrated: settings.is_integrated(),
        forms: settings.forms.len(),
        active_forms: settings.forms.iter().filter(|f| f.is_active()).count(),
        incomplete_forms: settings
            .forms
            .iter()
            .filter(|f| !f.is_complete())
            .map(|f| f.id)
            .collect(),
        popup_form: settings.popup.form.filter(|_| settings.popup.enabled),
        lock_form: settings.lock.form.filter(|_| settings.lock.enabled),
        sync_list: settings.sync.list.clone(),
    };

    for id in &report.incomplete_forms {
        tracing::warn!("Form {} does not have exactly one email field", id);
    }

    format.print(&report)
}
