//! Form inspection

use super::FormSummary;
use crate::{output::OutputFormat, FormCommands};
use anyhow::Context;
use signup_common::{FormId, Settings};

pub fn handle(
    action: FormCommands,
    settings: &Settings,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        FormCommands::List => {
            let forms: Vec<FormSummary> = settings.forms.iter().map(FormSummary::from).collect();
            format.print(&forms)
        }
        FormCommands::Show { id } => {
            let id = FormId::new(id)?;
            let form = settings.form(id).with_context(|| format!("no form with id {}", id))?;
            format.print(form)
        }
    }
}
