//! Form selection for a described page

use super::FormSummary;
use crate::output::OutputFormat;
use clap::{Args, ValueEnum};
use serde::Serialize;
use signup_common::{
    parse_form_id_list, CategoryTree, FormDefinition, PageContext, PageView, Settings,
};
use signup_display::{
    CookieInstruction, FormPlacements, PopupDecision, ShortcodeAttributes, VisitorCookies,
};
use signup_forms::FormRegistry;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Placement {
    /// Plain selection, no placement gates
    Any,
    AfterContent,
    Shortcode,
    Popup,
    Lock,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Static page id
    #[arg(long, conflicts_with = "post")]
    page: Option<u64>,

    /// Post id
    #[arg(long)]
    post: Option<u64>,

    /// Post category (repeatable)
    #[arg(long = "category")]
    categories: Vec<u64>,

    /// Category parent link CHILD:PARENT (repeatable)
    #[arg(long = "parent", value_parser = parse_edge)]
    parents: Vec<(u64, u64)>,

    /// Front page
    #[arg(long)]
    front: bool,

    /// Archive, search or blog index
    #[arg(long, conflicts_with_all = ["page", "post"])]
    listing: bool,

    /// Request URL
    #[arg(long, default_value = "")]
    url: String,

    /// Comma separated allow-list (shortcode `forms` attribute for the shortcode placement)
    #[arg(long)]
    allowed: Option<String>,

    /// Placement to evaluate
    #[arg(long, value_enum, default_value = "any")]
    placement: Placement,

    /// Visitor `Cookie` header
    #[arg(long, default_value = "")]
    cookie: String,
}

impl SelectArgs {
    fn context(&self) -> PageContext {
        let mut context = match (self.page, self.post) {
            (Some(page), _) => PageContext::page(page),
            (None, Some(post)) => PageContext::post(post, self.categories.iter().copied()),
            (None, None) => PageContext::default(),
        };
        if self.listing {
            context.view = PageView::Listing;
        }
        context.is_front_page = self.front;
        context.with_url(self.url.as_str())
    }
}

#[derive(Debug, Serialize)]
struct SelectionReport {
    form: Option<FormSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    popup_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    set_cookies: Vec<String>,
}

impl SelectionReport {
    fn form(form: Option<FormDefinition>) -> Self {
        Self {
            form: form.as_ref().map(FormSummary::from),
            popup_delay_ms: None,
            set_cookies: Vec::new(),
        }
    }

    fn popup(decision: PopupDecision) -> Self {
        let plan = decision.plan.as_ref();
        let opened = plan.map(|p| p.on_open.as_slice()).unwrap_or_default();
        Self {
            form: plan.map(|p| FormSummary::from(&p.form)),
            popup_delay_ms: plan.map(|p| p.delay_ms),
            set_cookies: decision
                .cookies
                .iter()
                .chain(opened)
                .map(CookieInstruction::to_header)
                .collect(),
        }
    }
}

pub fn handle(args: SelectArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let registry = FormRegistry::from_settings(settings);
    let categories = CategoryTree::from_edges(args.parents.iter().copied());
    let placements = FormPlacements::new(settings, &registry, &categories);
    let context = args.context();
    let cookies = VisitorCookies::from_header(&args.cookie);

    let report = match args.placement {
        Placement::Any => {
            let allowed = args.allowed.as_deref().map(parse_form_id_list).unwrap_or_default();
            SelectionReport::form(registry.select(&context, &allowed, &categories))
        }
        Placement::AfterContent => SelectionReport::form(placements.after_content(&context)),
        Placement::Shortcode => {
            let attributes = ShortcodeAttributes {
                forms: args.allowed.clone(),
            };
            SelectionReport::form(placements.shortcode(&context, &attributes))
        }
        Placement::Popup => SelectionReport::popup(placements.popup(&context, &cookies)),
        Placement::Lock => SelectionReport::form(placements.content_lock(&context, &cookies)),
    };

    if report.form.is_none() {
        tracing::info!("No form selected");
    }
    format.print(&report)
}

fn parse_edge(raw: &str) -> Result<(u64, u64), String> {
    let (child, parent) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected CHILD:PARENT, got `{}`", raw))?;
    let parse = |s: &str| s.trim().parse::<u64>().map_err(|e| format!("{}: {}", s, e));
    Ok((parse(child)?, parse(parent)?))
}
