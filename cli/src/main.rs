//! Signup CLI
//!
//! Command-line front-end for the signup engine.
//!
//! # Usage
//!
//! ```bash
//! signup -s site.toml check
//! signup -s site.toml forms list --format json
//! signup -s site.toml select --post 42 --category 7 --parent 7:3
//! signup -s site.toml select --page 9 --placement popup --cookie "pinpointe_p=2"
//! signup -s site.toml submit 1 --field email=ann@example.com --field TOPICS=rust --field TOPICS=go
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use signup_common::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "signup")]
#[command(version)]
#[command(about = "Newsletter signup form engine", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, short, env = "SIGNUP_SETTINGS", default_value = "signup.toml")]
    settings: PathBuf,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the settings file
    Check,
    /// Inspect configured forms
    Forms {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Select the form shown on a page
    Select(commands::select::SelectArgs),
    /// Run a submission against an in-memory list
    Submit(commands::submit::SubmitArgs),
}

#[derive(Subcommand)]
enum FormCommands {
    /// List all forms
    List,
    /// Show one form
    Show { id: u32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.settings)
        .with_context(|| format!("cannot load settings from {}", cli.settings.display()))?;

    match cli.command {
        Commands::Check => commands::check::handle(&settings, cli.format),
        Commands::Forms { action } => commands::forms::handle(action, &settings, cli.format),
        Commands::Select(args) => commands::select::handle(args, &settings, cli.format),
        Commands::Submit(args) => commands::submit::handle(args, settings, cli.format).await,
    }
}
