//! Tag Limit admin CLI
//!
//! Manages the tag limit settings file.
//!
//! Usage:
//!   tag-limit show [--json]
//!   tag-limit set-max 3
//!   tag-limit enable post page
//!   tag-limit check --chips 4 --input "rust, wasm"

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tag_limit::cli;
use tag_limit::config::Config;
use tag_limit::settings::{SettingsService, YamlSettingsStorage};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (overrides TAG_LIMIT_SETTINGS_PATH).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current settings.
    Show {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Initialise settings on first use.
    Install,
    /// Set the maximum number of tags per item.
    SetMax {
        /// New maximum; coerced to an integer.
        value: String,
    },
    /// Enable tag limiting for content types.
    Enable {
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Disable tag limiting for content types.
    Disable {
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// List content types that can be limited.
    ContentTypes,
    /// Print the client context for an editor page.
    Context {
        /// Content type of the item being edited.
        content_type: String,
    },
    /// Evaluate the guard for a given editor state.
    Check {
        /// Committed tag chips.
        #[arg(long)]
        chips: usize,
        /// Pending text in the tag input.
        #[arg(long, default_value = "")]
        input: String,
        /// Use this limit instead of the stored one.
        #[arg(long, allow_negative_numbers = true)]
        max: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(path) = args.settings {
        config.settings_path = path;
    }
    debug!(path = %config.settings_path.display(), "using settings file");

    let ignore = config.ignore_list();
    let service = SettingsService::new(Arc::new(YamlSettingsStorage::new(
        config.settings_path.clone(),
    )));

    match args.command {
        Command::Show { json } => cli::cmd_show(&service, json).await,
        Command::Install => cli::cmd_install(&service).await,
        Command::SetMax { value } => cli::cmd_set_max(&service, &value).await,
        Command::Enable { types } => cli::cmd_enable(&service, &ignore, &types).await,
        Command::Disable { types } => cli::cmd_disable(&service, &types).await,
        Command::ContentTypes => {
            cli::cmd_content_types(&service, &ignore, &config.content_types).await
        }
        Command::Context { content_type } => cli::cmd_context(&service, &content_type).await,
        Command::Check { chips, input, max } => cli::cmd_check(&service, chips, &input, max).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
