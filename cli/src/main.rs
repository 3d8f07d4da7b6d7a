use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use mediai_core::config::{get_default_config_file, MediConfig};
use mediai_core::{ChatSession, GeminiGateway};
use tracing::{info, warn};

mod app;
mod cli;
mod logging;
mod output;

use crate::cli::Args;
use crate::logging::{init_logging, log_error};
use crate::output::{print_usage_instructions, TerminalSurface};

const APP_NAME: &str = "mediai";

/// Builds the effective configuration: defaults, then the config file, then flags
fn load_config(args: &Args) -> (MediConfig, Option<anyhow::Error>) {
    let file_config = args
        .config
        .clone()
        .map(Ok)
        .unwrap_or_else(|| get_default_config_file(APP_NAME))
        .and_then(|path| MediConfig::load_from_file(&path))
        .context("Failed to load configuration");

    let (file_config, load_error) = match file_config {
        Ok(config) => (config, None),
        Err(e) => (MediConfig::default(), Some(e)),
    };

    let overrides = MediConfig {
        model_name: args.model.clone(),
        max_attempts: args.max_attempts,
        ..MediConfig::default()
    };

    let config = MediConfig::with_defaults()
        .merge(&file_config)
        .merge(&overrides);
    (config, load_error)
}

/// Creates the default config file on first run so users have something to edit
fn write_default_config() {
    let written = get_default_config_file(APP_NAME).and_then(|path| {
        MediConfig::write_default_if_missing(&path).map(|created| (path, created))
    });

    match written {
        Ok((path, true)) => info!(path = %path.display(), "Wrote default configuration"),
        Ok((_, false)) => {}
        Err(e) => warn!("Could not write default configuration: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file may supply GEMINI_API_KEY as the fallback key
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let (config, load_error) = load_config(&args);

    init_logging(config.log_level.as_deref(), args.verbose);
    if let Some(e) = load_error {
        warn!("Using default configuration: {:#}", e);
    }
    if args.config.is_none() {
        write_default_config();
    }

    if config.fallback_api_key().is_empty() && args.api_key.is_none() {
        eprintln!(
            "{}",
            "No API key available. Pass --api-key or set GEMINI_API_KEY.".yellow()
        );
    }

    info!(model = config.model_name(), "Starting MediAI");
    let gateway = GeminiGateway::from_config(&config);
    let mut session = ChatSession::new(gateway, TerminalSurface::new());
    session.set_manual_key(args.api_key.clone());

    if args.interactive {
        if let Err(e) = app::run_interactive_chat(&mut session).await {
            log_error(&format!("Interactive chat failed: {:#}", e));
            return Err(e);
        }
    } else if let Some(prompt) = args.prompt.clone() {
        app::run_single_query(&mut session, prompt, args.suggest).await?;
    } else {
        // No prompt and not interactive, show usage
        print_usage_instructions();
    }

    Ok(())
}
