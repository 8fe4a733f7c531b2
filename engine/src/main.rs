// Parley conversational engine
// Main entry point for the parley binary

use clap::Parser;
use parley_engine::cli::{Cli, Command, ConfigAction};
use parley_engine::config::Config;
use parley_engine::handlers::{
    handle_ask, handle_chat, handle_config_path, handle_config_show, handle_models, handle_route,
    handle_search, OutputFormat,
};
use parley_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log beats the configured level; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    tracing::debug!(
        "Parley v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Ask {
            text,
            model,
            web,
            no_stream,
        } => handle_ask(text, model, web, no_stream, &config, format).await,

        Command::Chat { model, web } => handle_chat(model, web, &config, format).await,

        Command::Route { prompt, model } => handle_route(prompt, model, &config, format).await,

        Command::Search { query } => handle_search(query, &config, format).await,

        Command::Models => handle_models(&config, format).await,

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format).await,
            ConfigAction::Path => handle_config_path(cli.config.as_deref(), format).await,
        },
    }
}
