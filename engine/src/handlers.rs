//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - ask: one turn, streamed to stdout
//! - chat: interactive session loop
//! - route: routing decision plus a stub backend reply
//! - search: raw aggregated search results
//! - models: the model table
//! - config show / path

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::{ProcessOptions, ProcessOutcome, Session, SessionRegistry, TaskOrchestrator};
use crate::cli::ChatCommand;
use crate::config::Config;
use crate::identity::IdentityProfile;
use crate::llm::router::ModelRouter;
use crate::llm::StubBackend;
use crate::search::SearchAggregator;
use crate::stream::StreamingEmitter;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

fn process_options(model: Option<String>, web: bool, config: &Config) -> ProcessOptions {
    ProcessOptions {
        model_id: model.unwrap_or_else(|| config.router.default_model.clone()),
        web_mode: web,
    }
}

fn build_aggregator(config: &Config) -> Result<Arc<SearchAggregator>> {
    let aggregator =
        SearchAggregator::from_config(&config.search).context("Failed to set up search")?;
    Ok(Arc::new(aggregator))
}

/// Print each chunk's new suffix as it arrives
///
/// Chunks are growing prefixes, so only the part past what was already
/// printed is written.
async fn print_stream(chunks: impl Stream<Item = String>) -> Result<()> {
    futures::pin_mut!(chunks);
    let mut stdout = std::io::stdout();
    let mut printed = 0;

    while let Some(chunk) = chunks.next().await {
        if let Some(delta) = chunk.get(printed..) {
            stdout.write_all(delta.as_bytes())?;
            stdout.flush()?;
        }
        printed = chunk.len();
    }
    writeln!(stdout)?;
    Ok(())
}

fn outcome_json(outcome: &ProcessOutcome) -> serde_json::Value {
    json!({
        "response": outcome.response_text,
        "is_identity_response": outcome.is_canned_identity_response,
        "task": outcome.task,
        "search": outcome.search_data,
    })
}

/// Answer one message
pub async fn handle_ask(
    text: String,
    model: Option<String>,
    web: bool,
    no_stream: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let orchestrator = TaskOrchestrator::new(config, build_aggregator(config)?)?;
    let emitter = StreamingEmitter::new(config.stream.tick_interval());
    let mut session = Session::new(orchestrator, emitter);
    let options = process_options(model, web, config);

    let turn = session.submit(&text, &options).await;

    match format {
        OutputFormat::Text => {
            if no_stream {
                println!("{}", turn.outcome.response_text);
            } else {
                print_stream(turn.chunks).await?;
            }

            if let Some(task) = &turn.outcome.task {
                tracing::debug!(
                    "Task {} ({}) finished as {}",
                    task.id,
                    task.category,
                    task.status
                );
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome_json(&turn.outcome))?
            );
        }
    }

    session.end().await;
    Ok(())
}

/// Interactive chat over stdin
pub async fn handle_chat(
    model: Option<String>,
    web: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let mut registry = SessionRegistry::new(config.clone(), build_aggregator(config)?);
    registry.open().await?;
    let options = process_options(model, web, config);

    if format == OutputFormat::Text {
        println!(
            "Chatting with {}. Commands: /new /memory /history /clear /tasks /status /quit",
            config.identity.name
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if format == OutputFormat::Text {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = ChatCommand::parse(&line) else {
            continue;
        };

        match command {
            ChatCommand::Quit => break,
            ChatCommand::New => {
                if let Some(id) = registry.active_id().map(str::to_string) {
                    registry.close(&id).await;
                }
                let id = registry.open().await?;
                println!("Started a new conversation ({})", id);
            }
            ChatCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
            }
            other => {
                let session = registry
                    .active_mut()
                    .context("No active conversation")?;
                run_chat_command(session, other, &options, format).await?;
            }
        }
    }

    if let Some(id) = registry.active_id().map(str::to_string) {
        registry.close(&id).await;
    }
    Ok(())
}

async fn run_chat_command(
    session: &mut Session,
    command: ChatCommand,
    options: &ProcessOptions,
    format: OutputFormat,
) -> Result<()> {
    match (command, format) {
        (ChatCommand::Message(text), OutputFormat::Text) => {
            let turn = session.submit(&text, options).await;
            print_stream(turn.chunks).await?;
        }
        (ChatCommand::Message(text), OutputFormat::Json) => {
            let turn = session.submit(&text, options).await;
            println!("{}", serde_json::to_string(&outcome_json(&turn.outcome))?);
        }
        (ChatCommand::Memory, OutputFormat::Text) => {
            let memory = session.orchestrator().memory();
            if memory.is_empty() {
                println!("Memory is empty");
            }
            for entry in memory {
                let tags: Vec<_> = entry.tags.iter().map(String::as_str).collect();
                println!(
                    "[{}] importance {} ({})",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.importance,
                    tags.join(", ")
                );
                println!("  {}", entry.content.replace('\n', "\n  "));
            }
        }
        (ChatCommand::Memory, OutputFormat::Json) => {
            println!("{}", serde_json::to_string(session.orchestrator().memory())?);
        }
        (ChatCommand::History, OutputFormat::Text) => {
            let history = session.orchestrator().history();
            if history.is_empty() {
                println!("No conversation yet");
            }
            for turn in history {
                let meta = &turn.metadata;
                let plan: Vec<_> = meta.task_plan.iter().map(|s| s.as_str()).collect();
                println!(
                    "[{}] model {} (selected {}) plan [{}]{}",
                    turn.timestamp.format("%H:%M:%S"),
                    meta.model_used.as_deref().unwrap_or("identity"),
                    meta.selected_model,
                    plan.join(", "),
                    if meta.web_enhanced { " web" } else { "" }
                );
                println!("  you: {}", turn.user);
                println!(
                    "  {}: {}",
                    session.orchestrator().profile().name,
                    turn.reply.replace('\n', "\n  ")
                );
            }
        }
        (ChatCommand::History, OutputFormat::Json) => {
            println!("{}", serde_json::to_string(session.orchestrator().history())?);
        }
        (ChatCommand::Clear, format) => {
            session.cancel_stream().await;
            let orchestrator = session.orchestrator_mut();
            orchestrator.clear_memory();
            orchestrator.clear_history();
            match format {
                OutputFormat::Text => println!("Memory and history cleared"),
                OutputFormat::Json => println!("{}", json!({ "cleared": true })),
            }
        }
        (ChatCommand::Tasks, OutputFormat::Text) => {
            let tasks = session.orchestrator().tasks();
            if tasks.is_empty() {
                println!("No tasks yet");
            }
            for task in tasks {
                println!("{}  {:<15} {:<9} {}", task.id, task.category, task.status, task.input);
                for step in &task.steps {
                    println!(
                        "    - {} ({}, {}ms)",
                        step.name,
                        step.status,
                        step.duration_ms().unwrap_or(0)
                    );
                }
            }
        }
        (ChatCommand::Tasks, OutputFormat::Json) => {
            println!("{}", serde_json::to_string(session.orchestrator().tasks())?);
        }
        (ChatCommand::Status, format) => {
            let status = session.orchestrator().status();
            let last = status.last_task_status.map(|s| s.to_string());
            match format {
                OutputFormat::Text => {
                    println!("Session:  {}", status.session_id);
                    println!("Tasks:    {}", status.task_count);
                    println!("Memory:   {} entries", status.memory_entries);
                    println!("History:  {} turns", status.transcript_turns);
                    println!("Last:     {}", last.as_deref().unwrap_or("-"));
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        json!({
                            "session_id": status.session_id,
                            "task_count": status.task_count,
                            "memory_entries": status.memory_entries,
                            "transcript_turns": status.transcript_turns,
                            "last_task_status": last,
                        })
                    );
                }
            }
        }
        (ChatCommand::New | ChatCommand::Quit | ChatCommand::Unknown(_), _) => {}
    }

    Ok(())
}

/// Show the routing decision for a prompt and the stub backend's reply
pub async fn handle_route(
    prompt: String,
    model: Option<String>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let router = ModelRouter::new(config.router.short_prompt_threshold);
    let profile = IdentityProfile::from_config(&config.identity);
    let backend = StubBackend::new(&profile);
    let context = StubBackend::context_for(&profile, Vec::new());

    let category = router.classify(&prompt);
    let routed = router
        .process(&prompt, model.as_deref(), &backend, &context)
        .await;

    match format {
        OutputFormat::Text => {
            println!("Model:     {} ({})", routed.model_used.display_name, routed.model_used.id);
            println!("Category:  {:?}", category);
            println!("Reasoning: {}", routed.reasoning);
            println!();
            println!("{}", routed.response);
        }
        OutputFormat::Json => {
            let output = json!({
                "model": routed.model_used,
                "category": format!("{:?}", category),
                "reasoning": routed.reasoning,
                "response": routed.response,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Run an aggregated search
pub async fn handle_search(query: String, config: &Config, format: OutputFormat) -> Result<()> {
    let aggregator = build_aggregator(config)?;
    let response = aggregator.search(&query).await;

    match format {
        OutputFormat::Text => {
            println!(
                "{} results ({} shown) in {}ms from {}",
                response.total_result_count,
                response.results.len(),
                response.elapsed_ms,
                if response.contributing_sources.is_empty() {
                    "no providers".to_string()
                } else {
                    response.contributing_sources.join(", ")
                }
            );
            println!();

            for (i, result) in response.results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   {}", result.url);
                if !result.snippet.is_empty() {
                    println!("   {}", result.snippet);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// List the model table
pub async fn handle_models(config: &Config, format: OutputFormat) -> Result<()> {
    let router = ModelRouter::new(config.router.short_prompt_threshold);
    let models = router.available_models();

    match format {
        OutputFormat::Text => {
            for model in models {
                let marker = if model.id == config.router.default_model {
                    "*"
                } else {
                    " "
                };
                println!("{} {:<9} {:<22} {}", marker, model.id, model.display_name, model.description);
                println!("             {}", model.strength_tags.join(", "));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(models)?);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub async fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let contents =
                toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            println!("{}", contents);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

/// Print where the configuration is read from
pub async fn handle_config_path(override_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path: PathBuf = match override_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "path": path, "exists": path.exists() })),
    }
    Ok(())
}
