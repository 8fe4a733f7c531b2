//! CLI interface for Parley
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for talking to the engine.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley conversational engine
///
/// Routes each message to a chat, web search or code strategy, keeps an
/// importance-ranked memory of the conversation, and streams replies.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question and stream the reply
    Ask {
        /// The message to send
        text: String,

        /// Model id to use instead of automatic routing
        #[arg(short, long)]
        model: Option<String>,

        /// Record the turn as web mode
        #[arg(long)]
        web: bool,

        /// Print the full reply at once
        #[arg(long)]
        no_stream: bool,
    },

    /// Start an interactive conversation
    Chat {
        /// Model id to use instead of automatic routing
        #[arg(short, long)]
        model: Option<String>,

        /// Record turns as web mode
        #[arg(long)]
        web: bool,
    },

    /// Show which model a prompt routes to
    Route {
        /// Prompt to classify
        prompt: String,

        /// Explicit model choice
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Run an aggregated web search
    Search {
        /// Search query
        query: String,
    },

    /// List available models
    Models,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}

/// Commands accepted inside `parley chat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Start a fresh session
    New,
    /// Show the session's memory
    Memory,
    /// Show every answered turn of the session
    History,
    /// Forget the session's memory and history
    Clear,
    /// List the session's tasks
    Tasks,
    /// Show the session status
    Status,
    /// Leave the chat
    Quit,
    /// Anything else starting with '/'
    Unknown(String),
    /// A regular message
    Message(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line {
            "/new" => ChatCommand::New,
            "/memory" => ChatCommand::Memory,
            "/history" => ChatCommand::History,
            "/clear" => ChatCommand::Clear,
            "/tasks" => ChatCommand::Tasks,
            "/status" => ChatCommand::Status,
            "/quit" | "/exit" => ChatCommand::Quit,
            other if other.starts_with('/') => ChatCommand::Unknown(other.to_string()),
            other => ChatCommand::Message(other.to_string()),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["parley", "models"]);
        assert!(matches!(cli.command, Command::Models));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["parley", "--json", "--log", "debug", "models"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from(["parley", "ask", "what is rust", "--model", "code", "--web"]);
        if let Command::Ask {
            text,
            model,
            web,
            no_stream,
        } = cli.command
        {
            assert_eq!(text, "what is rust");
            assert_eq!(model.as_deref(), Some("code"));
            assert!(web);
            assert!(!no_stream);
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_route_command() {
        let cli = Cli::parse_from(["parley", "route", "write a poem"]);
        if let Command::Route { prompt, model } = cli.command {
            assert_eq!(prompt, "write a poem");
            assert!(model.is_none());
        } else {
            panic!("Expected Route command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["parley", "config", "path", "--config", "/tmp/p.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn test_chat_commands() {
        assert_eq!(ChatCommand::parse("  /new "), Some(ChatCommand::New));
        assert_eq!(ChatCommand::parse("/exit"), Some(ChatCommand::Quit));
        assert_eq!(ChatCommand::parse("/history"), Some(ChatCommand::History));
        assert_eq!(ChatCommand::parse("/clear"), Some(ChatCommand::Clear));
        assert_eq!(
            ChatCommand::parse("/frobnicate"),
            Some(ChatCommand::Unknown("/frobnicate".to_string()))
        );
        assert_eq!(
            ChatCommand::parse("hello"),
            Some(ChatCommand::Message("hello".to_string()))
        );
        assert_eq!(ChatCommand::parse("   "), None);
    }
}
