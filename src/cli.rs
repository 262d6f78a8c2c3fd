//! Command-line interface definition for Rougechat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, history management, and the relay server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rougechat - Minimal conversational chat client
///
/// Talk to an OpenAI-compatible model through a thin local relay,
/// with conversation history persisted between sessions.
#[derive(Parser, Debug, Clone)]
#[command(name = "rougechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Directory for conversation history (overrides the platform default)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Rougechat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Start a fresh conversation instead of resuming the active one
        #[arg(short, long)]
        new: bool,
    },

    /// Run the relay server that forwards messages to the upstream API
    Serve {
        /// Override the listen address from config (ip:port)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Inspect and manage saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations grouped by recency
    List,

    /// Print the full transcript of a conversation
    Show {
        /// Conversation ID (shown by `history list`)
        id: i64,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID (shown by `history list`)
        id: i64,
    },

    /// Rename a conversation
    Rename {
        /// Conversation ID (shown by `history list`)
        id: i64,

        /// New title
        title: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            data_dir: None,
            verbose: false,
            command: Commands::Chat { new: false },
        }
    }
}
