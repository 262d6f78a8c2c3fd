//! Special commands parser for interactive chat mode
//!
//! This module parses and handles special commands that can be entered during
//! interactive chat sessions. Special commands allow users to:
//! - Start, open, delete, and rename conversations
//! - Edit a previous user message and resubmit it
//! - View session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive; arguments such
//! as titles keep their original case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands modify the session state or provide information,
/// rather than being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new chat
    ///
    /// Clears the transient view and the active selection. The previous
    /// conversation stays saved and can be reopened with `/open`.
    NewChat,

    /// List saved conversations
    ///
    /// Shows the store grouped by recency with each conversation's
    /// `/open` position.
    ListConversations,

    /// Open a conversation by its `/list` position (1-based)
    Open(usize),

    /// Begin editing the user message displayed at this index
    ///
    /// Confirming the edit truncates everything after the edited message
    /// and resubmits it.
    EditMessage(usize),

    /// Abandon a pending edit without changing anything
    CancelEdit,

    /// Delete a conversation
    ///
    /// With a position, deletes that entry; without one, deletes the
    /// active conversation.
    DeleteConversation(Option<usize>),

    /// Rename the active conversation
    Rename(String),

    /// Display current session status
    ///
    /// Shows the active conversation, message count, and exchange state.
    ShowStatus,

    /// Display help information
    ///
    /// Shows all available special commands and their usage.
    Help,

    /// Exit the interactive session
    ///
    /// Gracefully closes the chat session.
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the assistant as a regular message.
    None,
}

/// Parse a user input string into a special command
///
/// Checks if the input matches any special command pattern.
/// Commands are case-insensitive; arguments are taken verbatim from the
/// original input so titles keep their case.
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
/// Returns Err(CommandError) for invalid commands or invalid arguments.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Command Examples
///
/// Conversation management:
/// - `/new` - Start a new chat
/// - `/list` - List saved conversations
/// - `/open 2` - Open the second conversation from `/list`
/// - `/delete` or `/delete 2` - Delete the active (or the listed) conversation
/// - `/rename Trip planning` - Rename the active conversation
///
/// Editing:
/// - `/edit 0` - Edit the user message displayed as `[0]`
/// - `/cancel` - Abandon the pending edit
///
/// Other commands:
/// - `/status` - Show session status
/// - `/help` - Show help information
/// - `exit` or `quit` - Exit the session
///
/// # Examples
///
/// ```
/// use rougechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/new").unwrap();
/// assert_eq!(cmd, SpecialCommand::NewChat);
///
/// let cmd = parse_special_command("/open 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Open(2));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        // Conversation management
        "/new" => Ok(SpecialCommand::NewChat),
        "/list" => Ok(SpecialCommand::ListConversations),

        // Handle /open with and without a position argument.
        // Arguments are sliced from `trimmed`, not `lower`; the command
        // prefix is ASCII so the byte offsets line up.
        "/open" => Err(CommandError::MissingArgument {
            command: "/open".to_string(),
            usage: "/open <number>".to_string(),
        }),
        input if input.starts_with("/open ") => {
            let arg = trimmed[6..].trim();
            match arg.parse::<usize>() {
                Ok(position) => Ok(SpecialCommand::Open(position)),
                Err(_) => Err(CommandError::UnsupportedArgument {
                    command: "/open".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }

        // Message editing
        "/edit" => Err(CommandError::MissingArgument {
            command: "/edit".to_string(),
            usage: "/edit <index>".to_string(),
        }),
        input if input.starts_with("/edit ") => {
            let arg = trimmed[6..].trim();
            match arg.parse::<usize>() {
                Ok(index) => Ok(SpecialCommand::EditMessage(index)),
                Err(_) => Err(CommandError::UnsupportedArgument {
                    command: "/edit".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }
        "/cancel" => Ok(SpecialCommand::CancelEdit),

        // Deletion: bare /delete targets the active conversation
        "/delete" => Ok(SpecialCommand::DeleteConversation(None)),
        input if input.starts_with("/delete ") => {
            let arg = trimmed[8..].trim();
            match arg.parse::<usize>() {
                Ok(position) => Ok(SpecialCommand::DeleteConversation(Some(position))),
                Err(_) => Err(CommandError::UnsupportedArgument {
                    command: "/delete".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }

        // Renaming keeps the argument's original case
        "/rename" => Err(CommandError::MissingArgument {
            command: "/rename".to_string(),
            usage: "/rename <title>".to_string(),
        }),
        input if input.starts_with("/rename ") => {
            let title = trimmed[8..].trim();
            if title.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/rename".to_string(),
                    usage: "/rename <title>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Rename(title.to_string()))
            }
        }

        // Status and help
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        // Exit commands
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        // Unknown command starting with "/"
        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }

        // Not a special command
        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
///
/// Shows all available special commands with their descriptions
/// and usage examples.
///
/// # Examples
///
/// ```
/// use rougechat::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
======================================

CONVERSATIONS:
  /new            - Start a new chat (the current one stays saved)
  /list           - List saved conversations grouped by recency
  /open <n>       - Open a conversation by its /list position
  /delete [n]     - Delete by position, or the active conversation
  /rename <title> - Rename the active conversation

EDITING:
  /edit <i>       - Edit the user message shown as [i], then resubmit
  /cancel         - Abandon the pending edit

SESSION INFORMATION:
  /status         - Show the active conversation and exchange state
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive; titles keep their case
  - Regular text (not starting with /) is sent to the assistant
  - While an edit is pending, the next plain line becomes the replacement
  - Editing a message discards everything after it once the new reply lands
"#
    );
}
