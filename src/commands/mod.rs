/*!
Command handlers for the Rougechat binary.

Each CLI subcommand maps to a module here:

- [`chat`] runs the interactive conversation loop against the relay
- [`serve`] hosts the HTTP relay in front of the upstream API
- [`history`] inspects saved conversations without entering a chat
- [`special_commands`] parses the slash commands typed inside a chat
*/

pub mod history;
pub mod serve;
pub mod special_commands;

pub mod chat {
    //! Interactive chat session with conversation management.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::config::Config;
    use crate::error::Result;
    use crate::message::{Message, Role};
    use crate::relay::RelayClient;
    use crate::session::{ChatSession, ExchangeState};
    use crate::store::{ConversationStore, FileStorage};
    use chrono::Local;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Run the interactive chat loop until the user exits.
    ///
    /// Restores the previously active conversation unless `new` is set,
    /// then reads lines from the terminal. Slash commands are handled
    /// locally; anything else goes through the relay and the reply is
    /// appended to the transcript.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration (relay endpoint and timeout)
    /// * `new` - Start a fresh draft instead of resuming the active conversation
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be initialized, the relay client
    /// cannot be built, or the terminal line editor fails.
    pub async fn run_chat(config: Config, new: bool) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let storage = FileStorage::new()?;
        let store = ConversationStore::load(Box::new(storage));
        let mut session = ChatSession::new(store);
        if new {
            session.new_chat()?;
        }

        let relay = RelayClient::new(&config.relay)?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);

        if !session.messages().is_empty() {
            println!(
                "Resuming '{}':\n",
                session.active_title().unwrap_or("untitled")
            );
            print_transcript(session.messages());
        }

        loop {
            let prompt = format_prompt(&session);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::NewChat) => {
                            match session.new_chat() {
                                Ok(()) => println!("{}", "Started a new chat.".green()),
                                Err(e) => println!("{}", format!("Error: {}", e).red()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::ListConversations) => {
                            print_conversation_list(&session);
                            continue;
                        }
                        Ok(SpecialCommand::Open(position)) => {
                            open_conversation(&mut session, position);
                            continue;
                        }
                        Ok(SpecialCommand::EditMessage(index)) => {
                            begin_message_edit(&mut session, index);
                            continue;
                        }
                        Ok(SpecialCommand::CancelEdit) => {
                            if session.cancel_edit() {
                                println!("{}", "Edit cancelled.".yellow());
                            } else {
                                println!("{}", "No edit in progress.".yellow());
                            }
                            continue;
                        }
                        Ok(SpecialCommand::DeleteConversation(position)) => {
                            delete_conversation(&mut session, position);
                            continue;
                        }
                        Ok(SpecialCommand::Rename(title)) => {
                            match session.rename_active(&title) {
                                Ok(()) => {
                                    println!("{}", format!("Renamed to '{}'", title).green())
                                }
                                Err(e) => println!("{}", format!("Error: {}", e).red()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&session);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            println!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    // Plain text. The original line goes out untrimmed; while
                    // an edit is pending it becomes the replacement for the
                    // edited message instead of a new one.
                    if session.pending_edit().is_some() {
                        submit_edit(&mut session, &relay, &line).await;
                    } else {
                        submit_message(&mut session, &relay, &line).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Plain prompt tag reflecting what the next line of input will do.
    fn prompt_tag(session: &ChatSession) -> String {
        if let Some(index) = session.pending_edit() {
            format!("[edit #{}]", index)
        } else if let Some(title) = session.active_title() {
            format!("[{}]", shorten(title, 24))
        } else {
            "[new chat]".to_string()
        }
    }

    fn format_prompt(session: &ChatSession) -> String {
        let tag = prompt_tag(session);
        let colored_tag = if session.pending_edit().is_some() {
            tag.yellow()
        } else if session.active_title().is_some() {
            tag.cyan()
        } else {
            tag.green()
        };
        format!("{} >> ", colored_tag)
    }

    fn shorten(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }

    fn print_welcome_banner(config: &Config) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            Rougechat Interactive Chat - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("Relay: {}", config.relay.url);
        println!("Type '/help' for available commands, 'exit' to quit");
        println!();
    }

    /// Print a transcript with the indexes that `/edit` accepts.
    fn print_transcript(messages: &[Message]) {
        for (index, message) in messages.iter().enumerate() {
            match message.role {
                Role::User => {
                    println!("[{}] {} {}", index, "You:".cyan().bold(), message.content)
                }
                Role::Assistant => {
                    println!("[{}] {} {}", index, "Assistant:".bold(), message.content)
                }
            }
        }
        println!();
    }

    /// Print saved conversations grouped by recency, most recent first.
    ///
    /// The bracketed numbers are the positions `/open` and `/delete` take.
    fn print_conversation_list(session: &ChatSession) {
        let store = session.store();
        if store.conversations().is_empty() {
            println!("{}", "No saved conversations yet.".yellow());
            return;
        }

        let now = Local::now();
        let groups = store.group_by_recency(&now);
        println!();
        for (bucket, conversations) in groups.iter() {
            if conversations.is_empty() {
                continue;
            }
            println!("{}", bucket.label().bold());
            for conversation in conversations {
                let position = store
                    .conversations()
                    .iter()
                    .position(|c| c.id == conversation.id)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let marker = if store.active() == Some(conversation.id) {
                    " (active)"
                } else {
                    ""
                };
                println!(
                    "  {} {} ({} messages){}",
                    format!("[{}]", position).cyan(),
                    shorten(&conversation.title, 40),
                    conversation.messages.len(),
                    marker
                );
            }
            println!();
        }
        println!("Use {} to switch conversations.", "/open <number>".cyan());
    }

    fn open_conversation(session: &mut ChatSession, position: usize) {
        let id = match position
            .checked_sub(1)
            .and_then(|index| session.store().conversations().get(index))
        {
            Some(conversation) => conversation.id,
            None => {
                println!(
                    "{}",
                    format!("No conversation at position {}", position).red()
                );
                return;
            }
        };

        match session.select_conversation(id) {
            Ok(()) => {
                println!(
                    "Opened '{}':\n",
                    session.active_title().unwrap_or("untitled")
                );
                print_transcript(session.messages());
            }
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    fn begin_message_edit(session: &mut ChatSession, index: usize) {
        match session.begin_edit(index) {
            Ok(current) => {
                println!("Editing message [{}]. Current text:", index);
                println!("  {}", current);
                println!(
                    "{}",
                    "Type the replacement, or /cancel to keep it.".yellow()
                );
            }
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    /// Delete by list position, or the active conversation when no
    /// position is given.
    fn delete_conversation(session: &mut ChatSession, position: Option<usize>) {
        let id = match position {
            Some(position) => {
                match position
                    .checked_sub(1)
                    .and_then(|index| session.store().conversations().get(index))
                {
                    Some(conversation) => conversation.id,
                    None => {
                        println!(
                            "{}",
                            format!("No conversation at position {}", position).red()
                        );
                        return;
                    }
                }
            }
            None => match session.store().active() {
                Some(id) => id,
                None => {
                    println!("{}", "No active conversation to delete.".yellow());
                    return;
                }
            },
        };

        let title = session
            .store()
            .get(id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| id.to_string());

        match session.delete_conversation(id) {
            Ok(true) => println!("{}", format!("Deleted '{}'", title).green()),
            Ok(false) => println!("{}", format!("No conversation with id {}", id).yellow()),
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    async fn submit_message(session: &mut ChatSession, relay: &RelayClient, text: &str) {
        println!("{}", "thinking...".dimmed());
        match session.send(relay, text).await {
            Ok(true) => print_reply(session),
            Ok(false) => {}
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    async fn submit_edit(session: &mut ChatSession, relay: &RelayClient, text: &str) {
        println!("{}", "thinking...".dimmed());
        match session.resubmit_edit(relay, text).await {
            Ok(true) => print_reply(session),
            Ok(false) => println!("{}", "Edit was not applied.".yellow()),
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    /// Print the assistant message that settled the last exchange.
    ///
    /// On a relay failure this is the fixed fallback text, which has
    /// already been recorded in the transcript like any other reply.
    fn print_reply(session: &ChatSession) {
        if let Some(message) = session.messages().last() {
            if message.role == Role::Assistant {
                println!("\n{}\n", message.content);
            }
        }
    }

    fn print_status_display(session: &ChatSession) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                   Rougechat Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝");

        let conversation = session.active_title().unwrap_or("new chat (unsaved)");
        let exchange = match session.exchange_state() {
            ExchangeState::Idle => "idle",
            ExchangeState::AwaitingReply => "awaiting reply",
        };
        let edit = match session.pending_edit() {
            Some(index) => format!("message [{}]", index),
            None => "none".to_string(),
        };

        println!("  Conversation: {}", conversation.cyan());
        println!("  Messages:     {}", session.messages().len());
        println!("  Exchange:     {}", exchange);
        println!("  Pending edit: {}", edit);
        println!("  Saved chats:  {}", session.store().conversations().len());
        println!();
    }

}
