use crate::cli::HistoryCommand;
use crate::error::{Result, RougechatError};
use crate::message::Role;
use crate::store::{bucket_for, ConversationId, ConversationStore, FileStorage};
use chrono::Local;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(command: HistoryCommand) -> Result<()> {
    // Uses the default data directory; `--data-dir` reaches us through the
    // ROUGECHAT_DATA_DIR mirror set in main.
    let storage = FileStorage::new()?;
    let mut store = ConversationStore::load(Box::new(storage));

    match command {
        HistoryCommand::List => {
            if store.conversations().is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let now = Local::now();
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Created".bold(),
                "Recency".bold()
            ]);

            for conversation in store.conversations() {
                let title = truncate_title(&conversation.title, 40);
                let created = conversation
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();
                let bucket = bucket_for(conversation.timestamp, &now);

                table.add_row(prettytable::row![
                    conversation.id.to_string().cyan(),
                    title,
                    conversation.messages.len(),
                    created,
                    bucket.label()
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to read a transcript.",
                "rougechat history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let id = ConversationId(id);
            let conversation = store
                .get(id)
                .ok_or_else(|| RougechatError::Storage(format!("No conversation with id {}", id)))?;

            println!("\n{}", conversation.title.bold());
            println!(
                "Created {} - {} messages\n",
                conversation
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
                conversation.messages.len()
            );

            for message in &conversation.messages {
                match message.role {
                    Role::User => println!("{} {}", "You:".cyan().bold(), message.content),
                    Role::Assistant => println!("{} {}", "Assistant:".bold(), message.content),
                }
            }
            println!();
        }
        HistoryCommand::Delete { id } => {
            if store.delete(ConversationId(id))? {
                println!("{}", format!("Deleted conversation {}", id).green());
            } else {
                println!("{}", format!("No conversation with id {}", id).yellow());
            }
        }
        HistoryCommand::Rename { id, title } => {
            let id = ConversationId(id);
            if store.get(id).is_none() {
                return Err(
                    RougechatError::Storage(format!("No conversation with id {}", id)).into(),
                );
            }
            store.rename(id, &title)?;
            println!(
                "{}",
                format!("Renamed conversation {} to '{}'", id, title).green()
            );
        }
    }

    Ok(())
}

fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let kept: String = title.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}
