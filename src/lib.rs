//! Rougechat - Terminal chat client and relay library
//!
//! This library provides the core functionality for the Rougechat terminal
//! client, including conversation persistence, chat session state, the relay
//! client and server, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat session state, message editing, and the exchange gate
//! - `store`: Conversation records, persistence backends, and recency grouping
//! - `relay`: HTTP client for the relay and the relay server itself
//! - `message`: Message and role types shared across the crate
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use rougechat::store::{ConversationStore, MemoryStorage};
//! use rougechat::{ChatSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = ConversationStore::load(Box::new(MemoryStorage::new()));
//!     let session = ChatSession::new(store);
//!     assert!(session.messages().is_empty());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod message;
pub mod relay;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, RougechatError};
pub use message::{Message, Role};
pub use session::{ChatSession, ExchangeState};
pub use store::{Conversation, ConversationId, ConversationStore};
