//! Chat message types shared by the store, session, and relay layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message
///
/// Serialized as the lowercase wire strings `"user"` and `"assistant"`,
/// the same strings the persisted conversation files and the upstream
/// completion API use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Returns the wire string for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation transcript
///
/// Ordering within a conversation is insertion order; the store never
/// reorders messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message
    pub role: Role,
    /// Message text, kept verbatim as entered or received
    pub content: String,
}

impl Message {
    /// Creates a user message
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    /// Creates an assistant message
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }
}
