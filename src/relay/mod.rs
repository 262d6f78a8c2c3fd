//! Relay wire types, client, and server
//!
//! The relay carries exactly one message per exchange: the client posts
//! `{"message": ...}` and receives `{"response": ...}`. Failure detail is
//! collapsed on the client side; the chat surface only ever shows a single
//! fallback assistant message, whatever went wrong.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod server;

pub use client::RelayClient;

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message; absent and empty are treated the same
    #[serde(default)]
    pub message: String,
}

/// Success body from `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// One-message-in, one-reply-out exchange with the relay
///
/// Implementations make exactly one attempt per call; there is no retry
/// or backoff.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Send one user message and await the assistant's reply text
    async fn exchange(&self, message: &str) -> Result<String>;
}
