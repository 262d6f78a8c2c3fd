//! Chat session control
//!
//! Owns the transient message view and drives the send and edit-and-resubmit
//! flows against the conversation store and a relay transport. A session is
//! either idle or awaiting exactly one relay reply; while a reply is
//! outstanding, sends are silently ignored and navigation is refused, so a
//! settling reply can never land on a different conversation than the one
//! that sent it.
//!
//! The state transitions (`begin_send`, `complete_send`, `confirm_edit`) are
//! synchronous and pure of IO except for store persistence; the `send` and
//! `resubmit_edit` drivers run the relay call in between.

use crate::error::{Result, RougechatError};
use crate::message::{Message, Role};
use crate::relay::RelayTransport;
use crate::store::{ConversationId, ConversationStore};
use chrono::{DateTime, Utc};

/// Assistant message appended when a relay exchange fails
///
/// Shown in place of a real reply and persisted with the rest of the
/// transcript; the underlying cause is only logged.
pub const RELAY_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Exchange state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, Copy)]
struct EditTarget {
    index: usize,
}

/// Conversation view plus the exchange state machine
pub struct ChatSession {
    store: ConversationStore,
    messages: Vec<Message>,
    exchange: ExchangeState,
    edit: Option<EditTarget>,
}

impl ChatSession {
    /// Create a session over a loaded store
    ///
    /// Restores the transient view from the persisted active selection, so
    /// reopening the app lands in the conversation that was open last.
    pub fn new(store: ConversationStore) -> Self {
        let messages = store
            .active()
            .and_then(|id| store.get(id))
            .map(|c| c.messages.clone())
            .unwrap_or_default();

        Self {
            store,
            messages,
            exchange: ExchangeState::default(),
            edit: None,
        }
    }

    /// Transcript currently in view
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Underlying store, for listings and lookups
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn exchange_state(&self) -> ExchangeState {
        self.exchange
    }

    /// True while a relay reply is outstanding
    pub fn is_awaiting_reply(&self) -> bool {
        self.exchange == ExchangeState::AwaitingReply
    }

    /// Index of the message being edited, if an edit is pending
    pub fn pending_edit(&self) -> Option<usize> {
        self.edit.map(|e| e.index)
    }

    /// Title of the active conversation, if one is selected
    pub fn active_title(&self) -> Option<&str> {
        self.store
            .active()
            .and_then(|id| self.store.get(id))
            .map(|c| c.title.as_str())
    }

    /// Start a send
    ///
    /// Appends the user's message to the view (optimistically, verbatim) and
    /// returns the outbound text. Returns `None` without any state change
    /// for blank input, while a reply is already outstanding, or while an
    /// edit is pending.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        if self.is_awaiting_reply() || self.edit.is_some() {
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text));
        self.exchange = ExchangeState::AwaitingReply;
        Some(text.to_string())
    }

    /// Settle a send with the relay's outcome
    ///
    /// Appends the real reply on `Ok` and the fixed fallback message on
    /// `Err`; either way exactly one assistant message lands and the session
    /// returns to idle. A successful first exchange creates the conversation
    /// record (titled by its first message); later settles update the
    /// existing record. A failed exchange on a fresh draft stays transient,
    /// since a conversation only comes into existence through a successful
    /// exchange.
    pub fn complete_send(&mut self, reply: Result<String>, now: DateTime<Utc>) -> Result<()> {
        if !self.is_awaiting_reply() {
            return Err(RougechatError::Session("no exchange in flight".into()).into());
        }

        let succeeded = reply.is_ok();
        let content = match reply {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Relay exchange failed: {}", e);
                RELAY_FAILURE_MESSAGE.to_string()
            }
        };

        self.messages.push(Message::assistant(&content));
        self.exchange = ExchangeState::Idle;

        match self.store.active() {
            Some(id) => self.store.update(id, self.messages.clone()),
            None if succeeded => {
                self.store.create(self.messages.clone(), now)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Run one full send against a relay transport
    ///
    /// Returns whether an exchange actually ran; blank input and a busy
    /// session are silent no-ops.
    pub async fn send(&mut self, relay: &dyn RelayTransport, text: &str) -> Result<bool> {
        let outbound = match self.begin_send(text) {
            Some(outbound) => outbound,
            None => return Ok(false),
        };

        let reply = relay.exchange(&outbound).await;
        self.complete_send(reply, Utc::now())?;
        Ok(true)
    }

    /// Begin editing the user message at `index`
    ///
    /// Only user-role messages can be edited, and only while idle. Returns
    /// the current content for prefilling the edit buffer.
    pub fn begin_edit(&mut self, index: usize) -> Result<&str> {
        self.ensure_idle()?;

        let message = self
            .messages
            .get(index)
            .ok_or_else(|| RougechatError::Session(format!("no message at index {}", index)))?;
        if message.role != Role::User {
            return Err(RougechatError::Session(format!(
                "message {} is not a user message",
                index
            ))
            .into());
        }

        self.edit = Some(EditTarget { index });
        Ok(&self.messages[index].content)
    }

    /// Abandon a pending edit, leaving the transcript untouched
    ///
    /// Returns whether an edit was pending.
    pub fn cancel_edit(&mut self) -> bool {
        self.edit.take().is_some()
    }

    /// Confirm a pending edit with replacement text
    ///
    /// Overwrites the target message in place, discards every message after
    /// it, persists the truncation when a conversation exists, and returns
    /// the outbound text for resubmission. Blank replacement text keeps the
    /// edit pending and returns `Ok(None)`, as does calling with no edit in
    /// progress.
    pub fn confirm_edit(&mut self, new_text: &str) -> Result<Option<String>> {
        let target = match self.edit {
            Some(target) => target,
            None => return Ok(None),
        };
        if new_text.trim().is_empty() {
            return Ok(None);
        }

        match self.messages.get_mut(target.index) {
            Some(message) => message.content = new_text.to_string(),
            None => {
                self.edit = None;
                return Ok(None);
            }
        }
        self.messages.truncate(target.index + 1);
        self.edit = None;
        self.exchange = ExchangeState::AwaitingReply;

        // The truncation itself is a persisted mutation; the reply that
        // follows lands through complete_send like any other settle.
        if let Some(id) = self.store.active() {
            self.store.update(id, self.messages.clone())?;
        }

        Ok(Some(new_text.to_string()))
    }

    /// Run a confirmed edit against a relay transport
    ///
    /// Returns whether an exchange actually ran.
    pub async fn resubmit_edit(&mut self, relay: &dyn RelayTransport, new_text: &str) -> Result<bool> {
        let outbound = match self.confirm_edit(new_text)? {
            Some(outbound) => outbound,
            None => return Ok(false),
        };

        let reply = relay.exchange(&outbound).await;
        self.complete_send(reply, Utc::now())?;
        Ok(true)
    }

    /// Open a conversation, replacing the view with its transcript
    pub fn select_conversation(&mut self, id: ConversationId) -> Result<()> {
        self.ensure_idle()?;
        self.store.select(id)?;
        self.edit = None;
        self.messages = self
            .store
            .get(id)
            .map(|c| c.messages.clone())
            .unwrap_or_default();
        Ok(())
    }

    /// Start a fresh draft: clear the view and the active selection
    ///
    /// The draft has no record until its first successful exchange.
    pub fn new_chat(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.store.clear_active()?;
        self.edit = None;
        self.messages.clear();
        Ok(())
    }

    /// Delete a conversation, returning whether a record was removed
    ///
    /// Deleting the active conversation also clears the view; deleting any
    /// other record leaves the view untouched.
    pub fn delete_conversation(&mut self, id: ConversationId) -> Result<bool> {
        self.ensure_idle()?;
        let was_active = self.store.active() == Some(id);
        let removed = self.store.delete(id)?;
        if removed && was_active {
            self.edit = None;
            self.messages.clear();
        }
        Ok(removed)
    }

    /// Rename the active conversation
    pub fn rename_active(&mut self, title: &str) -> Result<()> {
        let id = self
            .store
            .active()
            .ok_or_else(|| RougechatError::Session("no conversation selected".into()))?;
        self.store.rename(id, title)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_awaiting_reply() {
            return Err(RougechatError::Session("a reply is still pending".into()).into());
        }
        Ok(())
    }
}
