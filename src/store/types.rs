//! Conversation record types and the recency-grouped listing view

use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a stored conversation
///
/// Derived from the creation time as epoch milliseconds and serialized as a
/// bare integer. The store bumps the value until unique when two
/// conversations are created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl ConversationId {
    /// Builds an id candidate from a creation timestamp
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }

    /// Next candidate id when this one collides with an existing record
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored conversation: the transcript plus listing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique id, derived from the creation time
    pub id: ConversationId,
    /// Listing title; defaults to the first user message verbatim
    pub title: String,
    /// Transcript in insertion order
    pub messages: Vec<Message>,
    /// Creation time; recency grouping is computed from this
    pub timestamp: DateTime<Utc>,
}

/// Day-aligned recency bucket for conversation listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecencyBucket {
    Today,
    Yesterday,
    LastSevenDays,
    Older,
}

impl RecencyBucket {
    /// Heading text used by the chat and history listings
    pub fn label(&self) -> &'static str {
        match self {
            RecencyBucket::Today => "Today",
            RecencyBucket::Yesterday => "Yesterday",
            RecencyBucket::LastSevenDays => "Last 7 Days",
            RecencyBucket::Older => "Older",
        }
    }
}

impl fmt::Display for RecencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conversations partitioned by recency
///
/// A derived view over the store's collection; each conversation lands in
/// exactly one bucket and keeps its collection order inside it. Never
/// persisted.
#[derive(Debug, Default)]
pub struct RecencyGroups<'a> {
    pub today: Vec<&'a Conversation>,
    pub yesterday: Vec<&'a Conversation>,
    pub last_seven_days: Vec<&'a Conversation>,
    pub older: Vec<&'a Conversation>,
}

impl<'a> RecencyGroups<'a> {
    /// True when every bucket is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total conversations across all buckets
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.last_seven_days.len() + self.older.len()
    }

    /// Buckets in display order, most recent first
    pub fn iter(&self) -> impl Iterator<Item = (RecencyBucket, &[&'a Conversation])> + '_ {
        [
            (RecencyBucket::Today, self.today.as_slice()),
            (RecencyBucket::Yesterday, self.yesterday.as_slice()),
            (RecencyBucket::LastSevenDays, self.last_seven_days.as_slice()),
            (RecencyBucket::Older, self.older.as_slice()),
        ]
        .into_iter()
    }

    pub(crate) fn push(&mut self, bucket: RecencyBucket, conversation: &'a Conversation) {
        match bucket {
            RecencyBucket::Today => self.today.push(conversation),
            RecencyBucket::Yesterday => self.yesterday.push(conversation),
            RecencyBucket::LastSevenDays => self.last_seven_days.push(conversation),
            RecencyBucket::Older => self.older.push(conversation),
        }
    }
}
