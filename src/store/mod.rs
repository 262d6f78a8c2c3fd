//! Conversation persistence and recency grouping
//!
//! The store owns the conversation collection (most recent first) and the
//! active selection, persists both through a [`StorageBackend`], and derives
//! the day-aligned recency partition used by listings.

use crate::error::{Result, RougechatError};
use crate::message::Message;
use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

pub mod backend;
pub mod types;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use types::{Conversation, ConversationId, RecencyBucket, RecencyGroups};

/// Storage key holding the serialized conversation collection
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Storage key holding the active conversation id, or `null`
pub const ACTIVE_CONVERSATION_KEY: &str = "active_conversation";

/// Owns the conversation collection and the active selection
///
/// New conversations are inserted at the head, so collection order is
/// most-recent-first. Every mutating operation rewrites both persisted keys
/// as whole-value JSON documents.
pub struct ConversationStore {
    backend: Box<dyn StorageBackend>,
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
}

impl ConversationStore {
    /// Load the store from a backend
    ///
    /// Fails soft: a missing key, an unreadable backend, or an unparseable
    /// document yields an empty collection and no selection rather than an
    /// error. A persisted selection that no longer matches any record is
    /// cleared.
    pub fn load(backend: Box<dyn StorageBackend>) -> Self {
        let conversations = match backend.load(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Conversation>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!("Discarding unreadable conversation collection: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read conversation collection, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut active = match backend.load(ACTIVE_CONVERSATION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Option<ConversationId>>(&raw) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Discarding unreadable active selection: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read active selection, starting unselected: {}", e);
                None
            }
        };

        if let Some(id) = active {
            if !conversations.iter().any(|c| c.id == id) {
                tracing::warn!("Clearing active selection {}: no matching conversation", id);
                active = None;
            }
        }

        Self {
            backend,
            conversations,
            active,
        }
    }

    /// Conversations in collection order, most recent first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Currently selected conversation id, if any
    pub fn active(&self) -> Option<ConversationId> {
        self.active
    }

    /// Looks up a conversation by id
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Create a conversation from the given transcript
    ///
    /// The id derives from `now` as epoch milliseconds, bumped until unique
    /// within the collection. The title is the first message's content,
    /// verbatim. The record is inserted at the head of the collection and
    /// becomes the active selection.
    pub fn create(&mut self, messages: Vec<Message>, now: DateTime<Utc>) -> Result<ConversationId> {
        let mut id = ConversationId::from_timestamp(now);
        while self.get(id).is_some() {
            id = id.next();
        }

        let title = messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Untitled".to_string());

        self.conversations.insert(
            0,
            Conversation {
                id,
                title,
                messages,
                timestamp: now,
            },
        );
        self.active = Some(id);
        self.persist()?;
        Ok(id)
    }

    /// Replace a conversation's transcript; silent no-op when the id is unknown
    pub fn update(&mut self, id: ConversationId, messages: Vec<Message>) -> Result<()> {
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.messages = messages;
            self.persist()?;
        }
        Ok(())
    }

    /// Replace a conversation's title; silent no-op when the id is unknown
    pub fn rename(&mut self, id: ConversationId, title: &str) -> Result<()> {
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.title = title.to_string();
            self.persist()?;
        }
        Ok(())
    }

    /// Remove a conversation, returning whether a record was removed
    ///
    /// Clears the active selection when it pointed at the removed record.
    pub fn delete(&mut self, id: ConversationId) -> Result<bool> {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return Ok(false);
        }

        if self.active == Some(id) {
            self.active = None;
        }
        self.persist()?;
        Ok(true)
    }

    /// Make `id` the active selection
    pub fn select(&mut self, id: ConversationId) -> Result<()> {
        if self.get(id).is_none() {
            return Err(RougechatError::Storage(format!("No conversation with id {}", id)).into());
        }
        self.active = Some(id);
        self.persist()
    }

    /// Clear the active selection, leaving an unsaved draft state
    pub fn clear_active(&mut self) -> Result<()> {
        self.active = None;
        self.persist()
    }

    /// Partition the collection by recency relative to `now`
    pub fn group_by_recency<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> RecencyGroups<'_> {
        group_by_recency(&self.conversations, now)
    }

    // Two separate whole-value writes; not transactional across keys.
    fn persist(&self) -> Result<()> {
        let conversations = serde_json::to_string(&self.conversations)?;
        self.backend.save(CONVERSATIONS_KEY, &conversations)?;

        let active = serde_json::to_string(&self.active)?;
        self.backend.save(ACTIVE_CONVERSATION_KEY, &active)?;
        Ok(())
    }
}

/// Day-aligned boundaries separating the recency buckets
struct DayBoundaries {
    today: DateTime<Utc>,
    yesterday: DateTime<Utc>,
    week: DateTime<Utc>,
}

impl DayBoundaries {
    fn compute<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        // Arithmetic on calendar dates keeps the boundaries midnight-aligned
        // across DST transitions.
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let week = today.checked_sub_days(Days::new(7)).unwrap_or(today);
        Self {
            today: start_of_day(today, &tz),
            yesterday: start_of_day(yesterday, &tz),
            week: start_of_day(week, &tz),
        }
    }

    fn bucket(&self, at: DateTime<Utc>) -> RecencyBucket {
        if at >= self.today {
            RecencyBucket::Today
        } else if at >= self.yesterday {
            RecencyBucket::Yesterday
        } else if at >= self.week {
            RecencyBucket::LastSevenDays
        } else {
            RecencyBucket::Older
        }
    }
}

/// Local midnight of `date` as a UTC instant
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(at) => at.with_timezone(&Utc),
        LocalResult::Ambiguous(first, _) => first.with_timezone(&Utc),
        // Midnight can fall inside a DST gap; read it as UTC instead.
        LocalResult::None => Utc.from_utc_datetime(&midnight),
    }
}

/// Bucket for a single timestamp relative to `now`
pub fn bucket_for<Tz: TimeZone>(at: DateTime<Utc>, now: &DateTime<Tz>) -> RecencyBucket {
    DayBoundaries::compute(now).bucket(at)
}

/// Partition `conversations` into recency buckets relative to `now`
///
/// Each conversation lands in exactly one bucket (the most recent bucket
/// whose boundary it reaches) and keeps its collection order inside it.
/// Timestamps in the future of `now` land in `Today`.
pub fn group_by_recency<'a, Tz: TimeZone>(
    conversations: &'a [Conversation],
    now: &DateTime<Tz>,
) -> RecencyGroups<'a> {
    let boundaries = DayBoundaries::compute(now);
    let mut groups = RecencyGroups::default();
    for conversation in conversations {
        groups.push(boundaries.bucket(conversation.timestamp), conversation);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn empty_store() -> ConversationStore {
        ConversationStore::load(Box::new(MemoryStorage::new()))
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).unwrap()
    }

    fn transcript(user: &str, assistant: &str) -> Vec<Message> {
        vec![Message::user(user), Message::assistant(assistant)]
    }

    #[test]
    fn test_load_empty_backend() {
        let store = empty_store();
        assert!(store.conversations().is_empty());
        assert_eq!(store.active(), None);
    }

    #[test]
    fn test_create_sets_title_id_and_active() {
        let mut store = empty_store();
        let now = at(12, 0);

        let id = store.create(transcript("Hello", "Hi there"), now).unwrap();

        assert_eq!(id, ConversationId(now.timestamp_millis()));
        assert_eq!(store.active(), Some(id));
        assert_eq!(store.conversations().len(), 1);

        let conversation = store.get(id).unwrap();
        assert_eq!(conversation.title, "Hello");
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.timestamp, now);
    }

    #[test]
    fn test_create_inserts_at_head() {
        let mut store = empty_store();
        store.create(transcript("first", "one"), at(9, 0)).unwrap();
        store.create(transcript("second", "two"), at(10, 0)).unwrap();

        assert_eq!(store.conversations()[0].title, "second");
        assert_eq!(store.conversations()[1].title, "first");
    }

    #[test]
    fn test_create_same_millisecond_bumps_id() {
        let mut store = empty_store();
        let now = at(12, 0);

        let first = store.create(transcript("a", "b"), now).unwrap();
        let second = store.create(transcript("c", "d"), now).unwrap();

        assert_ne!(first, second);
        assert_eq!(second, first.next());
    }

    #[test]
    fn test_update_replaces_messages() {
        let mut store = empty_store();
        let id = store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        let mut longer = transcript("Hello", "Hi");
        longer.push(Message::user("more"));
        store.update(id, longer).unwrap();

        assert_eq!(store.get(id).unwrap().messages.len(), 3);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = empty_store();
        store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        store.update(ConversationId(9999), vec![]).unwrap();

        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.conversations()[0].messages.len(), 2);
    }

    #[test]
    fn test_rename_replaces_title() {
        let mut store = empty_store();
        let id = store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        store.rename(id, "Greetings").unwrap();

        assert_eq!(store.get(id).unwrap().title, "Greetings");
    }

    #[test]
    fn test_rename_unknown_id_is_noop() {
        let mut store = empty_store();
        store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        store.rename(ConversationId(9999), "nope").unwrap();

        assert_eq!(store.conversations()[0].title, "Hello");
    }

    #[test]
    fn test_delete_active_clears_selection() {
        let mut store = empty_store();
        let id = store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        assert!(store.delete(id).unwrap());
        assert_eq!(store.active(), None);
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut store = empty_store();
        let first = store.create(transcript("first", "one"), at(9, 0)).unwrap();
        let second = store.create(transcript("second", "two"), at(10, 0)).unwrap();

        assert!(store.delete(first).unwrap());
        assert_eq!(store.active(), Some(second));
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_delete_unknown_returns_false() {
        let mut store = empty_store();
        store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        assert!(!store.delete(ConversationId(9999)).unwrap());
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_select_unknown_errors() {
        let mut store = empty_store();
        assert!(store.select(ConversationId(1)).is_err());
    }

    #[test]
    fn test_clear_active() {
        let mut store = empty_store();
        store.create(transcript("Hello", "Hi"), at(12, 0)).unwrap();

        store.clear_active().unwrap();

        assert_eq!(store.active(), None);
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_reload_round_trips_collection_and_selection() {
        let backend = Arc::new(MemoryStorage::new());

        let mut store = ConversationStore::load(Box::new(backend.clone()));
        let first = store.create(transcript("first", "one"), at(9, 0)).unwrap();
        store.create(transcript("second", "two"), at(10, 0)).unwrap();
        store.rename(first, "renamed").unwrap();
        store.select(first).unwrap();
        let saved: Vec<Conversation> = store.conversations().to_vec();
        drop(store);

        let reloaded = ConversationStore::load(Box::new(backend));
        assert_eq!(reloaded.conversations(), saved.as_slice());
        assert_eq!(reloaded.active(), Some(first));
    }

    #[test]
    fn test_load_recovers_from_corrupt_collection() {
        let backend = Arc::new(MemoryStorage::new());
        backend.save(CONVERSATIONS_KEY, "{not json").unwrap();
        backend.save(ACTIVE_CONVERSATION_KEY, "123").unwrap();

        let store = ConversationStore::load(Box::new(backend));
        assert!(store.conversations().is_empty());
        assert_eq!(store.active(), None);
    }

    #[test]
    fn test_load_clears_dangling_active() {
        let backend = Arc::new(MemoryStorage::new());
        backend.save(CONVERSATIONS_KEY, "[]").unwrap();
        backend.save(ACTIVE_CONVERSATION_KEY, "123").unwrap();

        let store = ConversationStore::load(Box::new(backend));
        assert_eq!(store.active(), None);
    }

    #[test]
    fn test_load_tolerates_failing_backend() {
        struct FailingStorage;

        impl StorageBackend for FailingStorage {
            fn load(&self, _key: &str) -> Result<Option<String>> {
                Err(RougechatError::Storage("disk on fire".into()).into())
            }

            fn save(&self, _key: &str, _value: &str) -> Result<()> {
                Err(RougechatError::Storage("disk on fire".into()).into())
            }
        }

        let store = ConversationStore::load(Box::new(FailingStorage));
        assert!(store.conversations().is_empty());
        assert_eq!(store.active(), None);
    }

    #[test]
    fn test_bucket_boundaries_are_day_aligned() {
        // Friday 2024-03-15, noon UTC.
        let now = at(12, 0);
        let day = |d: u32, h: u32, m: u32| Utc.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap();

        assert_eq!(bucket_for(day(15, 0, 0), &now), RecencyBucket::Today);
        assert_eq!(bucket_for(day(14, 23, 59), &now), RecencyBucket::Yesterday);
        assert_eq!(bucket_for(day(14, 0, 0), &now), RecencyBucket::Yesterday);
        assert_eq!(
            bucket_for(day(13, 23, 59), &now),
            RecencyBucket::LastSevenDays
        );
        assert_eq!(bucket_for(day(8, 0, 0), &now), RecencyBucket::LastSevenDays);
        assert_eq!(bucket_for(day(7, 23, 59), &now), RecencyBucket::Older);
    }

    #[test]
    fn test_future_timestamps_land_in_today() {
        let now = at(12, 0);
        let tomorrow = Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap();
        assert_eq!(bucket_for(tomorrow, &now), RecencyBucket::Today);
    }

    #[test]
    fn test_group_partition_is_disjoint_and_exhaustive() {
        let now = at(12, 0);
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap();
        let conversation = |n: i64, timestamp: DateTime<Utc>| Conversation {
            id: ConversationId(n),
            title: format!("conversation {}", n),
            messages: vec![],
            timestamp,
        };

        let conversations = vec![
            conversation(1, day(15)),
            conversation(2, day(14)),
            conversation(3, day(12)),
            conversation(4, day(9)),
            conversation(5, day(1)),
        ];

        let groups = group_by_recency(&conversations, &now);
        assert_eq!(groups.len(), conversations.len());
        assert_eq!(groups.today.len(), 1);
        assert_eq!(groups.yesterday.len(), 1);
        assert_eq!(groups.last_seven_days.len(), 2);
        assert_eq!(groups.older.len(), 1);
    }

    #[test]
    fn test_group_preserves_collection_order() {
        let now = at(12, 0);
        let conversation = |n: i64, hour: u32| Conversation {
            id: ConversationId(n),
            title: format!("conversation {}", n),
            messages: vec![],
            timestamp: at(hour, 0),
        };

        // Collection order, most recent first.
        let conversations = vec![conversation(2, 11), conversation(1, 9)];

        let groups = group_by_recency(&conversations, &now);
        let ids: Vec<ConversationId> = groups.today.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ConversationId(2), ConversationId(1)]);
    }
}
