//! Conversation persistence against the file-backed storage.
//!
//! The unit tests in `store` cover collection semantics against the
//! in-memory backend; these tests pin down what actually lands on disk.

mod common;

use chrono::{DateTime, TimeZone, Utc};
use rougechat::message::Message;
use rougechat::store::ConversationId;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap()
}

fn transcript(user: &str, assistant: &str) -> Vec<Message> {
    vec![Message::user(user), Message::assistant(assistant)]
}

#[test]
fn test_collection_and_selection_survive_reload() {
    let (mut store, tmp) = common::temp_file_store();
    let first = store
        .create(transcript("first", "one"), at(9))
        .expect("create first");
    store
        .create(transcript("second", "two"), at(10))
        .expect("create second");
    store.select(first).expect("select first");

    let reloaded = common::reopen_file_store(&tmp);
    assert_eq!(reloaded.conversations().len(), 2);
    assert_eq!(reloaded.conversations()[0].title, "second");
    assert_eq!(reloaded.conversations()[1].title, "first");
    assert_eq!(reloaded.active(), Some(first));
}

#[test]
fn test_on_disk_documents_are_plain_json() {
    let (mut store, tmp) = common::temp_file_store();
    let now = at(12);
    let id = store
        .create(transcript("Hello", "Hi there"), now)
        .expect("create");

    let raw = std::fs::read_to_string(tmp.path().join("conversations.json"))
        .expect("conversations.json exists");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

    // Ids are bare epoch-millisecond integers, not strings.
    assert_eq!(parsed[0]["id"], serde_json::json!(now.timestamp_millis()));
    assert_eq!(parsed[0]["title"], "Hello");
    assert_eq!(parsed[0]["messages"][0]["role"], "user");
    assert_eq!(parsed[0]["messages"][1]["content"], "Hi there");

    let raw = std::fs::read_to_string(tmp.path().join("active_conversation.json"))
        .expect("active_conversation.json exists");
    assert_eq!(raw, id.0.to_string());
}

#[test]
fn test_corrupt_collection_file_starts_empty() {
    let (mut store, tmp) = common::temp_file_store();
    store
        .create(transcript("Hello", "Hi"), at(12))
        .expect("create");
    drop(store);

    std::fs::write(tmp.path().join("conversations.json"), "{definitely not json")
        .expect("overwrite with garbage");

    let mut reloaded = common::reopen_file_store(&tmp);
    assert!(reloaded.conversations().is_empty());
    assert_eq!(reloaded.active(), None);

    // The store stays usable; the next save replaces the damaged file.
    reloaded
        .create(transcript("fresh", "start"), at(13))
        .expect("create after corruption");
    let recovered = common::reopen_file_store(&tmp);
    assert_eq!(recovered.conversations().len(), 1);
    assert_eq!(recovered.conversations()[0].title, "fresh");
}

#[test]
fn test_dangling_selection_is_cleared_on_load() {
    let (store, tmp) = common::temp_file_store();
    drop(store);

    std::fs::write(tmp.path().join("conversations.json"), "[]").expect("write collection");
    std::fs::write(tmp.path().join("active_conversation.json"), "1710500400000")
        .expect("write selection");

    let reloaded = common::reopen_file_store(&tmp);
    assert_eq!(reloaded.active(), None);
}

#[test]
fn test_delete_persists_removal() {
    let (mut store, tmp) = common::temp_file_store();
    let id = store
        .create(transcript("Hello", "Hi"), at(12))
        .expect("create");

    assert!(store.delete(id).expect("delete"));

    let reloaded = common::reopen_file_store(&tmp);
    assert!(reloaded.conversations().is_empty());
    assert_eq!(reloaded.active(), None);
}

#[test]
fn test_rename_persists_title() {
    let (mut store, tmp) = common::temp_file_store();
    let id = store
        .create(transcript("Hello", "Hi"), at(12))
        .expect("create");

    store.rename(id, "Greetings").expect("rename");

    let reloaded = common::reopen_file_store(&tmp);
    assert_eq!(reloaded.get(id).expect("still present").title, "Greetings");
}

#[test]
fn test_same_millisecond_ids_stay_unique_across_reload() {
    let (mut store, tmp) = common::temp_file_store();
    let now = at(12);
    let first = store.create(transcript("a", "b"), now).expect("create a");
    let second = store.create(transcript("c", "d"), now).expect("create c");
    assert_eq!(second, ConversationId(first.0 + 1));

    let reloaded = common::reopen_file_store(&tmp);
    assert!(reloaded.get(first).is_some());
    assert!(reloaded.get(second).is_some());
}
