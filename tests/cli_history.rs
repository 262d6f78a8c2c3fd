//! History subcommand exercised through the compiled binary.
//!
//! Each invocation runs in its own process with `ROUGECHAT_DATA_DIR`
//! pointed at a seeded temporary directory.

mod common;

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use rougechat::message::Message;
use tempfile::TempDir;

fn rougechat() -> Command {
    Command::cargo_bin("rougechat").expect("binary builds")
}

/// Data directory holding one saved conversation; returns its id.
fn seeded_data_dir() -> (TempDir, i64) {
    let (mut store, tmp) = common::temp_file_store();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let id = store
        .create(
            vec![
                Message::user("Trip planning"),
                Message::assistant("Where would you like to go?"),
            ],
            now,
        )
        .expect("create conversation");
    (tmp, id.0)
}

#[test]
fn test_history_list_without_data_reports_empty() {
    let tmp = TempDir::new().expect("tempdir");

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conversation history found."));
}

#[test]
fn test_history_list_shows_saved_conversations() {
    let (tmp, id) = seeded_data_dir();

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversation History:"))
        .stdout(predicate::str::contains("Trip planning"))
        .stdout(predicate::str::contains(id.to_string()));
}

#[test]
fn test_history_show_prints_transcript() {
    let (tmp, id) = seeded_data_dir();

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "show", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trip planning"))
        .stdout(predicate::str::contains("Where would you like to go?"));
}

#[test]
fn test_history_show_unknown_id_fails() {
    let tmp = TempDir::new().expect("tempdir");

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No conversation with id 42"));
}

#[test]
fn test_history_delete_removes_conversation() {
    let (tmp, id) = seeded_data_dir();

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "delete", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Deleted conversation {}",
            id
        )));

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conversation history found."));
}

#[test]
fn test_history_delete_unknown_id_reports_missing() {
    let tmp = TempDir::new().expect("tempdir");

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "delete", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conversation with id 42"));
}

#[test]
fn test_history_rename_updates_title() {
    let (tmp, id) = seeded_data_dir();

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "rename", &id.to_string(), "Summer itinerary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summer itinerary"));

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "show", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summer itinerary"));
}

#[test]
fn test_history_rename_unknown_id_fails() {
    let tmp = TempDir::new().expect("tempdir");

    rougechat()
        .env("ROUGECHAT_DATA_DIR", tmp.path())
        .args(["history", "rename", "42", "New title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No conversation with id 42"));
}

#[test]
fn test_data_dir_flag_reaches_storage() {
    let (tmp, _id) = seeded_data_dir();

    // Same seeded directory, passed as --data-dir instead of the env var.
    rougechat()
        .args([
            "--data-dir",
            tmp.path().to_str().expect("utf8 path"),
            "history",
            "list",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trip planning"));
}
