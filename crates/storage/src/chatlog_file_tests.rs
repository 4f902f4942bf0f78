// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_core::chatlog::ChatMessage;
use tempfile::tempdir;

fn msg(sender: &str, recipient: &str, body: &str) -> ChatMessage {
    ChatMessage {
        timestamp_ms: 0,
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        body: body.to_string(),
    }
}

#[test]
fn append_then_read_all_round_trips() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));

    log.append(&msg("superintendent", "engineer-1", "go")).unwrap();
    log.append(&msg("engineer-1", "superintendent", "ack")).unwrap();

    let messages = log.read_all(123).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "superintendent");
    assert_eq!(messages[1].sender, "engineer-1");
    assert_eq!(messages[0].timestamp_ms, 123);
}

#[test]
fn read_all_on_missing_file_returns_empty() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    assert!(log.read_all(0).unwrap().is_empty());
}

#[test]
fn append_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("nested/dir/chat.log"));
    log.append(&msg("a", "b", "c")).unwrap();
    assert!(log.path().exists());
}

#[test]
fn truncate_to_zero_clears_contents_but_keeps_the_file() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    log.append(&msg("a", "b", "hello")).unwrap();
    assert_eq!(log.read_all(0).unwrap().len(), 1);

    log.truncate_to_last_n_lines(0).unwrap();
    assert!(log.read_all(0).unwrap().is_empty());
    assert!(log.path().exists());
}

#[test]
fn truncate_keeps_only_the_last_n_lines() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    for i in 0..5 {
        log.append(&msg("a", "b", &format!("msg-{i}"))).unwrap();
    }

    log.truncate_to_last_n_lines(2).unwrap();
    let messages = log.read_all(0).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "msg-3");
    assert_eq!(messages[1].body, "msg-4");
}

#[test]
fn truncate_is_a_no_op_when_under_the_limit() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    log.append(&msg("a", "b", "only")).unwrap();

    log.truncate_to_last_n_lines(500).unwrap();
    assert_eq!(log.read_all(0).unwrap().len(), 1);
}

#[test]
fn file_identity_detects_growth_as_same_file() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    log.append(&msg("a", "b", "one")).unwrap();
    let (file, before) = log.open_for_tail().unwrap();

    log.append(&msg("a", "b", "two")).unwrap();
    let after = FileIdentity::of(&file).unwrap();

    assert!(before.still_same_file(&after));
}

#[test]
fn file_identity_after_truncate_is_a_distinct_empty_file() {
    let dir = tempdir().unwrap();
    let log = ChatLogFile::new(dir.path().join("chat.log"));
    log.append(&msg("a", "b", "one two three")).unwrap();
    let (_file, before) = log.open_for_tail().unwrap();

    log.truncate_to_last_n_lines(0).unwrap();
    let (_new_file, after) = log.open_for_tail().unwrap();

    assert_ne!(before.ino, after.ino);
    assert_eq!(after.len, 0);
}
